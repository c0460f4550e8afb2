//! # Stock export parser
//!
//! Turns the raw bytes of a dealer stock export into `StockUnit` candidates.
//!
//! ## Workflow
//!
//! 1.  **Decoding**: the buffer is read as UTF-8 (a leading BOM is dropped).
//!     Exports saved by older spreadsheet tools are often Latin-1, so bytes
//!     that are not valid UTF-8 are decoded as Latin-1 instead of failing.
//!
//! 2.  **Delimiter detection**: `,`, `;`, tab and `|` are counted over the
//!     leading lines and the most frequent one wins.
//!
//! 3.  **Header detection**: exports frequently start with a title block, so
//!     the first `header_scan_rows` rows are searched for one that contains
//!     both a VIN and a model column for the selected `SourceFormat`.
//!
//! 4.  **Row admission**: each data row is normalized and checked against the
//!     `ImportPolicy`. Rejected rows are counted per reason in `SkipCounts`;
//!     they are never errors.
//!
//! Nothing here touches the store. Problems that make the whole file unusable
//! (no header, missing required columns, unreadable records) are returned in
//! `ParseOutcome::errors` and the caller aborts the import.

use crate::config::ImportPolicy;
use chrono::NaiveDate;
use common::model::import::{SkipCounts, SourceFormat};
use common::model::stock::{StockUnit, SOLD_STATUS};
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Status texts that sources use for sold vehicles.
const SOLD_TEXTS: [&str; 5] = ["sold", "verkauft", "verkocht", "vendu", "venduto"];

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub units: Vec<StockUnit>,
    pub skipped: SkipCounts,
    /// Fatal problems. When non-empty, `units` must not be imported.
    pub errors: Vec<String>,
    /// 1-based row number of the detected header.
    pub header_row: Option<usize>,
}

impl ParseOutcome {
    fn fatal(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Vin,
    Model,
    Color,
    Upholstery,
    StatusCode,
    StatusText,
    /// Code and text in one cell, e.g. `"195 - In stock"`.
    StatusCombined,
    ProcessingType,
    ListPrice,
    SpecialPrice,
    Currency,
    Options,
    ProductionDate,
}

fn aliases(format: SourceFormat) -> &'static [(Field, &'static [&'static str])] {
    match format {
        SourceFormat::Standard => &[
            (Field::Vin, &["vin", "fin", "chassis number", "vehicle identification number"]),
            (Field::Model, &["model code", "model"]),
            (Field::Color, &["color code", "colour code", "paint code"]),
            (Field::Upholstery, &["upholstery code", "upholstery", "trim code"]),
            (Field::StatusCode, &["order status", "status code"]),
            (Field::StatusText, &["status text", "status description"]),
            (Field::ProcessingType, &["processing type"]),
            (Field::ListPrice, &["list price", "price"]),
            (Field::SpecialPrice, &["special price", "offer price"]),
            (Field::Currency, &["currency"]),
            (Field::Options, &["options", "option codes"]),
            (Field::ProductionDate, &["production date", "build date"]),
        ],
        SourceFormat::Compact => &[
            (Field::Vin, &["vin"]),
            (Field::Model, &["model"]),
            (Field::Color, &["paint"]),
            (Field::Upholstery, &["trim"]),
            (Field::StatusCombined, &["status"]),
            (Field::ProcessingType, &["proc. type", "proc type"]),
            (Field::ListPrice, &["price"]),
            (Field::SpecialPrice, &["offer"]),
            (Field::Currency, &["cur", "currency"]),
            (Field::Options, &["option codes", "options"]),
            (Field::ProductionDate, &["prod. date", "prod date"]),
        ],
    }
}

fn required_fields(format: SourceFormat) -> &'static [Field] {
    match format {
        SourceFormat::Standard => &[Field::Vin, Field::Model, Field::StatusCode],
        SourceFormat::Compact => &[Field::Vin, Field::Model, Field::StatusCombined],
    }
}

/// Column index of each recognized field.
#[derive(Debug, Default)]
struct ColumnMap {
    columns: Vec<(Field, usize)>,
}

impl ColumnMap {
    fn index(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, idx)| *idx)
    }

    fn cell<'r>(&self, record: &'r StringRecord, field: Field) -> &'r str {
        self.index(field)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("")
    }
}

fn normalize_header(cell: &str) -> String {
    let cell = normalize_cell(cell).to_lowercase();
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims the cell, removes wrapping quotes and non-breaking spaces.
fn normalize_cell(cell: &str) -> String {
    let s = cell.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s);
    s.replace('\u{00A0}', " ").trim().to_string()
}

fn map_columns(record: &StringRecord, format: SourceFormat) -> ColumnMap {
    let headers: Vec<String> = record.iter().map(normalize_header).collect();
    let mut map = ColumnMap::default();

    for (field, names) in aliases(format) {
        // Earlier aliases are more specific, so they win over later ones.
        let found = names
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name));
        if let Some(idx) = found {
            if !map.columns.iter().any(|(_, used)| *used == idx) {
                map.columns.push((*field, idx));
            }
        }
    }
    map
}

pub(crate) fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Picks the delimiter that occurs most often over the first `scan_lines`
/// lines. Falls back to a comma.
pub fn detect_delimiter(text: &str, scan_lines: usize) -> char {
    let sample: Vec<&str> = text.lines().take(scan_lines.max(1)).collect();
    DELIMITERS
        .iter()
        .map(|&d| (d, sample.iter().map(|l| l.matches(d).count()).sum::<usize>()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map(|(d, _)| d)
        .unwrap_or(',')
}

fn vin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9]{11,17}$").expect("valid VIN regex"))
}

fn option_split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid option regex"))
}

fn combined_status_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)(?:[.,]0+)?\s*(?:[-–:/]\s*)?(.*)$").expect("valid status regex")
    })
}

/// Upper-cases the VIN and drops separators. Returns `None` when the result
/// is not 11 to 17 alphanumerics.
pub fn normalize_vin(raw: &str) -> Option<String> {
    let vin: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase();
    vin_regex().is_match(&vin).then_some(vin)
}

/// Splits free option text such as `"337 ( 1G6 ) 420"` into codes.
pub fn parse_option_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in option_split_regex().split(raw) {
        let code = code.trim().to_ascii_uppercase();
        if !code.is_empty() && !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// Reads a price written with any mix of currency symbols, spaces and
/// thousands/decimal separators. Zero and negative prices count as missing.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(comma)) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && decimals != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (Some(dot), None) => {
            let decimals = cleaned.len() - dot - 1;
            if cleaned.matches('.').count() > 1 || decimals == 3 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|p| *p > 0.0)
}

fn currency_from_symbol(raw: &str) -> Option<&'static str> {
    if raw.contains('€') {
        Some("EUR")
    } else if raw.contains('£') {
        Some("GBP")
    } else if raw.contains('$') {
        Some("USD")
    } else {
        None
    }
}

/// Returns the ISO date when the cell holds a full date, and the year in
/// any case it can be recovered.
pub fn parse_production_date(raw: &str) -> (Option<String>, Option<i32>) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (None, None);
    }
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    let date_part = date_part.split('T').next().unwrap_or(date_part);

    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return (
                Some(date.format("%Y-%m-%d").to_string()),
                Some(chrono::Datelike::year(&date)),
            );
        }
    }

    // Month precision (`03/2024`, `03.2024`) or a bare year.
    let year = date_part
        .rsplit(['/', '.', '-'])
        .next()
        .and_then(|y| y.parse::<i32>().ok())
        .filter(|y| (1950..=2100).contains(y));
    (None, year)
}

fn parse_status_code(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.replace(',', ".").parse::<f64>().ok().map(|v| v as i64))
}

fn normalize_status_text(raw: &str) -> String {
    let text = raw.trim();
    if SOLD_TEXTS.iter().any(|s| text.eq_ignore_ascii_case(s)) {
        SOLD_STATUS.to_string()
    } else {
        text.to_string()
    }
}

fn read_status(map: &ColumnMap, record: &StringRecord) -> (Option<i64>, String) {
    if map.index(Field::StatusCombined).is_some() {
        let cell = map.cell(record, Field::StatusCombined);
        return match combined_status_regex().captures(cell) {
            Some(caps) => (
                caps.get(1).and_then(|m| m.as_str().parse().ok()),
                normalize_status_text(caps.get(2).map(|m| m.as_str()).unwrap_or("")),
            ),
            None => (None, normalize_status_text(cell)),
        };
    }
    (
        parse_status_code(map.cell(record, Field::StatusCode)),
        normalize_status_text(map.cell(record, Field::StatusText)),
    )
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|c| c.trim().is_empty())
}

/// Parses a stock export. Pure: the store is not touched.
pub fn parse_stock(
    bytes: &[u8],
    format: SourceFormat,
    source: &str,
    policy: &ImportPolicy,
) -> ParseOutcome {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return ParseOutcome::fatal("The file is empty");
    }

    let text = decode(bytes);
    let delimiter = detect_delimiter(&text, policy.header_scan_rows);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records: Vec<StringRecord> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        match record {
            Ok(r) => records.push(r),
            Err(e) => {
                return ParseOutcome::fatal(format!("Unreadable record at row {}: {}", idx + 1, e))
            }
        }
    }

    let header = records
        .iter()
        .take(policy.header_scan_rows)
        .enumerate()
        .find_map(|(idx, record)| {
            let map = map_columns(record, format);
            (map.index(Field::Vin).is_some() && map.index(Field::Model).is_some())
                .then_some((idx, map))
        });

    let (header_idx, map) = match header {
        Some(found) => found,
        None => {
            return ParseOutcome::fatal(format!(
                "No header row with VIN and model columns within the first {} rows",
                policy.header_scan_rows
            ))
        }
    };

    let missing: Vec<String> = required_fields(format)
        .iter()
        .filter(|f| map.index(**f).is_none())
        .map(|f| format!("{:?}", f))
        .collect();
    if !missing.is_empty() {
        return ParseOutcome {
            errors: vec![format!("Missing required column(s): {}", missing.join(", "))],
            header_row: Some(header_idx + 1),
            ..ParseOutcome::default()
        };
    }

    debug!(
        "Header found at row {} with delimiter {:?} ({} columns recognized)",
        header_idx + 1,
        delimiter,
        map.columns.len()
    );

    let mut outcome = ParseOutcome {
        header_row: Some(header_idx + 1),
        ..ParseOutcome::default()
    };

    for record in records.iter().skip(header_idx + 1) {
        if is_blank(record) {
            continue;
        }
        if let Some(unit) = admit_row(&map, record, source, policy, &mut outcome.skipped) {
            outcome.units.push(unit);
        }
    }

    outcome
}

fn admit_row(
    map: &ColumnMap,
    record: &StringRecord,
    source: &str,
    policy: &ImportPolicy,
    skipped: &mut SkipCounts,
) -> Option<StockUnit> {
    let Some(vin) = normalize_vin(&normalize_cell(map.cell(record, Field::Vin))) else {
        skipped.skipped_invalid_vin += 1;
        return None;
    };

    let (status_code, status) = read_status(map, record);
    let status_code = match status_code {
        Some(code) if code >= policy.admission_status_threshold => code,
        _ => {
            skipped.skipped_status += 1;
            return None;
        }
    };

    let processing_type = normalize_cell(map.cell(record, Field::ProcessingType)).to_ascii_uppercase();
    if policy.is_excluded(&processing_type) {
        skipped.skipped_processing_type += 1;
        return None;
    }
    let internal = policy.is_internal(&processing_type);
    if internal {
        skipped.hidden_internal += 1;
    }
    let visible = !internal && status != SOLD_STATUS;

    let list_raw = map.cell(record, Field::ListPrice);
    let special_raw = map.cell(record, Field::SpecialPrice);
    let currency = Some(normalize_cell(map.cell(record, Field::Currency)).to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .or_else(|| currency_from_symbol(list_raw).map(str::to_string))
        .or_else(|| currency_from_symbol(special_raw).map(str::to_string))
        .unwrap_or_else(|| "EUR".to_string());

    let (production_date, production_year) =
        parse_production_date(&normalize_cell(map.cell(record, Field::ProductionDate)));

    Some(StockUnit {
        vin,
        source: source.to_string(),
        status_code,
        status,
        processing_type,
        model_code: normalize_cell(map.cell(record, Field::Model)).to_ascii_uppercase(),
        color_code: normalize_cell(map.cell(record, Field::Color)).to_ascii_uppercase(),
        upholstery_code: normalize_cell(map.cell(record, Field::Upholstery)).to_ascii_uppercase(),
        options: parse_option_codes(map.cell(record, Field::Options)),
        list_price: parse_price(list_raw),
        special_price: parse_price(special_raw),
        currency,
        visible,
        production_date,
        production_year,
        images: Vec::new(),
        group_id: None,
        sold_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &str = "\
Stock report;;;;;;;;;;;
Exported 2026-05-01;;;;;;;;;;;
VIN;Model Code;Color Code;Upholstery Code;Order Status;Status Text;Processing Type;List Price;Special Price;Currency;Options;Production Date
WBA11AA0X0N000001;21em;475;LCSW;195;In stock;RET;52.900,00;49.900,00;EUR;337 ( 1G6 ) 420;15.03.2024
WBA11AA0X0N000002;21EM;475;LCSW;112;Ordered;RET;52.900,00;;EUR;337;
WBA11AA0X0N000003;21EM;475;LCSW;160;In transit;INT;52.900,00;;EUR;337;2024-04-02
WBA11AA0X0N000004;21EM;475;LCSW;170;In transit;SCR;52.900,00;;EUR;337;
;;;;;;;;;;;
BAD;21EM;475;LCSW;195;In stock;RET;52.900,00;;EUR;337;
WBA11AA0X0N000005;21EM;300;LCSW;195;Verkauft;RET;;;;420 337;03/2024
";

    fn parse(text: &str, format: SourceFormat) -> ParseOutcome {
        parse_stock(text.as_bytes(), format, "main", &ImportPolicy::default())
    }

    #[test]
    fn test_standard_export_with_preamble() {
        let outcome = parse(STANDARD, SourceFormat::Standard);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.header_row, Some(3));

        let vins: Vec<&str> = outcome.units.iter().map(|u| u.vin.as_str()).collect();
        assert_eq!(
            vins,
            vec!["WBA11AA0X0N000001", "WBA11AA0X0N000003", "WBA11AA0X0N000005"]
        );
        assert_eq!(outcome.skipped.skipped_status, 1);
        assert_eq!(outcome.skipped.skipped_processing_type, 1);
        assert_eq!(outcome.skipped.skipped_invalid_vin, 1);
        assert_eq!(outcome.skipped.hidden_internal, 1);

        let first = &outcome.units[0];
        assert_eq!(first.model_code, "21EM");
        assert_eq!(first.options, vec!["337", "1G6", "420"]);
        assert_eq!(first.list_price, Some(52_900.0));
        assert_eq!(first.special_price, Some(49_900.0));
        assert_eq!(first.production_date.as_deref(), Some("2024-03-15"));
        assert_eq!(first.production_year, Some(2024));
        assert_eq!(first.source, "main");
        assert!(first.visible);

        assert!(!outcome.units[1].visible);

        let sold = &outcome.units[2];
        assert_eq!(sold.status, SOLD_STATUS);
        assert!(!sold.visible);
        assert_eq!(sold.production_date, None);
        assert_eq!(sold.production_year, Some(2024));
        assert_eq!(sold.list_price, None);
    }

    #[test]
    fn test_status_below_threshold_is_skipped() {
        let text = "VIN,Model Code,Order Status\nWBA11AA0X0N000009,21EM,112\n";
        let outcome = parse(text, SourceFormat::Standard);
        assert!(outcome.errors.is_empty());
        assert!(outcome.units.is_empty());
        assert_eq!(outcome.skipped.skipped_status, 1);
    }

    #[test]
    fn test_compact_format_combined_status() {
        let text = "\
VIN\tModel\tPaint\tTrim\tStatus\tProc. Type\tPrice\tOption Codes\tProd. Date
wba11aa0x0n000010\t21EM\t475\tLCSW\t195 - In stock\tRET\t€ 45,990.00\t337/1G6\t2024
WBA11AA0X0N000011\t21EM\t475\tLCSW\t140 - Ordered\tRET\t45990\t337\t2024
";
        let outcome = parse(text, SourceFormat::Compact);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.units.len(), 1);
        let unit = &outcome.units[0];
        assert_eq!(unit.vin, "WBA11AA0X0N000010");
        assert_eq!(unit.status_code, 195);
        assert_eq!(unit.status, "In stock");
        assert_eq!(unit.list_price, Some(45_990.0));
        assert_eq!(unit.currency, "EUR");
        assert_eq!(unit.options, vec!["337", "1G6"]);
        assert_eq!(unit.production_year, Some(2024));
        assert_eq!(outcome.skipped.skipped_status, 1);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let text = "VIN,Model Code,Status Text\nWBA11AA0X0N000001,21EM,In stock\n";
        let outcome = parse(text, SourceFormat::Standard);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("StatusCode"));
        assert!(outcome.units.is_empty());
    }

    #[test]
    fn test_no_header_is_fatal() {
        let outcome = parse("a,b,c\n1,2,3\n", SourceFormat::Standard);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("No header row"));
        assert_eq!(outcome.header_row, None);
    }

    #[test]
    fn test_empty_file_is_fatal() {
        let outcome = parse("  \n", SourceFormat::Standard);
        assert_eq!(outcome.errors, vec!["The file is empty".to_string()]);
    }

    #[test]
    fn test_latin1_bytes_are_decoded() {
        let mut bytes = b"VIN;Model Code;Order Status;Status Text\n".to_vec();
        bytes.extend_from_slice(b"WBA11AA0X0N000001;21EM;195;Verf\xfcgbar\n");
        let outcome = parse_stock(&bytes, SourceFormat::Standard, "main", &ImportPolicy::default());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.units[0].status, "Verfügbar");
    }

    #[test]
    fn test_parse_option_codes() {
        assert_eq!(parse_option_codes("337 ( 1G6 ) 420"), vec!["337", "1G6", "420"]);
        assert_eq!(parse_option_codes("s337a, s420a;337"), vec!["S337A", "S420A", "337"]);
        assert!(parse_option_codes("  ").is_empty());
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("45.990,00 €"), Some(45_990.0));
        assert_eq!(parse_price("45,990.00"), Some(45_990.0));
        assert_eq!(parse_price("45990"), Some(45_990.0));
        assert_eq!(parse_price("45 990"), Some(45_990.0));
        assert_eq!(parse_price("45.990"), Some(45_990.0));
        assert_eq!(parse_price("499,5"), Some(499.5));
        assert_eq!(parse_price("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("n/a"), None);
    }

    #[test]
    fn test_normalize_vin() {
        assert_eq!(
            normalize_vin(" wba11aa0x0n-000001 ").as_deref(),
            Some("WBA11AA0X0N000001")
        );
        assert_eq!(normalize_vin("SHORT"), None);
        assert_eq!(normalize_vin("WBA11AA0X0N00000!"), None);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3", 5), ';');
        assert_eq!(detect_delimiter("a\tb\tc", 5), '\t');
        assert_eq!(detect_delimiter("abc", 5), ',');
    }
}

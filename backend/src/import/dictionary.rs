//! Bulk dictionary upload.
//!
//! The file is a delimited table with `Type`, `Code` and `Name` columns. Every
//! other non-empty cell becomes an attribute named after its header
//! (lowercased, spaces as `_`). `Model Codes` is split into a list and stored
//! as `model_codes`. Rows that share a `(Type, Code)` pair, or that carry a
//! truthy `Variant` cell, are stored together as an array of variants.

use crate::error::{AppError, AppResult};
use crate::import::parser::{decode, detect_delimiter};
use common::model::dictionary::{DictionaryEntry, DictionaryKind};
use csv::ReaderBuilder;
use log::debug;
use serde_json::{Map, Value};

const TYPE_COLUMN: &str = "type";
const CODE_COLUMN: &str = "code";
const NAME_COLUMN: &str = "name";
const MODEL_CODES_COLUMN: &str = "model codes";
const VARIANT_COLUMN: &str = "variant";

#[derive(Debug, Default)]
pub struct DictionaryUpload {
    pub entries: Vec<DictionaryEntry>,
    pub skipped: usize,
}

struct Row {
    name: String,
    attributes: Map<String, Value>,
    variant: bool,
}

fn attribute_key(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join("_")
}

fn is_truthy(cell: &str) -> bool {
    !matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "no" | "n" | "false"
    )
}

fn split_model_codes(cell: &str) -> Vec<Value> {
    cell.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|c| !c.is_empty())
        .map(|c| Value::String(c.to_ascii_uppercase()))
        .collect()
}

pub fn parse_dictionary(bytes: &[u8]) -> AppResult<DictionaryUpload> {
    let text = decode(bytes);
    if text.trim().is_empty() {
        return Err(AppError::Parse("The file is empty".into()));
    }
    let delimiter = detect_delimiter(&text, 5);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let (Some(type_idx), Some(code_idx), Some(name_idx)) = (
        position(TYPE_COLUMN),
        position(CODE_COLUMN),
        position(NAME_COLUMN),
    ) else {
        return Err(AppError::Parse(
            "The dictionary file needs Type, Code and Name columns".into(),
        ));
    };

    let mut upload = DictionaryUpload::default();
    let mut grouped: Vec<((DictionaryKind, String), Vec<Row>)> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| AppError::Parse(e.to_string()))?;
        let cell = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let code = cell(code_idx).to_ascii_uppercase();
        let kind = match cell(type_idx).parse::<DictionaryKind>() {
            Ok(kind) if !code.is_empty() => kind,
            _ => {
                upload.skipped += 1;
                continue;
            }
        };

        let mut row = Row {
            name: cell(name_idx).to_string(),
            attributes: Map::new(),
            variant: false,
        };
        for (idx, header) in headers.iter().enumerate() {
            let value = cell(idx);
            if idx == type_idx || idx == code_idx || idx == name_idx || value.is_empty() {
                continue;
            }
            match header.as_str() {
                MODEL_CODES_COLUMN => {
                    let codes = split_model_codes(value);
                    if !codes.is_empty() {
                        row.attributes
                            .insert("model_codes".to_string(), Value::Array(codes));
                    }
                }
                VARIANT_COLUMN => row.variant = is_truthy(value),
                _ => {
                    row.attributes
                        .insert(attribute_key(header), Value::String(value.to_string()));
                }
            }
        }

        let key = (kind, code);
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, rows)) => rows.push(row),
            None => grouped.push((key, vec![row])),
        }
    }

    for ((kind, code), rows) in grouped {
        let as_variants = rows.len() > 1 || rows.iter().any(|r| r.variant);
        let name = rows
            .iter()
            .map(|r| r.name.clone())
            .find(|n| !n.is_empty())
            .unwrap_or_else(|| code.clone());
        let attributes = if as_variants {
            Value::Array(
                rows.into_iter()
                    .map(|mut r| {
                        if !r.name.is_empty() {
                            r.attributes
                                .entry("name".to_string())
                                .or_insert(Value::String(r.name));
                        }
                        Value::Object(r.attributes)
                    })
                    .collect(),
            )
        } else {
            rows.into_iter()
                .next()
                .map(|r| Value::Object(r.attributes))
                .unwrap_or(Value::Object(Map::new()))
        };
        upload.entries.push(DictionaryEntry {
            kind,
            code,
            name,
            attributes,
        });
    }

    debug!(
        "Dictionary file: {} entries, {} rows skipped",
        upload.entries.len(),
        upload.skipped
    );
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_rows_and_extra_columns() {
        let csv = "Type;Code;Name;Body Group\nmodel;21em;i4 eDrive40;G26\noption;337;M Sport;\n";
        let upload = parse_dictionary(csv.as_bytes()).unwrap();
        assert_eq!(upload.skipped, 0);
        assert_eq!(upload.entries.len(), 2);

        let model = &upload.entries[0];
        assert_eq!(model.kind, DictionaryKind::Model);
        assert_eq!(model.code, "21EM");
        assert_eq!(model.attributes, json!({ "body_group": "G26" }));
        assert_eq!(upload.entries[1].attributes, json!({}));
    }

    #[test]
    fn test_rows_sharing_a_code_become_variants() {
        let csv = "Type,Code,Name,Model Codes,Variant\n\
                   color,475,Black Sapphire,\"21EM, 31AB\",yes\n\
                   color,475,Saphirschwarz,11CF,yes\n";
        let upload = parse_dictionary(csv.as_bytes()).unwrap();
        assert_eq!(upload.entries.len(), 1);
        let entry = &upload.entries[0];
        assert_eq!(entry.name, "Black Sapphire");
        assert_eq!(
            entry.attributes,
            json!([
                { "model_codes": ["21EM", "31AB"], "name": "Black Sapphire" },
                { "model_codes": ["11CF"], "name": "Saphirschwarz" }
            ])
        );
    }

    #[test]
    fn test_unknown_types_and_blank_codes_are_skipped() {
        let csv = "Type,Code,Name\nwheel,X1,Rim\ncolor,,Nothing\n,,\ncolour,300,Alpine White\n";
        let upload = parse_dictionary(csv.as_bytes()).unwrap();
        assert_eq!(upload.skipped, 2);
        assert_eq!(upload.entries.len(), 1);
        assert_eq!(upload.entries[0].kind, DictionaryKind::Color);
    }

    #[test]
    fn test_missing_columns_is_a_parse_error() {
        assert!(matches!(
            parse_dictionary(b"Code,Name\n300,Alpine White\n"),
            Err(AppError::Parse(_))
        ));
        assert!(matches!(parse_dictionary(b"  \n"), Err(AppError::Parse(_))));
    }
}

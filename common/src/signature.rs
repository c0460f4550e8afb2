//! Product signature derivation.
//!
//! Two vehicles are interchangeable for a buyer when model, paint,
//! upholstery, option set and production year match. The signature is the
//! MD5 of a canonical key built from those attributes with the option codes
//! de-duplicated and sorted, so reordering options never changes it while any
//! code difference does.

use crate::model::stock::StockUnit;

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Option codes as they enter the signature: trimmed, upper-cased, without
/// blanks or duplicates, sorted.
pub fn canonical_options(options: &[String]) -> Vec<String> {
    let mut codes: Vec<String> = options
        .iter()
        .map(|o| normalize_code(o))
        .filter(|o| !o.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

/// Human-readable key the signature hash is computed from.
pub fn canonical_key(
    model_code: &str,
    color_code: &str,
    upholstery_code: &str,
    options: &[String],
    production_year: Option<i32>,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        normalize_code(model_code),
        normalize_code(color_code),
        normalize_code(upholstery_code),
        canonical_options(options).join(","),
        production_year.map(|y| y.to_string()).unwrap_or_default()
    )
}

pub fn signature_of(
    model_code: &str,
    color_code: &str,
    upholstery_code: &str,
    options: &[String],
    production_year: Option<i32>,
) -> String {
    let key = canonical_key(
        model_code,
        color_code,
        upholstery_code,
        options,
        production_year,
    );
    format!("{:x}", md5::compute(key.as_bytes()))
}

pub fn signature(unit: &StockUnit) -> String {
    signature_of(
        &unit.model_code,
        &unit.color_code,
        &unit.upholstery_code,
        &unit.options,
        unit.production_year,
    )
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookup table a dictionary entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
    Model,
    Color,
    Upholstery,
    Option,
    Package,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 5] = [
        DictionaryKind::Model,
        DictionaryKind::Color,
        DictionaryKind::Upholstery,
        DictionaryKind::Option,
        DictionaryKind::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DictionaryKind::Model => "model",
            DictionaryKind::Color => "color",
            DictionaryKind::Upholstery => "upholstery",
            DictionaryKind::Option => "option",
            DictionaryKind::Package => "package",
        }
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(DictionaryKind::Model),
            "color" | "colour" | "paint" => Ok(DictionaryKind::Color),
            "upholstery" | "trim" => Ok(DictionaryKind::Upholstery),
            "option" => Ok(DictionaryKind::Option),
            "package" => Ok(DictionaryKind::Package),
            other => Err(format!("Unknown dictionary type '{}'", other)),
        }
    }
}

/// A `(kind, code)` record maintained by administrators.
///
/// `attributes` is either a JSON object (one meaning for the code) or an
/// array of objects (variants, usually scoped with a `model_codes` list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub kind: DictionaryKind,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// Price of a maintenance package for one body group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePrice {
    pub package: String,
    pub series_code: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub duration_months: Option<i64>,
    #[serde(default)]
    pub mileage_km: Option<i64>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionLabel {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffer {
    pub package: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub duration_months: Option<i64>,
    pub mileage_km: Option<i64>,
}

/// A stock unit with its codes resolved to readable labels.
///
/// Labels fall back to the raw code when the dictionary has no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedUnit {
    pub unit: super::stock::StockUnit,
    pub model_name: String,
    pub color_name: String,
    pub upholstery_name: String,
    pub options: Vec<OptionLabel>,
    pub body_group: Option<String>,
    pub service_offers: Vec<ServiceOffer>,
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_aliases() {
        assert_eq!("Paint".parse::<DictionaryKind>(), Ok(DictionaryKind::Color));
        assert_eq!(" trim ".parse::<DictionaryKind>(), Ok(DictionaryKind::Upholstery));
        assert!("engine".parse::<DictionaryKind>().is_err());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DictionaryKind::Upholstery).unwrap();
        assert_eq!(json, "\"upholstery\"");
    }
}

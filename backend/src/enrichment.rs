//! Read-side resolution of raw codes to readable attributes and prices.
//!
//! Dictionary attributes are stored as JSON that is either one object or an
//! array of variant objects. The shape is decided once, when the dictionary
//! is loaded, into `DictionaryValue`; lookups never inspect JSON again.
//! A code without an entry resolves to nothing and the caller shows the raw
//! code instead.

use crate::store::Store;
use common::model::dictionary::{
    DictionaryEntry, DictionaryKind, EnrichedUnit, OptionLabel, ServiceOffer, ServicePrice,
};
use common::model::stock::StockUnit;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryValue {
    Single(Attributes),
    /// Alternatives for the same code, each optionally limited to the models
    /// listed in its `model_codes` attribute.
    Variants(Vec<Attributes>),
}

impl DictionaryValue {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => DictionaryValue::Variants(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(map) => DictionaryValue::Single(map),
            _ => DictionaryValue::Single(Attributes::new()),
        }
    }

    /// Attributes that apply to `model_code`.
    pub fn select(&self, model_code: &str) -> Option<&Attributes> {
        match self {
            DictionaryValue::Single(attrs) => Some(attrs),
            DictionaryValue::Variants(variants) => variants
                .iter()
                .find(|v| variant_matches(v, model_code))
                .or_else(|| variants.first()),
        }
    }
}

fn variant_matches(variant: &Attributes, model_code: &str) -> bool {
    match variant.get("model_codes") {
        Some(Value::Array(codes)) => codes
            .iter()
            .filter_map(Value::as_str)
            .any(|c| c.trim().eq_ignore_ascii_case(model_code.trim())),
        Some(Value::String(codes)) => codes
            .split(|c: char| c == ',' || c.is_whitespace())
            .any(|c| !c.is_empty() && c.eq_ignore_ascii_case(model_code.trim())),
        _ => false,
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    name: String,
    value: DictionaryValue,
}

/// Every dictionary entry, indexed by `(kind, code)`.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<(DictionaryKind, String), Resolved>,
}

impl Dictionary {
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| {
                (
                    (e.kind, e.code.trim().to_ascii_uppercase()),
                    Resolved {
                        name: e.name,
                        value: DictionaryValue::from_json(e.attributes),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn load(store: &Store) -> rusqlite::Result<Self> {
        Ok(Self::from_entries(store.list_dictionary(None)?))
    }

    pub fn value(&self, kind: DictionaryKind, code: &str) -> Option<&DictionaryValue> {
        self.entries
            .get(&(kind, code.trim().to_ascii_uppercase()))
            .map(|r| &r.value)
    }

    pub fn resolve(
        &self,
        kind: DictionaryKind,
        code: &str,
        model_code: &str,
    ) -> Option<&Attributes> {
        self.value(kind, code)?.select(model_code)
    }

    /// Display name: the variant's own `name`, then the entry name, then the
    /// raw code.
    pub fn label(&self, kind: DictionaryKind, code: &str, model_code: &str) -> String {
        let Some(resolved) = self.entries.get(&(kind, code.trim().to_ascii_uppercase())) else {
            return code.to_string();
        };
        resolved
            .value
            .select(model_code)
            .and_then(|attrs| attrs.get("name"))
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| Some(resolved.name.clone()).filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| code.to_string())
    }

    /// Series code used for service package pricing, from the model entry.
    pub fn body_group(&self, model_code: &str) -> Option<String> {
        self.resolve(DictionaryKind::Model, model_code, model_code)
            .and_then(|attrs| attrs.get("body_group"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
    }
}

/// Resolves the unit's codes. The unit itself is copied, never changed.
pub fn enrich(unit: &StockUnit, dictionary: &Dictionary, prices: &[ServicePrice]) -> EnrichedUnit {
    let model = unit.model_code.as_str();
    let body_group = dictionary.body_group(model);

    let service_offers = body_group
        .as_deref()
        .map(|group| {
            prices
                .iter()
                .filter(|p| p.series_code.eq_ignore_ascii_case(group))
                .map(|p| ServiceOffer {
                    package: p.package.clone(),
                    name: dictionary.label(DictionaryKind::Package, &p.package, model),
                    price: p.price,
                    currency: p.currency.clone(),
                    duration_months: p.duration_months,
                    mileage_km: p.mileage_km,
                })
                .collect()
        })
        .unwrap_or_default();

    EnrichedUnit {
        model_name: dictionary.label(DictionaryKind::Model, model, model),
        color_name: dictionary.label(DictionaryKind::Color, &unit.color_code, model),
        upholstery_name: dictionary.label(DictionaryKind::Upholstery, &unit.upholstery_code, model),
        options: unit
            .options
            .iter()
            .map(|code| OptionLabel {
                code: code.clone(),
                name: dictionary.label(DictionaryKind::Option, code, model),
            })
            .collect(),
        body_group,
        service_offers,
        price: unit.effective_price(),
        unit: unit.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(kind: DictionaryKind, code: &str, name: &str, attributes: Value) -> DictionaryEntry {
        DictionaryEntry {
            kind,
            code: code.to_string(),
            name: name.to_string(),
            attributes,
        }
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_entries(vec![
            entry(
                DictionaryKind::Model,
                "21em",
                "i4 eDrive40",
                json!({ "body_group": "g26" }),
            ),
            entry(
                DictionaryKind::Color,
                "475",
                "Black Sapphire",
                json!([
                    { "model_codes": ["31AB"], "name": "Saphirschwarz" },
                    { "model_codes": ["21EM"], "name": "Black Sapphire metallic" }
                ]),
            ),
            entry(DictionaryKind::Option, "337", "M Sport package", json!({})),
            entry(DictionaryKind::Package, "BSI", "Service Inclusive", Value::Null),
        ])
    }

    fn unit() -> StockUnit {
        let mut u = StockUnit::new("WBA11AA0X0N000001", "main", "21EM");
        u.color_code = "475".to_string();
        u.upholstery_code = "LCSW".to_string();
        u.options = vec!["337".to_string(), "1G6".to_string()];
        u.list_price = Some(52_900.0);
        u
    }

    #[test]
    fn test_shape_is_decided_at_load() {
        let dict = dictionary();
        assert!(matches!(
            dict.value(DictionaryKind::Color, "475"),
            Some(DictionaryValue::Variants(v)) if v.len() == 2
        ));
        assert!(matches!(
            dict.value(DictionaryKind::Package, "BSI"),
            Some(DictionaryValue::Single(a)) if a.is_empty()
        ));
    }

    #[test]
    fn test_variant_selected_by_model() {
        let dict = dictionary();
        assert_eq!(
            dict.label(DictionaryKind::Color, "475", "21EM"),
            "Black Sapphire metallic"
        );
        assert_eq!(dict.label(DictionaryKind::Color, "475", "31AB"), "Saphirschwarz");
        // No matching variant: first one.
        assert_eq!(dict.label(DictionaryKind::Color, "475", "99ZZ"), "Saphirschwarz");
    }

    #[test]
    fn test_enrich_falls_back_to_raw_codes() {
        let prices = vec![
            ServicePrice {
                package: "BSI".to_string(),
                series_code: "G26".to_string(),
                price: 1_290.0,
                currency: "EUR".to_string(),
                duration_months: Some(60),
                mileage_km: Some(100_000),
            },
            ServicePrice {
                package: "BSI".to_string(),
                series_code: "G20".to_string(),
                price: 990.0,
                currency: "EUR".to_string(),
                duration_months: Some(60),
                mileage_km: Some(100_000),
            },
        ];
        let u = unit();
        let enriched = enrich(&u, &dictionary(), &prices);

        assert_eq!(enriched.model_name, "i4 eDrive40");
        assert_eq!(enriched.upholstery_name, "LCSW");
        assert_eq!(enriched.options[0].name, "M Sport package");
        assert_eq!(enriched.options[1].name, "1G6");
        assert_eq!(enriched.body_group.as_deref(), Some("G26"));
        assert_eq!(enriched.service_offers.len(), 1);
        assert_eq!(enriched.service_offers[0].name, "Service Inclusive");
        assert_eq!(enriched.service_offers[0].price, 1_290.0);
        assert_eq!(enriched.price, Some(52_900.0));
        assert_eq!(enriched.unit, u);
    }

    #[test]
    fn test_enrich_with_empty_dictionary() {
        let enriched = enrich(&unit(), &Dictionary::default(), &[]);
        assert_eq!(enriched.model_name, "21EM");
        assert_eq!(enriched.color_name, "475");
        assert!(enriched.body_group.is_none());
        assert!(enriched.service_offers.is_empty());
    }
}

use crate::model::bulletin::Bulletin;
use crate::model::stock::StockUnit;
use serde::{Deserialize, Serialize};

/// One catalog card: a cluster of interchangeable units shown through its
/// representative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub signature: String,
    pub representative: StockUnit,
    pub vins: Vec<String>,
    /// Members that are not sold.
    pub available_count: usize,
    pub display_status: String,
    pub price: Option<f64>,
    pub photo: Option<String>,
    #[serde(default)]
    pub bulletins: Vec<Bulletin>,
}

/// Ordering applied to catalog cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSort {
    #[default]
    Recommended,
    PriceAsc,
    PriceDesc,
    Newest,
}

/// Catalog model filter, shared by the server and the browser: the filter
/// matches every model code it prefixes, ignoring case and surrounding
/// spaces. An empty filter matches everything.
pub fn model_filter_matches(model_code: &str, filter: &str) -> bool {
    let filter = filter.trim().to_ascii_uppercase();
    filter.is_empty() || model_code.trim().to_ascii_uppercase().starts_with(&filter)
}

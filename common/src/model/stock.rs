use serde::{Deserialize, Serialize};

/// Status text written by the reconciliation pass and by sources that report
/// a vehicle as sold. Units carrying it are terminal.
pub const SOLD_STATUS: &str = "sold";

/// Status codes at or above this value mean the vehicle is physically ready
/// for delivery.
pub const READY_STATUS_THRESHOLD: i64 = 190;

/// Synthetic status shown on a catalog card when at least one member of the
/// cluster is ready and unsold.
pub const AVAILABLE_NOW_STATUS: &str = "Available now";

/// A single vehicle as stored by the backend and served to the catalog.
///
/// The VIN is the stable key. Everything else is overwritten on each import
/// except `images`, which is curated by administrators, and the sold state,
/// which only an administrator can revert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUnit {
    pub vin: String,
    /// Name of the data source (dealer feed) the unit was last imported from.
    pub source: String,
    pub status_code: i64,
    pub status: String,
    pub processing_type: String,
    pub model_code: String,
    pub color_code: String,
    pub upholstery_code: String,
    pub options: Vec<String>,
    pub list_price: Option<f64>,
    pub special_price: Option<f64>,
    pub currency: String,
    pub visible: bool,
    /// ISO `YYYY-MM-DD` when the export carries a full date.
    pub production_date: Option<String>,
    pub production_year: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub sold_at: Option<String>,
}

impl StockUnit {
    /// Creates a visible unit with the given identity and no pricing.
    pub fn new(vin: &str, source: &str, model_code: &str) -> Self {
        Self {
            vin: vin.to_string(),
            source: source.to_string(),
            status_code: 0,
            status: String::new(),
            processing_type: String::new(),
            model_code: model_code.to_string(),
            color_code: String::new(),
            upholstery_code: String::new(),
            options: Vec::new(),
            list_price: None,
            special_price: None,
            currency: "EUR".to_string(),
            visible: true,
            production_date: None,
            production_year: None,
            images: Vec::new(),
            group_id: None,
            sold_at: None,
        }
    }

    pub fn is_sold(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(SOLD_STATUS)
    }

    pub fn is_ready(&self) -> bool {
        self.status_code >= READY_STATUS_THRESHOLD
    }

    pub fn has_photo(&self) -> bool {
        !self.images.is_empty()
    }

    /// Special price when set, list price otherwise.
    pub fn effective_price(&self) -> Option<f64> {
        self.special_price.or(self.list_price)
    }
}

/// Deduplication bucket shared by interchangeable vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductGroup {
    pub id: i64,
    pub signature: String,
    pub model_code: String,
    pub color_code: String,
    pub upholstery_code: String,
    pub options: Vec<String>,
    pub production_year: Option<i32>,
}

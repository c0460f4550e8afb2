use crate::model::import::SourceFormat;
use serde::{Deserialize, Serialize};

/// `json` part of the stock import multipart request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub source: String,
    #[serde(default)]
    pub format: SourceFormat,
    /// Mark missing units sold even when the share exceeds the safety ratio.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCheckRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub ok: bool,
}

/// Manual curation of one unit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitPatch {
    #[serde(default)]
    pub list_price: Option<f64>,
    #[serde(default)]
    pub special_price: Option<f64>,
    /// Clears the special price when `true`.
    #[serde(default)]
    pub clear_special_price: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePurgeRequest {
    pub vin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryImportResponse {
    pub imported: usize,
    pub skipped: usize,
}

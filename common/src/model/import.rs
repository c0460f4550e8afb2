use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column layout of a stock export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// One column per field, numeric order status in its own column.
    #[default]
    Standard,
    /// Shortened headers, status code and text combined (`"195 - In stock"`).
    Compact,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Standard => f.write_str("standard"),
            SourceFormat::Compact => f.write_str("compact"),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(SourceFormat::Standard),
            "compact" => Ok(SourceFormat::Compact),
            other => Err(format!("Unknown source format '{}'", other)),
        }
    }
}

/// Rows intentionally left out of an import, per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub skipped_status: usize,
    pub skipped_processing_type: usize,
    pub skipped_invalid_vin: usize,
    /// Imported, but hidden from the catalog.
    pub hidden_internal: usize,
}

impl SkipCounts {
    pub fn total_skipped(&self) -> usize {
        self.skipped_status + self.skipped_processing_type + self.skipped_invalid_vin
    }
}

/// Result of one stock import, returned to the importing administrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub source: String,
    pub format: SourceFormat,
    pub file_md5: String,
    pub header_row: Option<usize>,
    pub parsed: usize,
    pub skipped: SkipCounts,
    pub synced: usize,
    pub groups: usize,
    pub marked_sold: Vec<String>,
    /// VINs missing from the file that were not marked sold because the
    /// missing share exceeded the safety threshold.
    pub held_back: Vec<String>,
}

/// One row of the import log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub id: i64,
    pub source: String,
    pub format: SourceFormat,
    pub file_md5: String,
    pub started_at: String,
    pub parsed: usize,
    pub synced: usize,
    pub marked_sold: usize,
    pub held_back: usize,
    pub outcome: String,
}

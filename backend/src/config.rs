//! Runtime configuration.
//!
//! Values come from an optional `Showroom.toml` next to the binary and from
//! `SHOWROOM_*` environment variables (nested keys use `__`, e.g.
//! `SHOWROOM_IMPORT__MAX_SOLD_RATIO=0.3`). Every key has a default so the
//! server starts with no configuration at all.

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Directory uploaded images are written to.
    pub media_dir: String,
    /// Public URL prefix the media directory is served under.
    pub media_url: String,
    pub admin_password: String,
    pub import: ImportPolicy,
}

/// Rules applied while parsing and reconciling a stock export.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportPolicy {
    /// Rows whose order status is below this code are not imported.
    pub admission_status_threshold: i64,
    /// How many leading rows are searched for the header row.
    pub header_scan_rows: usize,
    /// Imported but hidden from the public catalog.
    pub internal_processing_types: Vec<String>,
    /// Not imported at all.
    pub excluded_processing_types: Vec<String>,
    /// Largest share of a source's active units one import may mark sold
    /// without `force`.
    pub max_sold_ratio: f64,
    /// The ratio check only applies to sources with at least this many
    /// active units.
    pub min_active_for_ratio_check: usize,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            admission_status_threshold: 150,
            header_scan_rows: 20,
            internal_processing_types: vec!["INT".to_string()],
            excluded_processing_types: vec!["SCR".to_string()],
            max_sold_ratio: 0.5,
            min_active_for_ratio_check: 10,
        }
    }
}

impl ImportPolicy {
    pub fn is_internal(&self, processing_type: &str) -> bool {
        contains_code(&self.internal_processing_types, processing_type)
    }

    pub fn is_excluded(&self, processing_type: &str) -> bool {
        contains_code(&self.excluded_processing_types, processing_type)
    }
}

fn contains_code(list: &[String], code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && list.iter().any(|c| c.trim().eq_ignore_ascii_case(code))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "showroom.sqlite".to_string(),
            media_dir: "media".to_string(),
            media_url: "/media".to_string(),
            admin_password: "changeme".to_string(),
            import: ImportPolicy::default(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let policy = &defaults.import;

    Config::builder()
        .set_default("host", defaults.host.clone())?
        .set_default("port", defaults.port as i64)?
        .set_default("database_path", defaults.database_path.clone())?
        .set_default("media_dir", defaults.media_dir.clone())?
        .set_default("media_url", defaults.media_url.clone())?
        .set_default("admin_password", defaults.admin_password.clone())?
        .set_default(
            "import.admission_status_threshold",
            policy.admission_status_threshold,
        )?
        .set_default("import.header_scan_rows", policy.header_scan_rows as i64)?
        .set_default(
            "import.internal_processing_types",
            policy.internal_processing_types.clone(),
        )?
        .set_default(
            "import.excluded_processing_types",
            policy.excluded_processing_types.clone(),
        )?
        .set_default("import.max_sold_ratio", policy.max_sold_ratio)?
        .set_default(
            "import.min_active_for_ratio_check",
            policy.min_active_for_ratio_check as i64,
        )?
        .add_source(ConfigFile::with_name("Showroom").required(false))
        .add_source(
            Environment::with_prefix("SHOWROOM")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("import.internal_processing_types")
                .with_list_parse_key("import.excluded_processing_types")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_type_lists_are_case_insensitive() {
        let policy = ImportPolicy::default();
        assert!(policy.is_internal("int"));
        assert!(policy.is_excluded(" SCR "));
        assert!(!policy.is_internal(""));
        assert!(!policy.is_excluded("RET"));
    }

    #[test]
    fn test_load_configuration_uses_defaults() {
        let config = load_configuration().unwrap();
        assert_eq!(config.import.admission_status_threshold, 150);
        assert_eq!(config.import.header_scan_rows, 20);
        assert!(!config.admin_password.is_empty());
    }
}

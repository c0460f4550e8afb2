use serde::{Deserialize, Serialize};

/// Promotion rule or notice shown next to matching catalog cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulletin {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Applies to every model whose code starts with this prefix; `None`
    /// applies to all models.
    #[serde(default)]
    pub model_prefix: Option<String>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub starts_on: Option<String>,
    #[serde(default)]
    pub ends_on: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Bulletin {
    /// Whether the bulletin is in force for `model_code` on `today`
    /// (ISO dates compare lexicographically).
    pub fn applies_to(&self, model_code: &str, today: &str) -> bool {
        if !self.active {
            return false;
        }
        if let Some(start) = self.starts_on.as_deref() {
            if today < start {
                return false;
            }
        }
        if let Some(end) = self.ends_on.as_deref() {
            if today > end {
                return false;
            }
        }
        match self.model_prefix.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => model_code
                .to_ascii_uppercase()
                .starts_with(&prefix.to_ascii_uppercase()),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulletin(prefix: Option<&str>) -> Bulletin {
        Bulletin {
            id: 1,
            title: "Spring offer".to_string(),
            message: String::new(),
            model_prefix: prefix.map(str::to_string),
            discount_percent: Some(5.0),
            active: true,
            starts_on: Some("2026-03-01".to_string()),
            ends_on: Some("2026-05-31".to_string()),
        }
    }

    #[test]
    fn test_applies_within_window_and_prefix() {
        let b = bulletin(Some("21"));
        assert!(b.applies_to("21EM", "2026-04-10"));
        assert!(!b.applies_to("31AB", "2026-04-10"));
        assert!(!b.applies_to("21EM", "2026-06-01"));
        assert!(!b.applies_to("21EM", "2026-02-28"));
    }

    #[test]
    fn test_inactive_never_applies() {
        let mut b = bulletin(None);
        b.active = false;
        assert!(!b.applies_to("21EM", "2026-04-10"));
    }
}

//! Translation capability for the handful of localized phrases the
//! resolver emits.
//!
//! The engine never reaches into a global locale object: the resolver takes
//! a [`Translate`] implementation at construction time, so tests and hosts
//! control every string. Only four keys are consumed:
//!
//! - `relative_dates.today` / `relative_dates.tomorrow` /
//!   `relative_dates.yesterday` — each with a `time` placeholder
//! - `relative_dates.countdown.passed`

use std::collections::HashMap;

use crate::error::LocalDateError;

/// Maps a dotted key plus interpolation variables to localized text.
pub trait Translate {
    /// Looks up `key` and substitutes every `%{name}` placeholder with the
    /// matching value from `vars`.
    fn translate(&self, key: &str, vars: &[(&str, &str)]) -> String;
}

/// An in-memory translation catalog.
///
/// Unknown keys fall back to the key itself, so a sparse catalog degrades
/// to readable (if unlocalized) output rather than failing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// An empty catalog. Every lookup falls back to the key.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in English phrases.
    pub fn english() -> Self {
        let mut catalog = Self::new();
        catalog.insert("relative_dates.today", "Today %{time}");
        catalog.insert("relative_dates.tomorrow", "Tomorrow %{time}");
        catalog.insert("relative_dates.yesterday", "Yesterday %{time}");
        catalog.insert("relative_dates.countdown.passed", "This event has already ended");
        catalog
    }

    /// Loads a catalog from a flat JSON object of `key: template` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`LocalDateError::InvalidCatalog`] if the input is not a
    /// JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, LocalDateError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| LocalDateError::InvalidCatalog(e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let template = self.entries.get(key).map(String::as_str).unwrap_or(key);
        let mut out = template.to_string();
        for (name, value) in vars {
            out = out.replace(&format!("%{{{name}}}"), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_substitutes_placeholder() {
        let catalog = Catalog::english();
        let text = catalog.translate("relative_dates.today", &[("time", "at 3:00 PM")]);
        assert_eq!(text, "Today at 3:00 PM");
    }

    #[test]
    fn test_translate_empty_placeholder_leaves_word() {
        let catalog = Catalog::english();
        let text = catalog.translate("relative_dates.tomorrow", &[("time", "")]);
        assert_eq!(text.trim(), "Tomorrow");
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let catalog = Catalog::new();
        assert_eq!(catalog.translate("relative_dates.today", &[]), "relative_dates.today");
    }

    #[test]
    fn test_from_json_object() {
        let catalog = Catalog::from_json(r#"{"relative_dates.today": "Aujourd'hui %{time}"}"#).unwrap();
        let text = catalog.translate("relative_dates.today", &[("time", "à 15:00")]);
        assert_eq!(text, "Aujourd'hui à 15:00");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let result = Catalog::from_json("[1, 2, 3]");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid translation catalog"), "got: {err}");
    }
}

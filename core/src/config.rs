//! Settings shared by every helper of an `ApiTester`.
//!
//! Defaults match a hydra/JSON-LD API. Two of them can be flipped from the
//! environment so a whole suite can regenerate fixtures without code changes.

use std::env;

/// Turns fixture assertions into fixture writes when truthy.
pub const OVERWRITE_ENV: &str = "API_TESTER_OVERWRITE";
/// Overrides the JSON field holding error descriptions.
pub const ERROR_FIELD_ENV: &str = "API_TESTER_ERROR_FIELD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterConfig {
    /// `Accept` header for JSON requests and uploads.
    pub json_accept: String,
    /// `Accept` header for HTML requests.
    pub html_accept: String,
    /// Field of error bodies carrying the human-readable message.
    pub error_description_field: String,
    /// Multipart field name used for the uploaded file.
    pub upload_field: String,
    /// Query appended by `assert_count_response`.
    pub count_query: String,
    /// Regenerate fixtures instead of comparing against them.
    pub overwrite_fixtures: bool,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            json_accept: "application/ld+json".to_string(),
            html_accept: "text/html".to_string(),
            error_description_field: "hydra:description".to_string(),
            upload_field: "file".to_string(),
            count_query: "count=1".to_string(),
            overwrite_fixtures: false,
        }
    }
}

impl TesterConfig {
    /// Defaults, adjusted by `API_TESTER_OVERWRITE` and `API_TESTER_ERROR_FIELD`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup(OVERWRITE_ENV) {
            config.overwrite_fixtures = is_truthy(&value);
        }
        if let Some(field) = lookup(ERROR_FIELD_ENV).filter(|f| !f.trim().is_empty()) {
            config.error_description_field = field;
        }
        config
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_fixtures = overwrite;
        self
    }

    pub fn with_error_field(mut self, field: impl Into<String>) -> Self {
        self.error_description_field = field.into();
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

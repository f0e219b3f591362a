//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds, caps, TTL, priority)
//! - Check the public base URL and hub prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HubConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use url::Url;

use crate::config::schema::{HubConfig, ADMIN_KEY_PLACEHOLDER};
use crate::facets::index::MAX_SAMPLE_REFS;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.site.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "site.base_url",
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("site.base_url", e.to_string())),
    }

    let prefix = &config.site.hub_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::new(
            "site.hub_prefix",
            "must start with '/' and must not end with '/'",
        ));
    }

    let t = &config.thresholds;
    if t.hub_index_min < 1 {
        errors.push(ValidationError::new("thresholds.hub_index_min", "must be at least 1"));
    }
    if t.single_dimension_cap < 1 {
        errors.push(ValidationError::new("thresholds.single_dimension_cap", "must be at least 1"));
    }
    if t.combo_cap < 1 {
        errors.push(ValidationError::new("thresholds.combo_cap", "must be at least 1"));
    }
    if t.sample_refs > MAX_SAMPLE_REFS {
        errors.push(ValidationError::new(
            "thresholds.sample_refs",
            format!("must not exceed {}", MAX_SAMPLE_REFS),
        ));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be greater than 0"));
    }

    if !(0.0..=1.0).contains(&config.sitemap.priority) {
        errors.push(ValidationError::new("sitemap.priority", "must be within [0, 1]"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.admin.enabled
        && (config.admin.api_key.trim().is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER)
    {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set to a real secret when admin is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hub service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the hub service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HubConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Public site settings used to build canonical and sitemap URLs.
    pub site: SiteConfig,

    /// Where the inventory and SEO content snapshots come from.
    pub inventory: InventoryConfig,

    /// Population thresholds and caps.
    pub thresholds: ThresholdConfig,

    /// Allow-list cache settings.
    pub cache: CacheConfig,

    /// Sitemap emission settings.
    pub sitemap: SitemapConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Public site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute base URL of the public site (scheme + host).
    pub base_url: String,

    /// Path prefix every hub lives under, without a trailing slash.
    pub hub_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            hub_prefix: "/hub".to_string(),
        }
    }
}

/// Inventory snapshot sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// JSON file with the product projection.
    pub products_path: Option<String>,

    /// JSON file with SEO content records.
    pub content_path: Option<String>,

    /// Reload snapshots when the files change.
    pub watch: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            products_path: None,
            content_path: None,
            watch: true,
        }
    }
}

/// Population thresholds and output caps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum live population for an indexable hub.
    pub hub_index_min: u64,

    /// Visible body characters that make forced indexing acceptable.
    pub force_index_min_body_chars: usize,

    /// FAQ entries that make forced indexing acceptable.
    pub force_index_min_faq: usize,

    /// Group cap for single-dimension hubs.
    pub single_dimension_cap: usize,

    /// Group cap for 2-3 dimension combinations.
    pub combo_cap: usize,

    /// Sample product references kept per group (at most 5).
    pub sample_refs: usize,

    /// Related hub links attached to a found hub.
    pub related_links_cap: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hub_index_min: 2,
            force_index_min_body_chars: 1500,
            force_index_min_faq: 3,
            single_dimension_cap: 20,
            combo_cap: 50,
            sample_refs: 5,
            related_links_cap: 20,
        }
    }
}

/// Allow-list cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use the cache at all; false means every lookup recomputes.
    pub enabled: bool,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
        }
    }
}

/// Sitemap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Emit `/in-stock/` variants that pass the resolver assessment.
    pub include_in_stock: bool,

    /// `<changefreq>` value for hub URLs.
    pub changefreq: String,

    /// `<priority>` value for hub URLs.
    pub priority: f32,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            include_in_stock: true,
            changefreq: "weekly".to_string(),
            priority: 0.65,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin endpoints.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

/// Placeholder key rejected by validation when admin is enabled.
pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_thresholds() {
        let config = HubConfig::default();
        assert_eq!(config.thresholds.hub_index_min, 2);
        assert_eq!(config.thresholds.force_index_min_body_chars, 1500);
        assert_eq!(config.thresholds.force_index_min_faq, 3);
        assert_eq!(config.thresholds.single_dimension_cap, 20);
        assert_eq!(config.thresholds.combo_cap, 50);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HubConfig = toml::from_str(
            r#"
            [site]
            base_url = "https://trucks.example"

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.site.base_url, "https://trucks.example");
        assert_eq!(config.site.hub_prefix, "/hub");
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.cache.enabled);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the framework.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Debug mode: 404 responses list every registered pattern.
    pub debug: bool,

    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Prefix and trailing slash applied to every route.
    pub routing: RoutingConfig,

    /// Authorization header handling.
    pub auth: AuthConfig,

    /// List endpoint pagination.
    pub pagination: PaginationConfig,

    /// Translation catalogue location.
    pub i18n: I18nConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Route finalization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix joined in front of every pattern.
    pub api_prefix: String,

    /// Append a trailing slash to every pattern.
    pub trailing_slash: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/".to_string(),
            trailing_slash: false,
        }
    }
}

/// Authorization header settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Scheme expected in front of the token (e.g., "Bearer").
    pub header_prefix: String,

    /// HMAC secret for signing tokens. Empty disables token verification.
    pub secret_key: String,

    /// Signing algorithm: HS256, HS384 or HS512.
    pub jwt_algorithm: String,

    /// Lifetime of issued tokens, in seconds.
    pub jwt_expiration_secs: u64,

    /// Clock skew tolerated when checking `exp`, in seconds.
    pub jwt_leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_prefix: "Bearer".to_string(),
            secret_key: String::new(),
            jwt_algorithm: "HS256".to_string(),
            jwt_expiration_secs: 7 * 24 * 3600,
            jwt_leeway_secs: 0,
        }
    }
}

/// Pagination settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Default and maximum page size.
    pub page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// Translation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Directory holding `<locale>.json` catalogues.
    pub locales_path: Option<String>,

    /// Locale used when nothing closer is available.
    pub default_locale: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales_path: None,
            default_locale: "en".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human readable ones.
    pub json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML), path from --config or RESTFUL_SETTINGS
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc with the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Settings are loaded once at startup and read-only afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError, SETTINGS_ENV};
pub use schema::{
    AuthConfig, I18nConfig, ListenerConfig, ObservabilityConfig, PaginationConfig, RoutingConfig,
    Settings,
};

//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (page size, timeouts)
//! - Check the route prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use thiserror::Error;

use crate::config::schema::Settings;
use crate::security::jwt::SUPPORTED_JWT_ALGORITHMS;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
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

/// Validate settings, collecting every problem found.
pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !settings.routing.api_prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "routing.api_prefix",
            format!("must start with '/', got {:?}", settings.routing.api_prefix),
        ));
    }
    if settings.pagination.page_size <= 0 {
        errors.push(ValidationError::new(
            "pagination.page_size",
            "must be greater than zero",
        ));
    }
    if settings.auth.header_prefix.trim().is_empty() {
        errors.push(ValidationError::new("auth.header_prefix", "must not be empty"));
    }
    if !SUPPORTED_JWT_ALGORITHMS.contains(&settings.auth.jwt_algorithm.as_str()) {
        errors.push(ValidationError::new(
            "auth.jwt_algorithm",
            format!(
                "must be one of {}, got {:?}",
                SUPPORTED_JWT_ALGORITHMS.join(", "),
                settings.auth.jwt_algorithm
            ),
        ));
    }
    if settings.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if settings.i18n.default_locale.is_empty() {
        errors.push(ValidationError::new("i18n.default_locale", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the port and backend the proxy cannot start without
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides are merged, before anything binds

use std::str::FromStr;

use axum::http::uri::Authority;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener port is required")]
    MissingPort,

    #[error("backend URL is required")]
    MissingBackend,

    #[error("backend URL {url:?} is invalid: {reason}")]
    InvalidBackend { url: String, reason: String },

    #[error("backend scheme {0:?} is not supported (expected \"http\")")]
    UnsupportedBackendScheme(String),

    #[error("public host {0:?} is not a valid host[:port]")]
    InvalidPublicHost(String),

    #[error("rewrite marker must not be empty")]
    EmptyMarker,

    #[error("rewrite.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("wakeup realm must not be empty")]
    EmptyRealm,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Parse and check the backend base URL.
pub fn parse_backend(raw: &str) -> Result<Url, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingBackend);
    }

    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidBackend {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedBackendScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidBackend {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Validate a merged configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::MissingPort);
    }

    if let Err(e) = parse_backend(&config.backend) {
        errors.push(e);
    }

    if let Some(host) = &config.listener.public_host {
        if Authority::from_str(host).is_err() {
            errors.push(ValidationError::InvalidPublicHost(host.clone()));
        }
    }

    if config.rewrite.marker.is_empty() {
        errors.push(ValidationError::EmptyMarker);
    }
    if config.rewrite.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.wakeup.realm.is_empty() {
        errors.push(ValidationError::EmptyRealm);
    }
    if config.wakeup.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("wakeup.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (drain timeout > 0, body limit > 0)
//! - Check CORS entries parse and do not combine "*" with credentials
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};

use crate::config::schema::{AppConfig, CorsConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.drain_timeout_secs == 0 {
        errors.push(ValidationError::new("server.drain_timeout_secs", "must be greater than 0"));
    }

    if config.bind.max_body_bytes == 0 {
        errors.push(ValidationError::new("bind.max_body_bytes", "must be greater than 0"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.cors.enabled {
        validate_cors(&config.cors, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_cors(cors: &CorsConfig, errors: &mut Vec<ValidationError>) {
    let any_origin = cors.allowed_origins.iter().any(|o| o == "*");
    let any_header = cors.allowed_headers.iter().any(|h| h == "*");

    if cors.allow_credentials && (any_origin || any_header) {
        errors.push(ValidationError::new(
            "cors.allow_credentials",
            "cannot be combined with a \"*\" origin or header",
        ));
    }

    for origin in cors.allowed_origins.iter().filter(|o| *o != "*") {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new("cors.allowed_origins", format!("invalid origin `{}`", origin)));
        }
    }

    for method in &cors.allowed_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::new("cors.allowed_methods", format!("invalid method `{}`", method)));
        }
    }

    let headers = cors
        .allowed_headers
        .iter()
        .filter(|h| *h != "*")
        .map(|h| ("cors.allowed_headers", h))
        .chain(cors.exposed_headers.iter().map(|h| ("cors.exposed_headers", h)));
    for (field, name) in headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(field, format!("invalid header `{}`", name)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = AppConfig::default();
        config.server.drain_timeout_secs = 0;
        config.bind.max_body_bytes = 0;
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.drain_timeout_secs",
                "bind.max_body_bytes",
                "observability.log_level",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn cors_wildcard_with_credentials_is_rejected() {
        let mut config = AppConfig::default();
        config.cors.enabled = true;
        config.cors.allow_credentials = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "cors.allow_credentials");
    }

    #[test]
    fn cors_entries_must_parse() {
        let mut config = AppConfig::default();
        config.cors.enabled = true;
        config.cors.allowed_methods = vec!["GET".into(), "BAD METHOD".into()];
        config.cors.exposed_headers = vec!["x ok".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "cors.allowed_methods");
        assert_eq!(errors[1].field, "cors.exposed_headers");
    }

    #[test]
    fn disabled_cors_is_not_checked() {
        let mut config = AppConfig::default();
        config.cors.allow_credentials = true;
        assert!(validate_config(&config).is_ok());
    }
}

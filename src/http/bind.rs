//! Form binding: parse, decode, validate.
//!
//! # Data Flow
//! ```text
//! request (query + urlencoded body)
//!     → parse_form (ordered key/value pairs, body first)
//!     → decode (serde target, first value per key)
//!     → validate_struct (validator rules)
//! ```

use axum::body::Body;
use axum::http::{header, request::Parts};
use serde::de::DeserializeOwned;
use validator::Validate;

pub type FormValues = Vec<(String, String)>;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("malformed form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    #[error("failed to decode form: {0}")]
    Decode(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Collect form values from an urlencoded body followed by the query string.
///
/// The body is only read when the content type is urlencoded.
pub async fn parse_form(parts: &Parts, body: Option<Body>, limit: usize) -> Result<FormValues, BindError> {
    let mut values = FormValues::new();

    if let Some(body) = body {
        if is_urlencoded(parts) {
            let bytes = axum::body::to_bytes(body, limit)
                .await
                .map_err(|e| BindError::Body(e.to_string()))?;
            values.extend(serde_urlencoded::from_bytes::<FormValues>(&bytes)?);
        }
    }

    if let Some(query) = parts.uri.query() {
        values.extend(serde_urlencoded::from_str::<FormValues>(query)?);
    }

    Ok(values)
}

/// Decode form values into `T`. For repeated keys the first value wins.
pub fn decode<T>(values: &[(String, String)]) -> Result<T, BindError>
where
    T: DeserializeOwned,
{
    let mut first: Vec<(&str, &str)> = Vec::with_capacity(values.len());
    for (k, v) in values {
        if !first.iter().any(|(seen, _)| *seen == k.as_str()) {
            first.push((k.as_str(), v.as_str()));
        }
    }
    let encoded = serde_urlencoded::to_string(&first).map_err(|e| BindError::Decode(e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| BindError::Decode(e.to_string()))
}

pub fn validate_struct<T>(target: &T) -> Result<(), BindError>
where
    T: Validate,
{
    target.validate()?;
    Ok(())
}

fn is_urlencoded(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        .unwrap_or(false)
}

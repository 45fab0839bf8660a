//! Cross-origin policy layer.
//! Builds a `tower_http` CORS layer from the `[cors]` config block.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    #[error("invalid origin `{0}`")]
    Origin(String),

    #[error("invalid method `{0}`")]
    Method(String),

    #[error("invalid header `{0}`")]
    Header(String),

    #[error("credentials cannot be allowed together with a wildcard")]
    WildcardCredentials,
}

/// `None` when CORS is disabled.
pub fn cors_layer(config: &CorsConfig) -> Result<Option<CorsLayer>, CorsError> {
    if !config.enabled {
        return Ok(None);
    }

    let any_origin = config.allowed_origins.iter().any(|o| o == "*");
    let any_header = config.allowed_headers.iter().any(|h| h == "*");
    if config.allow_credentials && (any_origin || any_header) {
        return Err(CorsError::WildcardCredentials);
    }

    let origin = if any_origin {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| CorsError::Origin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let methods = config
        .allowed_methods
        .iter()
        .map(|m| Method::from_bytes(m.as_bytes()).map_err(|_| CorsError::Method(m.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let headers = if any_header {
        AllowHeaders::any()
    } else {
        AllowHeaders::list(header_names(&config.allowed_headers)?)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers(header_names(&config.exposed_headers)?)
        .allow_credentials(config.allow_credentials);

    if config.max_age_secs > 0 {
        layer = layer.max_age(Duration::from_secs(config.max_age_secs));
    }

    tracing::debug!(origins = ?config.allowed_origins, "CORS enabled");
    Ok(Some(layer))
}

fn header_names(names: &[String]) -> Result<Vec<HeaderName>, CorsError> {
    names
        .iter()
        .map(|h| HeaderName::from_bytes(h.as_bytes()).map_err(|_| CorsError::Header(h.clone())))
        .collect()
}

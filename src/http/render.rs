//! JSON and XML rendering.
//!
//! Invoked by handlers through the context, never by the dispatch core.

use axum::http::StatusCode;
use serde::Serialize;

use crate::config::RenderConfig;
use crate::http::response::ResponseWriter;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml; charset=utf-8";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml encoding failed: {0}")]
    Xml(String),
}

/// Serialize `value` as JSON and stage it with `status`.
pub fn json<T>(
    writer: &mut ResponseWriter,
    status: StatusCode,
    value: &T,
    config: &RenderConfig,
) -> Result<(), RenderError>
where
    T: Serialize + ?Sized,
{
    let mut body = if config.pretty_json {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    body.push(b'\n');
    writer.write(status, APPLICATION_JSON, body);
    Ok(())
}

/// Serialize `value` as XML and stage it with `status`.
///
/// The root element is named after the serialized type.
pub fn xml<T>(
    writer: &mut ResponseWriter,
    status: StatusCode,
    value: &T,
    config: &RenderConfig,
) -> Result<(), RenderError>
where
    T: Serialize,
{
    let encoded = quick_xml::se::to_string(value).map_err(|e| RenderError::Xml(e.to_string()))?;
    let body = if config.xml_declaration {
        format!("{}{}", XML_DECLARATION, encoded)
    } else {
        encoded
    };
    writer.write(status, APPLICATION_XML, body);
    Ok(())
}

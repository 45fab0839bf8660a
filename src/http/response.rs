//! Response handling and transformation.
//!
//! # Responsibilities
//! - Stage the response a handler chain produces (status, headers, body)
//! - Map handler failures to exactly one plain-text error response
//! - Produce the dispatcher's own 404 / 405 answers
//!
//! # Design Decisions
//! - A failed chain discards whatever was staged before the failure
//! - Error bodies are `text/plain` with `nosniff`, message verbatim

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::error::HandlerError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Write handle given to handlers through the request context.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    written: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            written: false,
        }
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.written = true;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Stage a full response: status, content type and body.
    pub fn write(&mut self, status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.status = status;
        self.body = body.into();
        self.written = true;
    }

    /// Whether a handler has staged anything.
    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Translate a chain failure into its response.
pub fn error_response(err: &HandlerError) -> Response {
    plain(err.status(), err.to_string())
}

pub fn bad_request(message: &str) -> Response {
    plain(StatusCode::BAD_REQUEST, message)
}

pub fn not_found() -> Response {
    plain(StatusCode::NOT_FOUND, "404 page not found")
}

pub fn method_not_allowed(allowed: &[String]) -> Response {
    let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
    if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

fn plain(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, TEXT_PLAIN),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        body.into(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::HttpError;

    #[test]
    fn untouched_writer_is_empty_ok() {
        let writer = ResponseWriter::new();
        assert!(!writer.is_written());
        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn http_errors_use_their_status() {
        let err = HandlerError::from(HttpError::unauthorized("who are you"));
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn method_not_allowed_lists_methods() {
        let response = method_not_allowed(&["GET".to_string(), "POST".to_string()]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }
}

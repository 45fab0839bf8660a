//! Handler failure types.
//!
//! # Design Decisions
//! - `HttpError` carries a status chosen by the application
//! - Every other failure is opaque and answered with 500
//! - Failures never escape the chain; the dispatcher turns them into a response

use axum::http::StatusCode;

use crate::http::bind::BindError;
use crate::http::render::RenderError;

/// Result type returned by every handler.
pub type HandlerResult = Result<(), HandlerError>;

/// An explicit failure with a message and the HTTP status to answer with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

/// Any failure a handler can report.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Wrap an arbitrary error as an opaque failure.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }

    /// Opaque failure from a plain message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::Other(message.to_string().into())
    }

    /// Status code this failure is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Http(e) => e.status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured host and requested port
//! - Report bind failures as a distinct error (fatal to `run`)

use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// The host/port pair is not a socket address.
    Address(String),
    /// Failed to bind to address.
    Bind(SocketAddr, std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address(addr) => write!(f, "Invalid listen address: {}", addr),
            ListenerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Address(_) => None,
            ListenerError::Bind(_, e) => Some(e),
        }
    }
}

/// Bind `host:port`. Port 0 picks an ephemeral port.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = listen_address(host, port)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ListenerError::Bind(addr, e))?;

    let local_addr = listener.local_addr().map_err(|e| ListenerError::Bind(addr, e))?;
    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}

fn listen_address(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let raw = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };
    raw.parse().map_err(|_| ListenerError::Address(raw))
}

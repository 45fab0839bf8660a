//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and lifecycle settings.
    pub server: ServerConfig,

    /// Cross-origin policy, forwarded to the CORS layer.
    pub cors: CorsConfig,

    /// Response rendering options.
    pub render: RenderConfig,

    /// Form binding limits.
    pub bind: BindConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener and lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Install interrupt-driven graceful shutdown.
    pub graceful: bool,

    /// Time in-flight requests get to finish after an interrupt.
    pub drain_timeout_secs: u64,

    /// Per-request timeout in seconds (0 disables).
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            graceful: true,
            drain_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,

    /// Allowed origins; "*" allows any.
    pub allowed_origins: Vec<String>,

    pub allowed_methods: Vec<String>,

    /// Allowed request headers; "*" allows any.
    pub allowed_headers: Vec<String>,

    pub exposed_headers: Vec<String>,

    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds (0 omits the header).
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "HEAD".to_string()],
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: 0,
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Indent JSON output.
    pub pretty_json: bool,

    /// Prefix XML output with an `<?xml ...?>` declaration.
    pub xml_declaration: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty_json: false,
            xml_declaration: true,
        }
    }
}

/// Form binding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BindConfig {
    /// Maximum urlencoded body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

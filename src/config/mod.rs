//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → cors / render / bind blocks forwarded to their collaborators
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routes never change while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BindConfig;
pub use schema::CorsConfig;
pub use schema::ObservabilityConfig;
pub use schema::RenderConfig;
pub use schema::ServerConfig;

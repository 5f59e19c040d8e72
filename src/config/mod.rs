//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the proxy starts
//! - All fields have defaults; only port and backend must be supplied
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, LoggingConfig, ProxyConfig, RewriteConfig, TimeoutConfig,
    WakeupConfig,
};
pub use validation::{validate_config, ValidationError};

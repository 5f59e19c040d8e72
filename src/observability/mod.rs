//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → tower-http TraceLayer spans per request
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) flows from the listener to the backend
//! - Structured fields (origin, status, error) rather than formatted strings

pub mod logging;

pub use logging::init_logging;

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (Proxy::new):
//!     Merge config → Validate → Bind listener → Build router
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds before traffic is served, so a taken port is reported early

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

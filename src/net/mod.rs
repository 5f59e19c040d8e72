//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (bind, fail fast when taken)
//!     → axum::serve (accept loop, one task per connection)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - No TLS on the listener: CWMP traffic is relayed as plain HTTP
//! - Each connection is served independently; no shared mutable state

pub mod listener;

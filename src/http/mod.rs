//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → /client  → wakeup gate → wakeup handler
//!     → anything else → forward.rs (buffer, rewrite, retarget)
//!     → headers.rs (hop-by-hop, X-Forwarded-For, Content-Length)
//!     → backend (ACS) response streamed back to the CPE
//! ```

pub mod forward;
pub mod headers;
pub mod server;

pub use forward::{direct, Backend};
pub use server::{AppState, Proxy};

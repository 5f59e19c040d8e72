//! Wakeup (connection request) subsystem.
//!
//! # Data Flow
//! ```text
//! ACS: GET /client?origin=<cpe url>, Authorization: Basic ...
//!     → gate.rs (extract credentials, 401 + challenge if absent)
//!     → handler.rs (validate origin)
//!     → client.rs (authenticated GET to the CPE, Basic or Digest)
//!     → CPE status code relayed back to the ACS
//! ```
//!
//! # Design Decisions
//! - Credentials are relayed, never checked locally: the CPE decides
//! - One outbound round-trip per call; failures surface as 400, no retries
//! - Bounded timeout on the outbound call

pub mod client;
pub mod digest;
pub mod gate;
pub mod handler;

pub use client::{WakeupClient, WakeupError};
pub use gate::{require_credentials, Realm, WakeupCredentials};
pub use handler::{wakeup_handler, WakeupParams};

/// Return the parameters after an HTTP auth `scheme`, matched case-insensitively.
pub(crate) fn strip_auth_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let value = value.trim_start();
    let head = value.get(..scheme.len())?;
    if !head.eq_ignore_ascii_case(scheme) {
        return None;
    }
    let rest = &value[scheme.len()..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest.trim_start())
    } else {
        None
    }
}

//! CWMP message handling.
//!
//! # Data Flow
//! ```text
//! Inform body (raw bytes)
//!     → locator.rs (find marker, slice out the URL value)
//!     → rewriter.rs (swap URL for http://<proxy>/client?origin=<url>)
//!     → forwarded to the ACS with the new Content-Length
//! ```
//!
//! # Design Decisions
//! - Bytes in, bytes out: the SOAP envelope is never parsed
//! - Everything here is pure and synchronous

pub mod locator;
pub mod rewriter;

pub use locator::locate;
pub use rewriter::{redirection_url, rewrite, Rewritten};

/// Parameter name suffix shared by `InternetGatewayDevice.` and `Device.` data models.
pub const CONNECTION_REQUEST_MARKER: &str = "ConnectionRequestURL";

/// Path of the wakeup endpoint embedded in every redirection URL.
pub const WAKEUP_PATH: &str = "/client";

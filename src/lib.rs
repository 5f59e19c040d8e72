//! CWMP (TR-069) proxy library.
//!
//! Sits between CPEs and their ACS, rewrites the `ConnectionRequestURL` each
//! CPE announces so it points back at the proxy, and relays the ACS's later
//! connection requests to CPEs it could not otherwise reach.

pub mod config;
pub mod cwmp;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod wakeup;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::Proxy;
pub use lifecycle::Shutdown;

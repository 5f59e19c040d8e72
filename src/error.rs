//! Top-level error type for building and running a proxy.

use axum::http::uri::InvalidUri;

use crate::config::ConfigError;
use crate::net::listener::ListenerError;
use crate::wakeup::WakeupError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("backend address is not a valid URI authority: {0}")]
    BackendUri(#[from] InvalidUri),

    #[error(transparent)]
    Wakeup(#[from] WakeupError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

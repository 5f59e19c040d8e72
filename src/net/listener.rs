//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Report a busy or invalid address as a startup error
//!
//! # Design Decisions
//! - Binding happens before the router is built, so a taken port fails fast
//! - Accepting and per-connection tasks are left to `axum::serve`

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the listener described by `config`.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address = format!("{}:{}", config.bind_host, config.port);
    let listener = TcpListener::bind((config.bind_host.as_str(), config.port))
        .await
        .map_err(|source| ListenerError::Bind { address, source })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_already_bound() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ListenerConfig {
            bind_host: "127.0.0.1".into(),
            port: taken.local_addr().unwrap().port(),
            public_host: None,
        };

        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
        assert!(err.to_string().starts_with("Failed to bind 127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_bind_free_port() {
        let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = free.local_addr().unwrap().port();
        drop(free);

        let config = ListenerConfig {
            bind_host: "127.0.0.1".into(),
            port,
            public_host: None,
        };
        let listener = bind(&config).await.unwrap();
        assert_eq!(listener.local_addr().unwrap().port(), port);
    }
}

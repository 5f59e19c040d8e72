//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::cwmp::CONNECTION_REQUEST_MARKER;

/// Root configuration for the CWMP proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base URL of the ACS every CPE request is forwarded to.
    ///
    /// Only scheme and authority are used; the request path is kept as sent.
    pub backend: String,

    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Inform body rewriting.
    pub rewrite: RewriteConfig,

    /// Wakeup (connection request) endpoint.
    pub wakeup: WakeupConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// TCP port. Zero means unset and is rejected by validation.
    pub port: u16,

    /// Host (and port) written into redirection URLs instead of the
    /// inbound `Host` header, for deployments behind a NAT or balancer.
    pub public_host: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 0,
            public_host: None,
        }
    }
}

/// Inform rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Marker that precedes the connection request URL.
    pub marker: String,

    /// Largest body buffered for rewriting. Larger bodies stream through untouched.
    pub max_body_bytes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            marker: CONNECTION_REQUEST_MARKER.to_string(),
            max_body_bytes: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Wakeup endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WakeupConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    pub realm: String,

    /// Deadline for the outbound call to the CPE, in seconds.
    pub timeout_secs: u64,
}

impl Default for WakeupConfig {
    fn default() -> Self {
        Self {
            realm: "cwmp-proxy".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            connect_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "cwmp_proxy=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            backend = "http://acs.example.net:7547"

            [listener]
            port = 1717
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, "http://acs.example.net:7547");
        assert_eq!(config.listener.port, 1717);
        assert_eq!(config.listener.bind_host, "0.0.0.0");
        assert_eq!(config.rewrite.marker, "ConnectionRequestURL");
        assert_eq!(config.wakeup.realm, "cwmp-proxy");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_full_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            backend = "http://10.1.1.1"

            [listener]
            bind_host = "127.0.0.1"
            port = 8085
            public_host = "proxy.example.net:8085"

            [rewrite]
            max_body_bytes = 1024

            [wakeup]
            realm = "acs-wakeup"
            timeout_secs = 3

            [timeouts]
            request_secs = 20
            connect_secs = 2

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.public_host.as_deref(), Some("proxy.example.net:8085"));
        assert_eq!(config.rewrite.max_body_bytes, 1024);
        assert_eq!(config.wakeup.timeout_secs, 3);
        assert_eq!(config.timeouts.connect_secs, 2);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}

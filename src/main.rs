//! CWMP proxy
//!
//! Transparent TR-069 proxy that makes CPEs behind NAT reachable for
//! connection requests.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                  CWMP PROXY                  │
//!   CPE  Inform       │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ──────────────────┼─▶│ listener │──▶│ forward  │──▶│ rewriter │──┼──▶ ACS
//!                     │  └──────────┘   └──────────┘   └──────────┘  │
//!                     │                                              │
//!   CPE  ◀────────────┼─────── GET (Basic/Digest) ◀──┐               │
//!                     │  ┌──────────┐   ┌──────────┐ │               │
//!   ACS  /client ─────┼─▶│   gate   │──▶│  wakeup  │─┘               │
//!        ?origin=     │  └──────────┘   └──────────┘                 │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! cwmp-proxy --port 1717 --backend http://acs.example.net:7547
//! cwmp-proxy --config /etc/cwmp-proxy.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cwmp_proxy::config::{load_config, ConfigError, LogFormat, ProxyConfig};
use cwmp_proxy::lifecycle::signals::wait_for_signal;
use cwmp_proxy::observability::init_logging;
use cwmp_proxy::{Proxy, Shutdown};

#[derive(Parser)]
#[command(name = "cwmp-proxy", version)]
#[command(about = "CWMP (TR-069) proxy routing ACS connection requests to CPEs", long_about = None)]
struct Cli {
    /// TOML configuration file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CWMP proxy port
    #[arg(short, long)]
    port: Option<u16>,

    /// The backend ACS server (e.g. http://acs.example.net:7547)
    #[arg(short, long)]
    backend: Option<String>,

    /// Interface to bind
    #[arg(long)]
    bind: Option<String>,

    /// Host[:port] written into redirection URLs instead of the Host header
    #[arg(long)]
    public_host: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Load the config file (if any) and apply command line overrides.
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_host = bind;
        }
        if let Some(public_host) = self.public_host {
            config.listener.public_host = Some(public_host);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cwmp-proxy: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("cwmp-proxy: {}", e);
        return ExitCode::from(2);
    }

    tracing::info!("cwmp-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let proxy = match Proxy::new(config).await {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!(error = %e, "The CWMP proxy cannot be created (see --help)");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    if let Err(e) = proxy.run(server_shutdown).await {
        tracing::error!(error = %e, "The CWMP proxy cannot be started");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

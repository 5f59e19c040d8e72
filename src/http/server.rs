//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router owned by one proxy instance
//! - Wire up middleware (request ID, tracing, timeout)
//! - Mount the wakeup endpoint behind the credential gate
//! - Send every other path to the forwarding handler
//! - Serve on a bound listener until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::FromRef,
    middleware,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, validation::parse_backend, ConfigError, ProxyConfig};
use crate::cwmp::WAKEUP_PATH;
use crate::error::ProxyError;
use crate::http::forward::{proxy_handler, Backend};
use crate::net::listener;
use crate::wakeup::{require_credentials, wakeup_handler, Realm, WakeupClient};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub backend: Arc<Backend>,
    pub client: Client<HttpConnector, Body>,
    pub wakeup: WakeupClient,
    pub realm: Realm,
}

impl FromRef<AppState> for WakeupClient {
    fn from_ref(state: &AppState) -> Self {
        state.wakeup.clone()
    }
}

impl FromRef<AppState> for Realm {
    fn from_ref(state: &AppState) -> Self {
        state.realm.clone()
    }
}

/// A CWMP proxy: one listener, one backend, one router.
pub struct Proxy {
    router: Router,
    listener: TcpListener,
    config: Arc<ProxyConfig>,
}

impl Proxy {
    /// Validate `config` and bind its listener.
    ///
    /// Fails before serving anything when the configuration is incomplete
    /// or the port is already taken.
    pub async fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let listener = listener::bind(&config.listener).await?;
        Self::build(config, listener)
    }

    /// Validate `config` and serve on an already bound listener.
    /// The configured bind host and port are ignored.
    pub fn with_listener(config: ProxyConfig, listener: TcpListener) -> Result<Self, ProxyError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        Self::build(config, listener)
    }

    fn build(config: ProxyConfig, listener: TcpListener) -> Result<Self, ProxyError> {
        let backend_url = parse_backend(&config.backend)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        if backend_url.path() != "/" || backend_url.query().is_some() {
            tracing::warn!(
                backend = %backend_url,
                "Backend path and query are ignored; requests keep the path the CPE used"
            );
        }
        let backend = Backend::from_url(&backend_url)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            backend: Arc::new(backend),
            client,
            wakeup: WakeupClient::new(Duration::from_secs(config.wakeup.timeout_secs))?,
            realm: Realm::new(&config.wakeup.realm),
            config: Arc::new(config),
        };

        let router = Self::build_router(&state);
        Ok(Self {
            router,
            listener,
            config: state.config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let gate = middleware::from_fn_with_state(state.realm.clone(), require_credentials);

        Router::new()
            .route(WAKEUP_PATH, any(wakeup_handler).layer(gate))
            .fallback(proxy_handler)
            .with_state(state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(state.config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ProxyError> {
        let addr = self.listener.local_addr().map_err(ProxyError::Serve)?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend,
            "CWMP proxy listening"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await
            .map_err(ProxyError::Serve)?;

        tracing::info!("CWMP proxy stopped");
        Ok(())
    }
}

//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use cwmp_proxy::{Proxy, ProxyConfig, Shutdown};
use tokio::net::TcpListener;

/// A request as seen by a mock server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub type Captures = Arc<Mutex<Vec<Captured>>>;

/// Serve `app` on an ephemeral localhost port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a mock ACS that records every request and echoes its body back.
pub async fn start_mock_acs() -> (SocketAddr, Captures) {
    start_programmable_acs(|_| StatusCode::OK).await
}

/// Start a mock ACS whose status is chosen per request; the body is echoed.
pub async fn start_programmable_acs<F>(status: F) -> (SocketAddr, Captures)
where
    F: Fn(&Captured) -> StatusCode + Clone + Send + Sync + 'static,
{
    let captures: Captures = Arc::new(Mutex::new(Vec::new()));
    let seen = captures.clone();

    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let seen = seen.clone();
            let status = status.clone();
            async move {
                let captured = Captured {
                    method,
                    uri,
                    headers,
                    body: body.clone(),
                };
                let code = status(&captured);
                seen.lock().unwrap().push(captured);
                (code, [("x-acs", "mock")], body).into_response()
            }
        },
    );

    (spawn(app).await, captures)
}

/// Default config pointing at `backend`.
pub fn proxy_config(backend: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.backend = format!("http://{}", backend);
    config
}

/// Start a proxy for `config` on an ephemeral port.
pub async fn start_proxy_with(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_host = "127.0.0.1".into();
    config.listener.port = addr.port();

    let proxy = Proxy::with_listener(config, listener).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = proxy.run(server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a proxy in front of `backend` with default settings.
pub async fn start_proxy(backend: SocketAddr) -> (SocketAddr, Shutdown) {
    start_proxy_with(proxy_config(backend)).await
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// HTTP client that ignores system proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// An Inform fragment announcing `url` as the connection request URL.
pub fn inform_with(url: &str) -> String {
    format!(
        r#"
            <ParameterValueStruct>
                <Name>InternetGatewayDevice.ManagementServer.ConnectionRequestURL</Name>
                <Value xsi:type="xsd:string">{}</Value>
            </ParameterValueStruct>
        "#,
        url
    )
}

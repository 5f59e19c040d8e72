//! Outbound connection request client.
//!
//! # Responsibilities
//! - Issue the authenticated GET to the CPE's connection request URL
//! - Answer one `Basic` or `Digest` challenge with the relayed credentials
//! - Enforce a deadline so an unresponsive CPE cannot pin a task
//!
//! # Design Decisions
//! - The first GET carries no credentials: the CPE picks the scheme
//! - A challenge is answered once; that response is final
//! - System proxy settings are ignored, the call goes straight to the CPE

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Response;
use url::{Position, Url};

use super::digest::{cnonce, DigestChallenge};
use super::gate::WakeupCredentials;

/// Error type for wakeup calls.
#[derive(Debug, thiserror::Error)]
pub enum WakeupError {
    #[error("origin {origin:?} is not a valid connection request URL: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("connection request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to build wakeup client: {0}")]
    Client(#[source] reqwest::Error),
}

/// HTTP client used to wake CPEs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WakeupClient {
    http: reqwest::Client,
}

impl WakeupClient {
    /// Create a client whose calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, WakeupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(WakeupError::Client)?;
        Ok(Self { http })
    }

    /// Send the connection request to `origin` and return the CPE's status.
    pub async fn wake(
        &self,
        origin: &str,
        credentials: &WakeupCredentials,
    ) -> Result<StatusCode, WakeupError> {
        let url = parse_origin(origin)?;

        let response = self.http.get(url.clone()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response.status());
        }

        let Some(authorization) = answer_challenge(&response, &url, credentials) else {
            tracing::debug!(origin = %url, "CPE challenge not answerable");
            return Ok(response.status());
        };

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await?;
        Ok(response.status())
    }
}

fn parse_origin(origin: &str) -> Result<Url, WakeupError> {
    let invalid = |reason: String| WakeupError::InvalidOrigin {
        origin: origin.to_string(),
        reason,
    };

    let url = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

/// Pick a challenge from the 401 and build the matching `Authorization`.
/// Digest is preferred when the CPE offers both.
fn answer_challenge(
    response: &Response,
    url: &Url,
    credentials: &WakeupCredentials,
) -> Option<HeaderValue> {
    let challenges: Vec<&str> = response
        .headers()
        .get_all(header::WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if let Some(digest) = challenges.iter().find_map(|c| DigestChallenge::parse(c)) {
        let uri = &url[Position::BeforePath..Position::AfterQuery];
        let value = digest.authorize(
            "GET",
            uri,
            &credentials.username,
            &credentials.password,
            &cnonce(),
        );
        return HeaderValue::from_str(&value).ok();
    }

    if challenges
        .iter()
        .any(|c| super::strip_auth_scheme(c, "Basic").is_some())
    {
        return HeaderValue::from_str(&basic_authorization(credentials)).ok();
    }

    None
}

fn basic_authorization(credentials: &WakeupCredentials) -> String {
    let pair = format!("{}:{}", credentials.username, credentials.password);
    format!("Basic {}", STANDARD.encode(pair))
}

//! Wakeup endpoint handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;

use super::client::WakeupClient;
use super::gate::WakeupCredentials;

/// Query parameters of `/client`.
#[derive(Debug, Default, Deserialize)]
pub struct WakeupParams {
    /// The CPE's own connection request URL, as embedded by the rewriter.
    #[serde(default)]
    pub origin: String,
}

/// Wake the CPE named by `origin` and relay its status code.
pub async fn wakeup_handler(
    State(client): State<WakeupClient>,
    Extension(credentials): Extension<WakeupCredentials>,
    Query(params): Query<WakeupParams>,
) -> Response {
    if params.origin.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "The origin connection request URL must be provided",
        )
            .into_response();
    }

    tracing::info!(
        origin = %params.origin,
        username = %credentials.username,
        "Sending connection request"
    );

    match client.wake(&params.origin, &credentials).await {
        Ok(status) => {
            tracing::info!(origin = %params.origin, status = %status, "CPE answered connection request");
            status.into_response()
        }
        Err(e) => {
            tracing::warn!(origin = %params.origin, error = %e, "Connection request failed");
            (
                StatusCode::BAD_REQUEST,
                format!("Communication with the CPE failed: {}", e),
            )
                .into_response()
        }
    }
}

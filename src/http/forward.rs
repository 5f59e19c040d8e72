//! Reverse forwarding of CPE traffic to the ACS.
//!
//! # Responsibilities
//! - Buffer the inbound body (bounded) and run it through the rewriter
//! - Retarget the request at the backend, keeping path and query
//! - Relay the backend response back to the CPE
//!
//! # Design Decisions
//! - A body read error degrades to pass-through of what was read
//! - Oversized bodies stream through unmodified
//! - Responses are streamed, never buffered

use std::net::SocketAddr;
use std::str::FromStr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        header,
        request::Parts,
        uri::{Authority, InvalidUri, InvalidUriParts, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use http_body_util::BodyExt;
use url::{Position, Url};

use crate::cwmp;
use crate::http::headers::{append_forwarded_for, set_content_length, strip_hop_by_hop};
use crate::http::server::AppState;

/// Scheme and authority every forwarded request is sent to.
#[derive(Debug, Clone)]
pub struct Backend {
    scheme: Scheme,
    authority: Authority,
}

impl Backend {
    /// Build from a validated backend URL. The URL path is not used.
    pub fn from_url(url: &Url) -> Result<Self, InvalidUri> {
        Ok(Self {
            scheme: Scheme::from_str(url.scheme())?,
            authority: Authority::from_str(&url[Position::BeforeHost..Position::AfterPort])?,
        })
    }

    /// Swap scheme and authority of `uri`, keeping its path and query.
    pub fn retarget(&self, uri: &Uri) -> Result<Uri, InvalidUriParts> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts)
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// Outcome of reading an inbound body.
#[derive(Debug)]
pub enum BufferedBody {
    /// The whole body.
    Complete(Bytes),
    /// The transport failed part way; these are the bytes read so far.
    Truncated(Bytes),
    /// More than the limit arrived; `rest` holds the unread remainder.
    Oversized { prefix: Bytes, rest: Body },
}

/// Read `body` into memory, stopping once more than `limit` bytes arrived.
pub async fn buffer_body(mut body: Body, limit: usize) -> BufferedBody {
    let mut buf = BytesMut::new();

    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Ok(data) = frame.into_data() {
                    buf.extend_from_slice(&data);
                    if buf.len() > limit {
                        return BufferedBody::Oversized {
                            prefix: buf.freeze(),
                            rest: body,
                        };
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, read = buf.len(), "Failed to read request body, skipping rewrite");
                return BufferedBody::Truncated(buf.freeze());
            }
        }
    }

    BufferedBody::Complete(buf.freeze())
}

/// Host written into redirection URLs: configured override, then the
/// `Host` header, then the request URI authority.
fn proxy_host(public_host: Option<&str>, parts: &Parts) -> Option<String> {
    if let Some(host) = public_host {
        return Some(host.to_string());
    }
    parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
}

/// Prepare an inbound CPE request for the backend.
///
/// Rewrites the connection request URL in the body, fixes Content-Length,
/// strips hop-by-hop headers and points the URI at the backend.
pub async fn direct(state: &AppState, request: Request<Body>) -> Result<Request<Body>, InvalidUriParts> {
    let (mut parts, body) = request.into_parts();
    let rewrite = &state.config.rewrite;
    let host = proxy_host(state.config.listener.public_host.as_deref(), &parts);

    let body = match buffer_body(body, rewrite.max_body_bytes).await {
        BufferedBody::Complete(bytes) => match &host {
            Some(host) => {
                let out = cwmp::rewrite(bytes, &rewrite.marker, host);
                if let Some(origin) = &out.origin {
                    tracing::info!(origin = %origin, proxy_host = %host, "Rewrote connection request URL");
                }
                set_content_length(&mut parts.headers, out.length);
                Body::from(out.body)
            }
            None => {
                tracing::warn!("No host to build a redirection URL from, skipping rewrite");
                set_content_length(&mut parts.headers, bytes.len());
                Body::from(bytes)
            }
        },
        BufferedBody::Truncated(bytes) => {
            set_content_length(&mut parts.headers, bytes.len());
            Body::from(bytes)
        }
        BufferedBody::Oversized { prefix, rest } => {
            tracing::debug!(
                limit = rewrite.max_body_bytes,
                "Request body exceeds rewrite limit, streaming unchanged"
            );
            let head = stream::once(async move { Ok::<_, axum::Error>(prefix) });
            Body::from_stream(head.chain(rest.into_data_stream()))
        }
    };

    strip_hop_by_hop(&mut parts.headers);
    if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        append_forwarded_for(&mut parts.headers, peer.ip());
    }

    parts.uri = state.backend.retarget(&parts.uri)?;
    parts.version = Version::HTTP_11;

    Ok(Request::from_parts(parts, body))
}

/// Reverse proxy endpoint: every path except the wakeup one lands here.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Forwarding CPE request"
    );

    let request = match direct(&state, request).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build backend URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    match state.client.request(request).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            tracing::debug!(request_id = %request_id, status = %parts.status, "Backend responded");
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %state.backend.authority(),
                error = %e,
                "Upstream error"
            );
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

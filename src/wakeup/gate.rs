//! Wakeup access gate.
//! Requires Basic credentials and hands them to the wakeup handler.

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::strip_auth_scheme;

/// Credentials attached to an admitted wakeup request.
///
/// They only live for one call and are relayed to the CPE unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct WakeupCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for WakeupCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeupCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Realm announced to unauthenticated callers.
#[derive(Debug, Clone)]
pub struct Realm(Arc<str>);

impl Realm {
    pub fn new(realm: impl AsRef<str>) -> Self {
        Self(Arc::from(realm.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn challenge(&self) -> HeaderValue {
        let realm = self.0.replace('\\', "\\\\").replace('"', "\\\"");
        HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"cwmp-proxy\""))
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
///
/// Anything else (other scheme, bad base64, no colon, non UTF-8) is `None`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<WakeupCredentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = strip_auth_scheme(value, "Basic")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(WakeupCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Middleware admitting only requests that carry Basic credentials.
pub async fn require_credentials(
    State(realm): State<Realm>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match basic_credentials(req.headers()) {
        Some(credentials) => {
            req.extensions_mut().insert(credentials);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Wakeup request without credentials");
            (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, realm.challenge())],
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::any, Extension, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
    }

    fn gated(calls: Arc<AtomicUsize>, seen: Arc<std::sync::Mutex<Option<WakeupCredentials>>>) -> Router {
        let handler = move |Extension(credentials): Extension<WakeupCredentials>| {
            let calls = calls.clone();
            let seen = seen.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                *seen.lock().unwrap() = Some(credentials);
                StatusCode::OK
            }
        };
        Router::new().route(
            "/client",
            any(handler).layer(middleware::from_fn_with_state(
                Realm::new("cwmp-proxy"),
                require_credentials,
            )),
        )
    }

    #[test]
    fn test_basic_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, basic("FeNoMeNa", "12:34").parse().unwrap());
        assert_eq!(
            basic_credentials(&headers),
            Some(WakeupCredentials {
                username: "FeNoMeNa".into(),
                password: "12:34".into(),
            })
        );
    }

    #[test]
    fn test_malformed_credentials() {
        for value in [
            "Bearer abc".to_string(),
            "Basic !!!not-base64!!!".to_string(),
            format!("Basic {}", STANDARD.encode("no-colon")),
            format!("Basic {}", STANDARD.encode([0xff, b':', 0xfe])),
        ] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            assert_eq!(basic_credentials(&headers), None, "{}", value);
        }
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = WakeupCredentials {
            username: "user".into(),
            password: "secret".into(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }

    #[tokio::test]
    async fn test_gate_forwards_credentials() {
        for (user, pass) in [("user", "pass"), ("FeNoMeNa", "123456")] {
            let calls = Arc::new(AtomicUsize::new(0));
            let seen = Arc::new(std::sync::Mutex::new(None));
            let request = Request::builder()
                .uri("/client")
                .header(header::AUTHORIZATION, basic(user, pass))
                .body(Body::empty())
                .unwrap();

            let response = gated(calls.clone(), seen.clone()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            let seen = seen.lock().unwrap().clone().unwrap();
            assert_eq!(seen.username, user);
            assert_eq!(seen.password, pass);
        }
    }

    #[tokio::test]
    async fn test_gate_without_credentials() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(std::sync::Mutex::new(None));
        let request = Request::builder().uri("/client").body(Body::empty()).unwrap();

        let response = gated(calls.clone(), seen).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"cwmp-proxy\""
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_realm_challenge_quotes() {
        assert_eq!(Realm::new("a\"b").challenge(), "Basic realm=\"a\\\"b\"");
    }
}

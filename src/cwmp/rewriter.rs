//! Inform body rewriting.
//!
//! # Responsibilities
//! - Swap the CPE's connection request URL for a proxy-routed redirection URL
//! - Keep the original URL recoverable as the `origin` query value
//! - Report the new body length for the outgoing Content-Length
//!
//! # Design Decisions
//! - Bodies without a connection request URL come back byte-identical
//! - Exactly one substitution: the first textual match of the URL
//! - The input body is never mutated; a rewrite yields a fresh buffer

use bytes::{Bytes, BytesMut};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::cwmp::locator::{find, locate};
use crate::cwmp::WAKEUP_PATH;

/// Characters that would change how the `origin` query value is split or
/// decoded. Everything else, `:` `/` `?` `=` included, stays literal.
const ORIGIN_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+');

/// Result of running a body through the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Body to forward.
    pub body: Bytes,
    /// Byte length of `body`.
    pub length: usize,
    /// The connection request URL that was replaced, if any.
    pub origin: Option<String>,
}

impl Rewritten {
    fn unchanged(body: Bytes) -> Self {
        Self {
            length: body.len(),
            body,
            origin: None,
        }
    }
}

/// Build `http://<proxy_host>/client?origin=<origin>`.
pub fn redirection_url(proxy_host: &str, origin: &str) -> String {
    format!(
        "http://{}{}?origin={}",
        proxy_host,
        WAKEUP_PATH,
        utf8_percent_encode(origin, ORIGIN_VALUE)
    )
}

/// Rewrite the connection request URL found after `marker`, if any.
pub fn rewrite(body: Bytes, marker: &str, proxy_host: &str) -> Rewritten {
    let Some(origin) = locate(&body, marker).map(str::to_owned) else {
        return Rewritten::unchanged(body);
    };

    // The locator found `origin` inside `body`, so this cannot miss.
    let Some(at) = find(&body, origin.as_bytes()) else {
        return Rewritten::unchanged(body);
    };

    let replacement = redirection_url(proxy_host, &origin);
    let mut out = BytesMut::with_capacity(body.len() - origin.len() + replacement.len());
    out.extend_from_slice(&body[..at]);
    out.extend_from_slice(replacement.as_bytes());
    out.extend_from_slice(&body[at + origin.len()..]);

    let body = out.freeze();
    Rewritten {
        length: body.len(),
        body,
        origin: Some(origin),
    }
}

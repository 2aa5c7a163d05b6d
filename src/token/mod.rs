//! Signed authentication tokens.
//!
//! # Wire format
//! ```text
//! base64url(snowflake) . base64url(issued_at_millis) . hex(hmac_sha256)
//! ```
//! The signature covers the literal `"<seg1>.<seg2>"` bytes, keyed by the
//! principal's current secret. ASCII throughout, no algorithm identifier,
//! no embedded expiry: rotation of the secret is the only revocation.
//!
//! # Design Decisions
//! - Every verification failure collapses to one opaque [`TokenInvalid`];
//!   callers cannot distinguish malformed from unknown from revoked, so a
//!   client probing the endpoint learns nothing about account state
//! - Decoding accepts padded and unpadded base64url alike; encoding never
//!   pads

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;

use crate::crypto::sign_payload;
use crate::principal::{Principal, PrincipalStore};

const DELIMITER: char = '.';

/// Opaque verification failure. Deliberately carries no cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct TokenInvalid;

/// A verified token, resolved against the principal store.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// Subject identifier (decimal snowflake).
    pub snowflake: String,

    /// Issuance instant, epoch milliseconds.
    pub issued_at_millis: u64,

    /// The principal the token names, as currently stored.
    pub principal: Principal,
}

/// Encoder/verifier for the three-segment token format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    pub fn new() -> Self {
        Self
    }

    /// Issue a token for `principal`, stamped with the current time.
    pub fn sign(&self, principal: &Principal) -> String {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.sign_at(principal, issued_at)
    }

    /// Issue a token with an explicit issuance instant.
    pub fn sign_at(&self, principal: &Principal, issued_at_millis: u64) -> String {
        let subject = URL_SAFE_NO_PAD.encode(principal.snowflake.as_bytes());
        let issued = URL_SAFE_NO_PAD.encode(issued_at_millis.to_string().as_bytes());
        let payload = format!("{subject}{DELIMITER}{issued}");
        let signature = sign_payload(&principal.secret, payload.as_bytes());
        format!("{payload}{DELIMITER}{signature}")
    }

    /// Verify `token` against the store's current view of its subject.
    ///
    /// Returns the decoded subject and issuance instant, or [`TokenInvalid`]
    /// for any failure: wrong segment count, undecodable segments, unknown
    /// subject, or a signature that does not match under the principal's
    /// current secret.
    pub async fn verify(
        &self,
        token: &str,
        store: &dyn PrincipalStore,
    ) -> Result<DecodedToken, TokenInvalid> {
        let segments: Vec<&str> = token.split(DELIMITER).collect();
        let &[subject, issued, signature] = segments.as_slice() else {
            return Err(TokenInvalid);
        };
        if subject.is_empty() || issued.is_empty() || signature.is_empty() {
            return Err(TokenInvalid);
        }

        let snowflake = decode_segment(subject)?;
        let issued_at_millis: u64 = decode_segment(issued)?
            .parse()
            .map_err(|_| TokenInvalid)?;

        let principal = store
            .lookup_by_snowflake(&snowflake)
            .await
            .map_err(|_| TokenInvalid)?
            .ok_or(TokenInvalid)?;

        let payload = format!("{subject}{DELIMITER}{issued}");
        let expected = sign_payload(&principal.secret, payload.as_bytes());
        if expected.as_bytes() != signature.as_bytes() {
            return Err(TokenInvalid);
        }

        Ok(DecodedToken {
            snowflake,
            issued_at_millis,
            principal,
        })
    }
}

fn decode_segment(segment: &str) -> Result<String, TokenInvalid> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .map_err(|_| TokenInvalid)?;
    String::from_utf8(bytes).map_err(|_| TokenInvalid)
}

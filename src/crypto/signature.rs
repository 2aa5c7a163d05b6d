//! Keyed signatures over token payloads.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 of `payload` under `key`, hex-encoded.
///
/// Deterministic: the same key and payload always produce the same
/// signature, which is what makes token verification a pure recompute.
pub fn sign_payload(key: &[u8], payload: &[u8]) -> String {
    // HMAC accepts keys of any length; new_from_slice only fails for
    // implementations with a fixed key size, which SHA-256 is not.
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

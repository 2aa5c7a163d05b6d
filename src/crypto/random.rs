//! Secure random generation backed by the OS CSPRNG.

use rand::rngs::OsRng;
use rand::RngCore;

/// The OS entropy source failed or was unavailable.
#[derive(Debug, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Fill a buffer of `len` bytes from the OS CSPRNG.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, EntropyError> {
    let mut buf = vec![0u8; len];
    OsRng.try_fill_bytes(&mut buf)?;
    Ok(buf)
}

/// Generate `byte_len` random bytes and hex-encode them.
///
/// The returned string is always `2 * byte_len` characters.
pub fn random_hex(byte_len: usize) -> Result<String, EntropyError> {
    Ok(hex::encode(random_bytes(byte_len)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_length_is_twice_byte_length() {
        for n in [0usize, 1, 8, 16, 32] {
            let s = random_hex(n).unwrap();
            assert_eq!(s.len(), 2 * n);
            assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn outputs_are_distinct() {
        let a = random_hex(16).unwrap();
        let b = random_hex(16).unwrap();
        assert_ne!(a, b);
    }
}

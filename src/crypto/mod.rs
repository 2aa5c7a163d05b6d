//! Cryptographic primitives.
//!
//! # Responsibilities
//! - Cryptographically secure random bytes and hex strings
//! - Keyed HMAC-SHA256 signatures for token material
//!
//! # Design Decisions
//! - Entropy always comes from the OS CSPRNG, never a seeded PRNG
//! - Signatures are hex-encoded so tokens stay plain ASCII
//! - Entropy exhaustion is an explicit error, not a panic

pub mod random;
pub mod signature;

pub use random::{random_bytes, random_hex, EntropyError};
pub use signature::sign_payload;

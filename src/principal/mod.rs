//! Principal entity and lookup store.
//!
//! # Responsibilities
//! - Define the principal entity the token subsystem signs for
//! - Expose a keyed-lookup store trait (the persistence collaborator)
//! - Ship an in-memory store for tests and the demo binary
//!
//! # Design Decisions
//! - Storage schema is never defined here; the store is an async trait
//! - A principal's secret only changes through explicit rotation,
//!   which is also the only revocation mechanism for issued tokens
//! - Credential hashing is opaque to this crate (stored, never computed)

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, EntropyError};
use crate::id::SnowflakeGenerator;

/// Number of random bytes backing a freshly minted principal secret.
pub const SECRET_BYTES: usize = 32;

/// An authenticatable subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Durable external identifier (decimal snowflake).
    pub snowflake: String,

    /// Per-principal signing key. Immutable once set except by rotation.
    pub secret: Vec<u8>,

    /// Login key (e.g. a username or email), if the principal can log in.
    pub credential_key: Option<String>,

    /// Opaque adaptive hash of the principal's credential, if any.
    pub credential_hash: Option<String>,
}

/// Store failure outside of "not found" (which is `Ok(None)`).
#[derive(Debug, thiserror::Error)]
#[error("principal store failure: {0}")]
pub struct StoreError(pub String);

/// Keyed-lookup collaborator the core authenticates against.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Resolve a principal by its snowflake identifier.
    async fn lookup_by_snowflake(&self, id: &str) -> Result<Option<Principal>, StoreError>;

    /// Resolve a principal by its login key.
    async fn lookup_by_credential_key(&self, key: &str)
        -> Result<Option<Principal>, StoreError>;

    /// Insert or replace a principal.
    async fn persist(&self, principal: Principal) -> Result<(), StoreError>;
}

/// Concurrent in-memory store, keyed by snowflake.
#[derive(Default)]
pub struct InMemoryPrincipalStore {
    by_snowflake: DashMap<String, Principal>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and persist a principal with a fresh snowflake and secret.
    pub async fn seed(
        &self,
        ids: &SnowflakeGenerator,
        credential_key: Option<String>,
    ) -> Result<Principal, SeedError> {
        let principal = Principal {
            snowflake: ids.next_id()?,
            secret: crypto::random_bytes(SECRET_BYTES)?,
            credential_key,
            credential_hash: None,
        };
        self.persist(principal.clone()).await?;
        Ok(principal)
    }

    /// Replace a principal's secret, revoking every token signed under
    /// the previous one. Returns false if the principal is unknown.
    pub fn rotate_secret(&self, snowflake: &str, secret: Vec<u8>) -> bool {
        match self.by_snowflake.get_mut(snowflake) {
            Some(mut entry) => {
                entry.secret = secret;
                true
            }
            None => false,
        }
    }
}

/// Failure while minting a demo principal.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Id(#[from] crate::id::SnowflakeError),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn lookup_by_snowflake(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        Ok(self.by_snowflake.get(id).map(|e| e.value().clone()))
    }

    async fn lookup_by_credential_key(
        &self,
        key: &str,
    ) -> Result<Option<Principal>, StoreError> {
        Ok(self
            .by_snowflake
            .iter()
            .find(|e| e.value().credential_key.as_deref() == Some(key))
            .map(|e| e.value().clone()))
    }

    async fn persist(&self, principal: Principal) -> Result<(), StoreError> {
        self.by_snowflake
            .insert(principal.snowflake.clone(), principal);
        Ok(())
    }
}

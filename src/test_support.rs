//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Duration;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::identity_repo::IdentityStore;
use crate::repos::memory::MemoryIdentityStore;
use crate::services::auth::identity::Identity;
use crate::services::auth::jwt::TokenCodec;
use crate::services::auth::password::{PasswordError, SecretHasher};

pub const SIGNING_KEY: &[u8] = b"unit-test-signing-key-for-hs256-32-bytes-min";

pub fn codec() -> TokenCodec {
    TokenCodec::new(SIGNING_KEY, Duration::hours(24)).unwrap()
}

/// Reversible stand-in for argon2 so tests don't pay the hashing cost.
pub struct PlainHasher;

impl SecretHasher for PlainHasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        Ok(format!("plain:{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(plain)
    }
}

pub struct FailingStore;

#[async_trait]
impl IdentityStore for FailingStore {
    async fn find_by_identifier(&self, _identifier: &str) -> RepoResult<Option<Identity>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn save(&self, _identity: &Identity) -> RepoResult<()> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }
}

/// Memory store that counts lookups.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryIdentityStore,
    lookups: AtomicUsize,
}

impl CountingStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for CountingStore {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Identity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_identifier(identifier).await
    }

    async fn save(&self, identity: &Identity) -> RepoResult<()> {
        self.inner.save(identity).await
    }
}

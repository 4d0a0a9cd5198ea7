//! Process-local identity store.
//!
//! Used in development when no database is configured, and by tests.
//! Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::identity_repo::IdentityStore;
use crate::services::auth::identity::Identity;

#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Identity>> {
        Ok(self.identities.read().await.get(identifier).cloned())
    }

    async fn save(&self, identity: &Identity) -> RepoResult<()> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(&identity.email) {
            return Err(RepoError::Conflict);
        }
        identities.insert(identity.email.clone(), identity.clone());
        Ok(())
    }
}

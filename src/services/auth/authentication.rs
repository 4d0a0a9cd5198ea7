use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::repos::error::RepoError;
use crate::repos::identity_repo::IdentityStore;
use crate::services::auth::identity::{Credentials, Identity, Principal, Role};
use crate::services::auth::jwt::{TokenCodec, TokenError};
use crate::services::auth::password::{PasswordError, SecretHasher};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately the same error.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identifier already registered")]
    DuplicateIdentifier,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("identity storage failed: {0}")]
    Storage(#[source] RepoError),
}

impl From<RepoError> for AuthError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AuthError::DuplicateIdentifier,
            other => AuthError::Storage(other),
        }
    }
}

pub struct RegisterCommand {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

/// Service-level result; handlers map it into the response DTO.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

// Verified against when the email is unknown, so both failure paths pay for one hash check.
const DUMMY_PASSWORD: &str = "bearer-gate-dummy-password";

/// Registers accounts and exchanges credentials for bearer tokens.
///
/// Every call is a single attempt: collaborator failures are returned as-is.
/// Hashing runs on the blocking pool.
#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn IdentityStore>,
    hasher: Arc<dyn SecretHasher>,
    codec: Arc<TokenCodec>,
    dummy_hash: Arc<str>,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: Arc<dyn SecretHasher>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
            warn!(error = %e, "failed to prepare dummy password hash");
            String::new()
        });

        Self {
            store,
            hasher,
            codec,
            dummy_hash: dummy_hash.into(),
        }
    }

    pub async fn register(&self, cmd: RegisterCommand) -> Result<IssuedToken, AuthError> {
        let password_hash = self.hash_password(cmd.password).await?;
        let identity = Identity::new(
            cmd.firstname,
            cmd.lastname,
            cmd.email,
            password_hash,
            Role::default(),
        );

        self.store.save(&identity).await.map_err(|e| {
            match &e {
                RepoError::Conflict => debug!(email = %identity.email, "email already registered"),
                other => error!(email = %identity.email, error = %other, "failed to save identity"),
            }
            AuthError::from(e)
        })?;

        info!(identity_id = %identity.id, "identity registered");
        self.issue_for(&identity)
    }

    pub async fn authenticate(&self, credentials: Credentials) -> Result<IssuedToken, AuthError> {
        let identity = self
            .store
            .find_by_identifier(&credentials.email)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to look up identity");
                AuthError::from(e)
            })?;

        let Some(identity) = identity else {
            self.verify_password(credentials.password, self.dummy_hash.to_string())
                .await;
            debug!("authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = identity.credential_hash().to_string();
        if !self.verify_password(credentials.password, stored_hash).await {
            debug!("authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_for(&identity)
    }

    async fn hash_password(&self, plain: String) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task failed");
                PasswordError::HashingFailed
            })?
    }

    async fn verify_password(&self, plain: String, hash: String) -> bool {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "password verification task failed");
                false
            })
    }

    fn issue_for(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        let mut extra = Map::new();
        extra.insert("role".into(), Value::from(identity.role.as_str()));

        let token = self.codec.issue(identity.identifier(), extra)?;

        Ok(IssuedToken {
            token,
            expires_in: self.codec.ttl().num_seconds(),
        })
    }
}

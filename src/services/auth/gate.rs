//! Per-request bearer authentication.
//!
//! The gate never rejects a request. A missing, malformed, expired or
//! foreign token leaves the request unauthenticated and the authorization
//! stage further down decides what that means for the target route.

use std::sync::Arc;

use axum::http::HeaderValue;
use tracing::{debug, error};

use crate::repos::identity_repo::IdentityStore;
use crate::services::auth::identity::Identity;
use crate::services::auth::jwt::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Request-scoped authentication state.
///
/// Starts empty and is populated at most once; later attempts to attach a
/// different identity are ignored.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    identity: Option<Identity>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns `false` (and keeps the current identity) if one is already set.
    pub fn attach(&mut self, identity: Identity) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        true
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(authorization: Option<&HeaderValue>) -> Option<&str> {
    authorization
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

#[derive(Clone)]
pub struct RequestGate {
    codec: Arc<TokenCodec>,
    store: Arc<dyn IdentityStore>,
}

impl RequestGate {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn IdentityStore>) -> Self {
        Self { codec, store }
    }

    /// Authenticate the request described by `authorization` into `ctx`.
    pub async fn check(&self, authorization: Option<&HeaderValue>, ctx: &mut SecurityContext) {
        let Some(token) = bearer_token(authorization) else {
            return;
        };

        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "bearer token ignored; continuing unauthenticated");
                return;
            }
        };

        if ctx.is_authenticated() {
            return;
        }

        let identity = match self.store.find_by_identifier(&claims.sub).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                debug!(subject = %claims.sub, "token subject has no identity");
                return;
            }
            Err(err) => {
                error!(error = %err, "identity lookup failed; continuing unauthenticated");
                return;
            }
        };

        if !self.codec.is_token_valid(&claims, &identity) {
            debug!(subject = %claims.sub, "token does not match stored identity");
            return;
        }

        debug!(identity_id = %identity.id, "request authenticated");
        ctx.attach(identity);
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::services::auth::identity::Principal;

/// HS256 needs at least as many key bytes as the digest output.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token lifetime out of range")]
    LifetimeOutOfRange,
    #[error("signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes, got {0}")]
    WeakKey(usize),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            // A foreign `alg` in the header means the token was not minted here.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}

/// Claims carried by every bearer token.
///
/// `sub` is the identity's email; anything beyond the registered claims
/// lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Signs and verifies HS256 bearer tokens with a single static key.
///
/// Stateless apart from the key material, so one instance is shared by
/// every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenCodec {
    pub fn new(signing_key: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(TokenError::WeakKey(signing_key.len()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Issuer and verifier are the same process; there is no audience to pin.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` that expires after the configured TTL.
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, extra, self.ttl)
    }

    /// Issue a token with an explicit lifetime. A negative `ttl` yields a
    /// token that is already expired.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        mut extra: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        for name in RESERVED_CLAIMS {
            extra.remove(name);
        }

        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            error!(ttl_seconds = ttl.num_seconds(), "token expiry overflows");
            TokenError::LifetimeOutOfRange
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            extra,
        };

        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Signing(e)
        })
    }

    /// Verify the signature and expiry of `token` and return its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                TokenError::from(e)
            })?;

        Ok(data.claims)
    }

    /// Subject must name `principal` and the token must still be live.
    pub fn is_token_valid(&self, claims: &Claims, principal: &impl Principal) -> bool {
        claims.sub == principal.identifier() && !claims.is_expired()
    }
}

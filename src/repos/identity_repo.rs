/*
 * Responsibility
 * - identities テーブル向け SQLx 操作
 * - email (identifier) での検索と新規保存のみを提供する
 * - 一意制約違反は RepoError::Conflict に変換して返す
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::identity::{Identity, Role};

/// Lookup/persist interface the auth services depend on.
///
/// Implementations own uniqueness of `email`: a second `save` for the same
/// identifier must fail with `RepoError::Conflict`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Identity>>;

    async fn save(&self, identity: &Identity) -> RepoResult<()>;
}

#[derive(Debug, FromRow)]
pub struct IdentityRow {
    #[sqlx(rename = "identityId")]
    pub id: Uuid,
    #[sqlx(rename = "firstName")]
    pub firstname: String,
    #[sqlx(rename = "lastName")]
    pub lastname: String,
    pub email: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    pub role: String,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepoError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepoError::InvalidRow(e.to_string()))?;

        Ok(Identity {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT "identityId", "firstName", "lastName", email, "passwordHash", role
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(Identity::try_from).transpose()
    }

    async fn save(&self, identity: &Identity) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identities ("identityId", "firstName", "lastName", email, "passwordHash", role)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(identity.id)
        .bind(&identity.firstname)
        .bind(&identity.lastname)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }
}

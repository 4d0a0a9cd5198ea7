use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::identity::Identity;
use crate::state::AppState;

use super::SecurityContext;

/// Handler で、認証済み Identity を受け取るための extractor
/// gate middleware が SecurityContext を request.extensions() に insert 済みである前提
/// identity が無い場合は 401 を返す（未認証・無効トークン・gate 未設定）
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized)
    }
}

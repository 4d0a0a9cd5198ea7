use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::CurrentIdentity};

/// GET /me: the identity the gate attached to this request.
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<MeResponse> {
    Json(identity.into())
}

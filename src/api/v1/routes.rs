/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /auth/ 配下は誰でも呼べる、それ以外は require_authenticated (認可段) を route_layer で適用
 * - Bearer gate 自体は v1 全体に掛ける (app.rs 側)
 */
use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{authenticate, register},
    health::health,
    me::me,
};
use crate::middleware::auth::require_authenticated;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/authenticate", post(authenticate));

    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn(require_authenticated));

    public.merge(protected)
}

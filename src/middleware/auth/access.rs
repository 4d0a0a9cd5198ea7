//! Bearer token gate → SecurityContext を extensions に入れる
//!
//! - gate は認証「済みかどうか」を記録するだけで、リクエストを拒否しない
//! - 拒否は `require_authenticated`（認可段）で行う
//! - `GateChecked` マーカーにより、レイヤーが二重に掛かっても 1 リクエスト 1 回だけ走る

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::SecurityContext;
use crate::state::AppState;

/// Marks a request the gate has already processed.
#[derive(Debug, Clone, Copy)]
struct GateChecked;

/// `/api/v1/*` 全体に gate を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<GateChecked>().is_some() {
        return next.run(req).await;
    }

    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_else(SecurityContext::new);

    let authorization = req.headers().get(header::AUTHORIZATION).cloned();
    state.gate.check(authorization.as_ref(), &mut ctx).await;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);
    req.extensions_mut().insert(GateChecked);

    next.run(req).await
}

/// 認可段: SecurityContext に identity が無ければ 401。
///
/// Protected routes only; must run after the gate.
pub async fn require_authenticated(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let authenticated = req
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    if !authenticated {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{Extension, http::StatusCode, routing::get};
    use serde_json::Map;
    use tower::ServiceExt;

    use crate::repos::identity_repo::IdentityStore;
    use crate::services::auth::{
        AuthenticationService, RequestGate,
        identity::{Identity, Role},
    };
    use crate::test_support::{CountingStore, PlainHasher, codec};

    async fn state_with_identity() -> (AppState, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        store
            .save(&Identity::new("Ada", "Lovelace", "a@x.com", "plain:p1", Role::User))
            .await
            .unwrap();

        let codec = Arc::new(codec());
        let auth = AuthenticationService::new(store.clone(), Arc::new(PlainHasher), codec.clone());
        let gate = RequestGate::new(codec, store.clone());
        (AppState::new(Arc::new(auth), Arc::new(gate)), store)
    }

    async fn whoami(Extension(ctx): Extension<SecurityContext>) -> String {
        ctx.identity()
            .map(|i| i.email.clone())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn request(authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        use http_body_util::BodyExt;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn gate_populates_context_for_valid_token() {
        let (state, _) = state_with_identity().await;
        let app = apply(Router::new().route("/whoami", get(whoami)), state.clone())
            .with_state(state);
        let token = codec().issue("a@x.com", Map::new()).unwrap();

        let response = app
            .oneshot(request(Some(format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "a@x.com");
    }

    #[tokio::test]
    async fn gate_lets_invalid_tokens_through_unauthenticated() {
        let (state, _) = state_with_identity().await;
        let app = apply(Router::new().route("/whoami", get(whoami)), state.clone())
            .with_state(state);

        for auth in [None, Some("Bearer garbage".to_string()), Some("Token abc".to_string())] {
            let response = app.clone().oneshot(request(auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "anonymous");
        }
    }

    #[tokio::test]
    async fn gate_runs_once_when_layered_twice() {
        let (state, store) = state_with_identity().await;
        let inner = apply(Router::new().route("/whoami", get(whoami)), state.clone());
        let app = apply(inner, state.clone()).with_state(state);
        let token = codec().issue("a@x.com", Map::new()).unwrap();

        let response = app
            .oneshot(request(Some(format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "a@x.com");
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn protected_route_requires_identity() {
        let (state, _) = state_with_identity().await;
        let protected = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn(require_authenticated));
        let app = apply(protected, state.clone()).with_state(state);
        let token = codec().issue("a@x.com", Map::new()).unwrap();

        let anonymous = app.clone().oneshot(request(None)).await.unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authenticated = app
            .oneshot(request(Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(authenticated.status(), StatusCode::OK);
    }
}

/*
 * Responsibility
 * - POST /auth/register, POST /auth/authenticate
 * - DTO validation → AuthenticationService 呼び出し → { token } を返す
 */
use axum::Json;
use axum::extract::{State, rejection::JsonRejection};

use crate::api::v1::dto::auth::{AuthenticateRequest, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_REGISTRATION", msg))?;

    let issued = state.auth.register(req.into()).await?;
    tracing::debug!(expires_in = issued.expires_in, "token issued on registration");

    Ok(Json(issued.into()))
}

pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_CREDENTIALS_FORMAT", msg))?;

    let issued = state.auth.authenticate(req.into()).await?;
    tracing::debug!(expires_in = issued.expires_in, "token issued on authentication");

    Ok(Json(issued.into()))
}

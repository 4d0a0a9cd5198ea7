/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 登録/ログイン, gate: Bearer 検証
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::{AuthenticationService, RequestGate};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthenticationService>,
    pub gate: Arc<RequestGate>,
}

impl AppState {
    pub fn new(auth: Arc<AuthenticationService>, gate: Arc<RequestGate>) -> Self {
        Self { auth, gate }
    }
}

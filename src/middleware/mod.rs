/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth::access::apply (Bearer gate), http::apply (横断的な HTTP 層)
 */
pub mod auth;
pub mod http;

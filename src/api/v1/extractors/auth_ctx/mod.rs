/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - gate が検証済みの identity（SecurityContext）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込める
 *
 * Public API:
 * - CurrentIdentity
 * - SecurityContext
 */

mod core;

pub use crate::services::auth::SecurityContext;
pub use core::CurrentIdentity;

/*!
 * Verified token context extractor
 *
 * Responsibility:
 * - 検証済みリクエストのコンテキスト（TokenCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - TokenCtx
 * - TokenCtxExtractor
 * - CurrentToken
 */

mod core;
mod types;

pub use self::core::{CurrentToken, TokenCtxExtractor};
pub use types::TokenCtx;

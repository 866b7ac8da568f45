/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - paseto gate / versioning / CORS / HTTP 共通 layer
 */
pub mod cors;
pub mod http;
pub mod paseto;
pub mod versioning;

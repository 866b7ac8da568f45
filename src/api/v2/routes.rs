/*
 * Responsibility
 * - v2 の URL 構造を定義 (nest("/v2", ...) される前提)
 */
use axum::{Router, routing::get};

use crate::api::v2::handlers::me::me;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

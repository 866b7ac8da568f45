/*
 * Responsibility
 * - v1 の URL 構造を定義 (nest("/v1", ...) される前提)
 * - /me, /notes (CRUD helper で登録)
 * - gate は app.rs で router 全体に掛ける
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::crud::crud;
use crate::api::v1::handlers::{me::me, notes::Notes};
use crate::state::AppState;

pub fn routes(notes: Arc<Notes>) -> Router<AppState> {
    let router = Router::new().route("/me", get(me));
    crud(router, "/notes", notes)
}

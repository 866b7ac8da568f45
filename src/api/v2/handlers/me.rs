/*
 * Responsibility
 * - GET /v2/me
 * - v1 と違い、claims 全体と footer を返す
 */
use axum::Json;
use serde::Serialize;

use crate::api::extractors::CurrentToken;
use crate::services::paseto::Claims;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub claims: Claims,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer: String,
}

pub async fn me(CurrentToken(token): CurrentToken) -> Json<MeResponse> {
    Json(MeResponse {
        claims: token.claims,
        footer: token.footer,
    })
}

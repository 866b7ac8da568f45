/*
 * Responsibility
 * - GET /v1/me
 * - gate が publish した token の subject を返すだけ
 */
use axum::Json;

use crate::api::extractors::CurrentToken;
use crate::api::v1::dto::me::MeResponse;

pub async fn me(CurrentToken(token): CurrentToken) -> Json<MeResponse> {
    Json(MeResponse {
        subject: token.claims.subject,
    })
}

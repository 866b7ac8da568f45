use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::paseto::Token;
use crate::state::AppState;

use super::TokenCtx;

/// Handler で TokenCtx を受け取るための extractor
/// gate middleware が TokenCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す (gate が掛かっていない・skip された)
pub struct TokenCtxExtractor(pub TokenCtx);

impl<S> FromRequestParts<S> for TokenCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenCtx>()
            .filter(|ctx| !ctx.is_empty())
            .cloned()
            .map(TokenCtxExtractor)
            .ok_or(AppError::unauthorized(
                "PASETO_REQUIRED",
                "authentication required",
            ))
    }
}

/// The token published under the application's configured context key.
#[derive(Debug, Clone)]
pub struct CurrentToken(pub Token);

impl FromRequestParts<AppState> for CurrentToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenCtx>()
            .and_then(|ctx| ctx.get(&state.context_key))
            .cloned()
            .map(CurrentToken)
            .ok_or(AppError::unauthorized(
                "PASETO_REQUIRED",
                "authentication required",
            ))
    }
}

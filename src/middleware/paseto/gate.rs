//! PASETO gate: token extraction -> verification -> validation -> TokenCtx を extensions に入れる
//!
//! Per request, in this order:
//! 1. skipper: bypass everything
//! 2. before hook
//! 3. extraction (`CredentialMissing`)
//! 4. `v2.local.` format check (`UnsupportedFormat`)
//! 5. decryption (`VerificationFailed`), then the token is published, then
//!    the validator chain runs (`ValidationFailed`)
//! 6. on error: error hook / context-aware error hook / classified response
//! 7. on success: success hook, then the next handler
//!
//! A token that decrypts but fails validation is still published into the
//! request; only the context-aware error hook ever sees that request.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::config::{
    BeforeFunc, DEFAULT_AUTH_SCHEME, DEFAULT_CONTEXT_KEY, DEFAULT_TOKEN_LOOKUP, ErrorHandler,
    ErrorHandlerWithContext, PasetoConfig, Skipper, SuccessHandler,
};
use super::error::{ConfigurationError, PasetoError};
use super::lookup::TokenLookup;
use crate::api::extractors::TokenCtx;
use crate::services::paseto::{SymmetricKey, Token, Validator, Verifier, validate};

/// A constructed gate. Cheap to clone; all state is immutable and shared.
#[derive(Clone)]
pub struct PasetoGate {
    inner: Arc<Inner>,
}

struct Inner {
    verifier: Verifier,
    lookup: TokenLookup,
    auth_scheme: String,
    context_key: Arc<str>,
    validators: Vec<Validator>,
    skipper: Option<Skipper>,
    before: Option<BeforeFunc>,
    success_handler: Option<SuccessHandler>,
    error_handler: Option<ErrorHandler>,
    error_handler_with_context: Option<ErrorHandlerWithContext>,
}

impl std::fmt::Debug for PasetoGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasetoGate")
            .field("verifier", &self.inner.verifier)
            .field("lookup", &self.inner.lookup)
            .field("auth_scheme", &self.inner.auth_scheme)
            .field("context_key", &self.inner.context_key)
            .field("validators", &self.inner.validators.len())
            .finish()
    }
}

impl PasetoGate {
    /// Gate with the default configuration and the given key.
    pub fn with_key(signing_key: &[u8]) -> Result<Self, ConfigurationError> {
        Self::new(PasetoConfig::new(signing_key))
    }

    /// Validate the configuration and build the gate.
    ///
    /// Fails (and nothing is mounted) when the key is not 32 bytes or the token
    /// lookup cannot be parsed.
    pub fn new(config: PasetoConfig) -> Result<Self, ConfigurationError> {
        let key = SymmetricKey::try_from(config.signing_key.as_slice())?;

        let token_lookup = non_empty_or(config.token_lookup, DEFAULT_TOKEN_LOOKUP);
        let lookup: TokenLookup = token_lookup.parse()?;

        let inner = Inner {
            verifier: Verifier::new(key),
            lookup,
            auth_scheme: non_empty_or(config.auth_scheme, DEFAULT_AUTH_SCHEME),
            context_key: Arc::from(non_empty_or(config.context_key, DEFAULT_CONTEXT_KEY)),
            validators: config.validators,
            skipper: config.skipper,
            before: config.before,
            success_handler: config.success_handler,
            error_handler: config.error_handler,
            error_handler_with_context: config.error_handler_with_context,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn context_key(&self) -> &str {
        &self.inner.context_key
    }

    pub fn lookup(&self) -> &TokenLookup {
        &self.inner.lookup
    }

    /// Mount the gate in front of every route of `router`.
    ///
    /// 例：
    /// ```ignore
    /// let gate = PasetoGate::with_key(&key)?;
    /// let app = gate.apply(api::v1::routes());
    /// ```
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(
            self.clone(),
            paseto_middleware,
        ))
    }

    /// Steps 3-5: extract, check, decrypt, publish, validate.
    ///
    /// On success the token is in `parts.extensions` under the context key.
    pub async fn authenticate(&self, parts: &mut Parts) -> Result<(), PasetoError> {
        let inner = &self.inner;

        let raw = inner.lookup.extract(parts, &inner.auth_scheme).await?;
        // format check first: a wrong prefix never reaches the cipher
        let token = inner.verifier.verify(&raw)?;

        let outcome = validate::validate(&token, Utc::now(), &inner.validators);
        tracing::debug!(
            subject = token.subject().unwrap_or_default(),
            context_key = %inner.context_key,
            valid = outcome.is_ok(),
            "paseto decrypted"
        );
        publish(parts, &inner.context_key, token);

        outcome.map_err(PasetoError::from)
    }

    fn reject(&self, err: PasetoError, req: &Request) -> Response {
        if let Some(handler) = &self.inner.error_handler {
            return handler(err);
        }
        if let Some(handler) = &self.inner.error_handler_with_context {
            return handler(err, req);
        }
        err.into_response()
    }
}

async fn paseto_middleware(State(gate): State<PasetoGate>, req: Request, next: Next) -> Response {
    let inner = &gate.inner;

    if let Some(skipper) = &inner.skipper
        && skipper(&req)
    {
        return next.run(req).await;
    }

    if let Some(before) = &inner.before {
        before(&req);
    }

    let (mut parts, body) = req.into_parts();
    let outcome = gate.authenticate(&mut parts).await;
    let req = Request::from_parts(parts, body);

    match outcome {
        Ok(()) => {
            if let Some(success) = &inner.success_handler {
                success(&req);
            }
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(
                error = ?err,
                method = %req.method(),
                path = %req.uri().path(),
                "paseto rejected"
            );
            gate.reject(err, &req)
        }
    }
}

// One token per context key; a later publish under the same key replaces it.
fn publish(parts: &mut Parts, key: &Arc<str>, token: Token) {
    match parts.extensions.get_mut::<TokenCtx>() {
        Some(ctx) => {
            ctx.insert(Arc::clone(key), token);
        }
        None => {
            let mut ctx = TokenCtx::default();
            ctx.insert(Arc::clone(key), token);
            parts.extensions.insert(ctx);
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

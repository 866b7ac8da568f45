//! Gate configuration.
//!
//! Built once per mounted gate and never mutated afterwards. Empty values fall
//! back to the `DEFAULT_*` constants when the gate is constructed.

use std::fmt;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;

use super::error::PasetoError;
use crate::services::paseto::Validator;

pub const DEFAULT_CONTEXT_KEY: &str = "paseto";
pub const DEFAULT_TOKEN_LOOKUP: &str = "header:Authorization";
pub const DEFAULT_AUTH_SCHEME: &str = "Bearer";

/// Returns true to let the request through without authentication.
pub type Skipper = Arc<dyn Fn(&Request) -> bool + Send + Sync>;
/// Runs before extraction. Observational only.
pub type BeforeFunc = Arc<dyn Fn(&Request) + Send + Sync>;
/// Runs after a token was accepted, before the next handler. Observational only.
pub type SuccessHandler = Arc<dyn Fn(&Request) + Send + Sync>;
/// Turns a rejection into the response sent to the client.
pub type ErrorHandler = Arc<dyn Fn(PasetoError) -> Response + Send + Sync>;
/// Same as [`ErrorHandler`] but also sees the request (and any token already
/// published into it).
pub type ErrorHandlerWithContext = Arc<dyn Fn(PasetoError, &Request) -> Response + Send + Sync>;

#[derive(Clone)]
pub struct PasetoConfig {
    /// Required. Exactly 32 bytes.
    pub signing_key: Vec<u8>,
    pub skipper: Option<Skipper>,
    pub before: Option<BeforeFunc>,
    pub success_handler: Option<SuccessHandler>,
    /// Takes precedence over `error_handler_with_context` when both are set.
    pub error_handler: Option<ErrorHandler>,
    pub error_handler_with_context: Option<ErrorHandlerWithContext>,
    /// Custom checks, run after the time checks.
    pub validators: Vec<Validator>,
    /// Optional. Default value "paseto".
    pub context_key: String,
    /// Optional. Default value "header:Authorization".
    /// Possible values: "header:<name>", "query:<name>", "param:<name>", "cookie:<name>".
    pub token_lookup: String,
    /// Optional. Default value "Bearer".
    pub auth_scheme: String,
}

impl Default for PasetoConfig {
    fn default() -> Self {
        Self {
            signing_key: Vec::new(),
            skipper: None,
            before: None,
            success_handler: None,
            error_handler: None,
            error_handler_with_context: None,
            validators: Vec::new(),
            context_key: DEFAULT_CONTEXT_KEY.to_string(),
            token_lookup: DEFAULT_TOKEN_LOOKUP.to_string(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
        }
    }
}

impl PasetoConfig {
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
            ..Self::default()
        }
    }

    pub fn skipper<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(f));
        self
    }

    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(f));
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.success_handler = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(PasetoError) -> Response + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(f));
        self
    }

    pub fn on_error_with_context<F>(mut self, f: F) -> Self
    where
        F: Fn(PasetoError, &Request) -> Response + Send + Sync + 'static,
    {
        self.error_handler_with_context = Some(Arc::new(f));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = key.into();
        self
    }

    pub fn token_lookup(mut self, lookup: impl Into<String>) -> Self {
        self.token_lookup = lookup.into();
        self
    }

    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }
}

impl fmt::Debug for PasetoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("PasetoConfig")
            .field("signing_key_len", &self.signing_key.len())
            .field("skipper", &self.skipper.is_some())
            .field("before", &self.before.is_some())
            .field("success_handler", &self.success_handler.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .field(
                "error_handler_with_context",
                &self.error_handler_with_context.is_some(),
            )
            .field("validators", &self.validators.len())
            .field("context_key", &self.context_key)
            .field("token_lookup", &self.token_lookup)
            .field("auth_scheme", &self.auth_scheme)
            .finish()
    }
}

//! Gate error taxonomy.
//!
//! Construction-time problems are [`ConfigurationError`]; they never show up
//! at request time. Per-request problems are [`PasetoError`], classified into
//! "bad request" (no usable credential) and "unauthorized" (credential present
//! but not acceptable).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::services::paseto::{InvalidKeyLength, TokenError, ValidationError, VerifyError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    SigningKey(#[from] InvalidKeyLength),
    #[error("invalid token lookup {0:?} (expected \"<header|query|param|cookie>:<name>\")")]
    TokenLookup(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    Unauthorized,
}

impl ErrorClass {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PasetoError {
    #[error("missing or malformed paseto")]
    CredentialMissing,
    #[error("unsupported paseto version/purpose")]
    UnsupportedFormat,
    #[error("invalid or expired paseto")]
    VerificationFailed(#[source] TokenError),
    #[error("invalid or expired paseto")]
    ValidationFailed(#[source] ValidationError),
}

impl PasetoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PasetoError::CredentialMissing | PasetoError::UnsupportedFormat => {
                ErrorClass::BadRequest
            }
            PasetoError::VerificationFailed(_) | PasetoError::ValidationFailed(_) => {
                ErrorClass::Unauthorized
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.class().status()
    }

    pub fn code(&self) -> &'static str {
        match self {
            PasetoError::CredentialMissing => "PASETO_MISSING",
            PasetoError::UnsupportedFormat => "PASETO_UNSUPPORTED",
            PasetoError::VerificationFailed(_) | PasetoError::ValidationFailed(_) => {
                "PASETO_INVALID"
            }
        }
    }
}

impl From<VerifyError> for PasetoError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::UnsupportedFormat => PasetoError::UnsupportedFormat,
            VerifyError::Token(cause) => PasetoError::VerificationFailed(cause),
        }
    }
}

impl From<ValidationError> for PasetoError {
    fn from(e: ValidationError) -> Self {
        PasetoError::ValidationFailed(e)
    }
}

// The client only sees the classified message; the cause stays in the logs.
impl From<PasetoError> for AppError {
    fn from(e: PasetoError) -> Self {
        let message = e.to_string();
        match e.class() {
            ErrorClass::BadRequest => AppError::bad_request(e.code(), message),
            ErrorClass::Unauthorized => AppError::unauthorized(e.code(), message),
        }
    }
}

impl IntoResponse for PasetoError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(
            PasetoError::CredentialMissing.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PasetoError::UnsupportedFormat.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PasetoError::VerificationFailed(TokenError::Authentication).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PasetoError::ValidationFailed(ValidationError::Subject).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn cause_is_kept_but_not_rendered() {
        let err = PasetoError::VerificationFailed(TokenError::Authentication);
        assert_eq!(err.to_string(), "invalid or expired paseto");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("token authentication failed"));
    }

    #[test]
    fn verify_errors_map_to_kinds() {
        assert!(matches!(
            PasetoError::from(VerifyError::UnsupportedFormat),
            PasetoError::UnsupportedFormat
        ));
        assert!(matches!(
            PasetoError::from(VerifyError::Token(TokenError::Authentication)),
            PasetoError::VerificationFailed(TokenError::Authentication)
        ));
    }
}

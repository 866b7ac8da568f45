//! Claim validation (validator chain).
//!
//! Temporal checks always run first, in this order:
//! - `nbf`: must be <= now
//! - `exp`: must be > now (a token expiring exactly now is rejected)
//! - `iat`: must be <= now
//!
//! Unset timestamps are vacuously satisfied. Custom validators from the gate
//! configuration run afterwards, in configuration order. The first failure
//! stops the chain.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::claims::{Claims, Token};

/// A single claim check. Returning `Err` rejects the token.
pub type Validator = Arc<dyn Fn(&Token) -> Result<(), ValidationError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("token is not valid before {0}")]
    NotYetValid(DateTime<Utc>),
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("token issued in the future ({0})")]
    IssuedInFuture(DateTime<Utc>),
    #[error("token audience mismatch")]
    Audience,
    #[error("token issuer mismatch")]
    Issuer,
    #[error("token id mismatch")]
    TokenId,
    #[error("token subject mismatch")]
    Subject,
    #[error("{0}")]
    Custom(String),
}

pub fn check_time(claims: &Claims, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if let Some(nbf) = claims.not_before
        && nbf > now
    {
        return Err(ValidationError::NotYetValid(nbf));
    }
    if let Some(exp) = claims.expiration
        && exp <= now
    {
        return Err(ValidationError::Expired(exp));
    }
    if let Some(iat) = claims.issued_at
        && iat > now
    {
        return Err(ValidationError::IssuedInFuture(iat));
    }
    Ok(())
}

/// Run the whole chain at `now`.
pub fn validate(
    token: &Token,
    now: DateTime<Utc>,
    validators: &[Validator],
) -> Result<(), ValidationError> {
    check_time(&token.claims, now)?;
    validators.iter().try_for_each(|check| check(token))
}

/// Wrap a closure as a [`Validator`].
pub fn validator<F>(f: F) -> Validator
where
    F: Fn(&Token) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn for_audience(audience: impl Into<String>) -> Validator {
    let audience = audience.into();
    validator(move |token| match token.claims.audience.as_deref() {
        Some(aud) if aud == audience => Ok(()),
        _ => Err(ValidationError::Audience),
    })
}

pub fn issued_by(issuer: impl Into<String>) -> Validator {
    let issuer = issuer.into();
    validator(move |token| match token.claims.issuer.as_deref() {
        Some(iss) if iss == issuer => Ok(()),
        _ => Err(ValidationError::Issuer),
    })
}

pub fn identified_by(jti: impl Into<String>) -> Validator {
    let jti = jti.into();
    validator(move |token| match token.claims.jti.as_deref() {
        Some(id) if id == jti => Ok(()),
        _ => Err(ValidationError::TokenId),
    })
}

pub fn subject(subject: impl Into<String>) -> Validator {
    let subject = subject.into();
    validator(move |token| match token.claims.subject.as_deref() {
        Some(sub) if sub == subject => Ok(()),
        _ => Err(ValidationError::Subject),
    })
}

/// Temporal checks pinned to a fixed instant instead of the request time.
pub fn valid_at(at: DateTime<Utc>) -> Validator {
    validator(move |token| check_time(&token.claims, at))
}

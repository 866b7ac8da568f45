use std::fmt;

use super::claims::Token;
use super::key::SymmetricKey;
use super::v2_local::{HEADER, TokenError};

// Errors returned by token verification (format pre-check + decryption).
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("unsupported token version/purpose")]
    UnsupportedFormat,
    #[error("token verification failed: {0}")]
    Token(#[from] TokenError),
}

/// `v2.local` verifier bound to one signing key.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct Verifier {
    key: SymmetricKey,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").field("format", &HEADER).finish()
    }
}

impl Verifier {
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Cheap shape check, done before any cryptographic work.
    ///
    /// Only `v2.local` is supported; `v2.public` and other versions are refused
    /// here so that malformed input never reaches the cipher.
    pub fn check_format(raw: &str) -> Result<(), VerifyError> {
        if raw.starts_with(HEADER) {
            Ok(())
        } else {
            Err(VerifyError::UnsupportedFormat)
        }
    }

    /// Decrypt + authenticate a token whose format was already checked.
    pub fn decrypt(&self, raw: &str) -> Result<Token, VerifyError> {
        Ok(Token::decrypt(raw, &self.key)?)
    }

    /// Format pre-check, then decryption.
    ///
    /// This is the recommended entry-point for middleware/handlers.
    pub fn verify(&self, raw: &str) -> Result<Token, VerifyError> {
        Self::check_format(raw)?;
        self.decrypt(raw)
    }
}

pub mod claims;
pub mod key;
pub mod v2_local;
pub mod validate;
pub mod verifier;

pub use claims::{Claims, Token};
pub use key::{InvalidKeyLength, SymmetricKey};
pub use v2_local::TokenError;
pub use validate::{ValidationError, Validator};
pub use verifier::{Verifier, VerifyError};

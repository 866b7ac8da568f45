pub mod config;
pub mod error;
pub mod gate;
pub mod lookup;

pub use config::{
    BeforeFunc, DEFAULT_AUTH_SCHEME, DEFAULT_CONTEXT_KEY, DEFAULT_TOKEN_LOOKUP, ErrorHandler,
    ErrorHandlerWithContext, PasetoConfig, Skipper, SuccessHandler,
};
pub use error::{ConfigurationError, ErrorClass, PasetoError};
pub use gate::PasetoGate;
pub use lookup::TokenLookup;

pub mod token_ctx;

pub use token_ctx::{CurrentToken, TokenCtx, TokenCtxExtractor};

/*
 * Responsibility
 * - Handler から見える「検証済みトークン」のコンテキスト型
 * - gate middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - context key ごとに Token を 1 つだけ保持する (同じ key への再 publish は上書き)
 * - request ごとに新しく作られる。request 間で共有される状態はない
 */
use std::collections::HashMap;
use std::sync::Arc;

use crate::services::paseto::Token;

/// Tokens published by gate instances for the current request, keyed by the
/// gate's context key.
#[derive(Debug, Clone, Default)]
pub struct TokenCtx {
    tokens: HashMap<Arc<str>, Token>,
}

impl TokenCtx {
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.tokens.get(key)
    }

    pub fn insert(&mut self, key: Arc<str>, token: Token) -> Option<Token> {
        self.tokens.insert(key, token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

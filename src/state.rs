/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: context_key (gate が TokenCtx に publish するときの key)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub context_key: Arc<str>,
}

impl AppState {
    pub fn new(context_key: impl Into<Arc<str>>) -> Self {
        Self {
            context_key: context_key.into(),
        }
    }
}

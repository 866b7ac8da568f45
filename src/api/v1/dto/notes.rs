/*
 * Responsibility
 * - Notes の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub body: Option<String>,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.len() > 256 {
            return Err("title must be <= 256 chars");
        }
        if let Some(body) = &self.body
            && body.len() > 4096
        {
            return Err("body must be <= 4096 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteResponse {
    pub id: u64,
    pub author: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

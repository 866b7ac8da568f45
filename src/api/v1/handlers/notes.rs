/*
 * Responsibility
 * - /notes 系 handler (CRUD helper で登録される resource)
 * - create / list / show / delete のみ実装 (update は無し → PATCH route は生えない)
 * - note は token の subject ごとに見える範囲を分ける
 * - 保存先は in-memory (プロセス再起動で消える)
 */
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::api::crud::{Creatable, CrudResource, Deletable, Listable, Showable};
use crate::api::extractors::TokenCtx;
use crate::api::v1::dto::notes::{CreateNoteRequest, NoteResponse};
use crate::error::AppError;

pub struct Notes {
    context_key: Arc<str>,
    next_id: AtomicU64,
    notes: RwLock<BTreeMap<u64, NoteResponse>>,
}

impl Notes {
    pub fn new(context_key: impl Into<Arc<str>>) -> Self {
        Self {
            context_key: context_key.into(),
            next_id: AtomicU64::new(1),
            notes: RwLock::new(BTreeMap::new()),
        }
    }

    fn author(&self, req: &Request) -> Option<String> {
        req.extensions()
            .get::<TokenCtx>()
            .and_then(|ctx| ctx.get(&self.context_key))
            .and_then(|token| token.claims.subject.clone())
    }

    async fn create_note(
        &self,
        req: Request,
    ) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
        let author = self.author(&req);
        let Json(body) = Json::<CreateNoteRequest>::from_request(req, &())
            .await
            .map_err(|e| AppError::bad_request("INVALID_BODY", e.body_text()))?;
        body.validate()
            .map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

        let note = NoteResponse {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            author,
            title: body.title,
            body: body.body,
            created_at: Utc::now(),
        };
        self.notes.write().await.insert(note.id, note.clone());

        tracing::debug!(id = note.id, author = ?note.author, "note created");
        Ok((StatusCode::CREATED, Json(note)))
    }

    async fn list_notes(&self, req: Request) -> Json<Vec<NoteResponse>> {
        let author = self.author(&req);
        let notes = self.notes.read().await;
        Json(
            notes
                .values()
                .filter(|note| note.author == author)
                .cloned()
                .collect(),
        )
    }

    async fn show_note(&self, req: Request) -> Result<Json<NoteResponse>, AppError> {
        let author = self.author(&req);
        let id = note_id(req).await?;

        let notes = self.notes.read().await;
        notes
            .get(&id)
            .filter(|note| note.author == author)
            .cloned()
            .map(Json)
            .ok_or(AppError::not_found("note"))
    }

    async fn delete_note(&self, req: Request) -> Result<StatusCode, AppError> {
        let author = self.author(&req);
        let id = note_id(req).await?;

        let mut notes = self.notes.write().await;
        match notes.get(&id) {
            Some(note) if note.author == author => {
                notes.remove(&id);
                Ok(StatusCode::NO_CONTENT)
            }
            _ => Err(AppError::not_found("note")),
        }
    }
}

async fn note_id(req: Request) -> Result<u64, AppError> {
    let (mut parts, _body) = req.into_parts();
    let Path(id) = Path::<u64>::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| AppError::bad_request("INVALID_ID", "id must be a positive integer"))?;
    Ok(id)
}

#[async_trait]
impl Creatable for Notes {
    async fn create(&self, req: Request) -> Response {
        self.create_note(req).await.into_response()
    }
}

#[async_trait]
impl Listable for Notes {
    async fn list(&self, req: Request) -> Response {
        self.list_notes(req).await.into_response()
    }
}

#[async_trait]
impl Showable for Notes {
    async fn show(&self, req: Request) -> Response {
        self.show_note(req).await.into_response()
    }
}

#[async_trait]
impl Deletable for Notes {
    async fn delete(&self, req: Request) -> Response {
        self.delete_note(req).await.into_response()
    }
}

impl CrudResource for Notes {
    fn as_creatable(self: Arc<Self>) -> Option<Arc<dyn Creatable>> {
        Some(self)
    }

    fn as_listable(self: Arc<Self>) -> Option<Arc<dyn Listable>> {
        Some(self)
    }

    fn as_showable(self: Arc<Self>) -> Option<Arc<dyn Showable>> {
        Some(self)
    }

    fn as_deletable(self: Arc<Self>) -> Option<Arc<dyn Deletable>> {
        Some(self)
    }
}

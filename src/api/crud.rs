/*
 * Responsibility
 * - REST resource の route 登録ヘルパー
 * - resource が実装している capability (Create/List/Show/Update/Delete) の分だけ route を生やす
 *
 *   POST   /path
 *   GET    /path
 *   GET    /path/{id}
 *   PATCH  /path/{id}
 *   DELETE /path/{id}
 */
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::Request,
    response::Response,
    routing::{MethodRouter, delete, get, patch, post},
};

#[async_trait]
pub trait Creatable: Send + Sync {
    async fn create(&self, req: Request) -> Response;
}

#[async_trait]
pub trait Listable: Send + Sync {
    async fn list(&self, req: Request) -> Response;
}

#[async_trait]
pub trait Showable: Send + Sync {
    async fn show(&self, req: Request) -> Response;
}

#[async_trait]
pub trait Updatable: Send + Sync {
    async fn update(&self, req: Request) -> Response;
}

#[async_trait]
pub trait Deletable: Send + Sync {
    async fn delete(&self, req: Request) -> Response;
}

/// Declares which capabilities a resource offers.
///
/// Every method defaults to `None`; a resource overrides the ones it implements:
///
/// ```ignore
/// impl CrudResource for Notes {
///     fn as_listable(self: Arc<Self>) -> Option<Arc<dyn Listable>> {
///         Some(self)
///     }
/// }
/// ```
pub trait CrudResource: Send + Sync + 'static {
    fn as_creatable(self: Arc<Self>) -> Option<Arc<dyn Creatable>> {
        None
    }

    fn as_listable(self: Arc<Self>) -> Option<Arc<dyn Listable>> {
        None
    }

    fn as_showable(self: Arc<Self>) -> Option<Arc<dyn Showable>> {
        None
    }

    fn as_updatable(self: Arc<Self>) -> Option<Arc<dyn Updatable>> {
        None
    }

    fn as_deletable(self: Arc<Self>) -> Option<Arc<dyn Deletable>> {
        None
    }
}

/// Register one route per capability `resource` offers, under `path`.
pub fn crud<S, R>(router: Router<S>, path: &str, resource: Arc<R>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    R: CrudResource,
{
    let path = path.trim_end_matches('/');
    let item = format!("{path}/{{id}}");
    let collection = if path.is_empty() { "/" } else { path };

    let mut on_collection: Option<MethodRouter<S>> = None;
    let mut on_item: Option<MethodRouter<S>> = None;

    if let Some(r) = Arc::clone(&resource).as_creatable() {
        let route = post(move |req: Request| async move { r.create(req).await });
        on_collection = Some(merge(on_collection, route));
    }
    if let Some(r) = Arc::clone(&resource).as_listable() {
        let route = get(move |req: Request| async move { r.list(req).await });
        on_collection = Some(merge(on_collection, route));
    }
    if let Some(r) = Arc::clone(&resource).as_showable() {
        let route = get(move |req: Request| async move { r.show(req).await });
        on_item = Some(merge(on_item, route));
    }
    if let Some(r) = Arc::clone(&resource).as_updatable() {
        let route = patch(move |req: Request| async move { r.update(req).await });
        on_item = Some(merge(on_item, route));
    }
    if let Some(r) = resource.as_deletable() {
        let route = delete(move |req: Request| async move { r.delete(req).await });
        on_item = Some(merge(on_item, route));
    }

    let mut router = router;
    if let Some(route) = on_collection {
        router = router.route(collection, route);
    }
    if let Some(route) = on_item {
        router = router.route(&item, route);
    }
    router
}

fn merge<S>(current: Option<MethodRouter<S>>, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    match current {
        Some(current) => current.merge(route),
        None => route,
    }
}

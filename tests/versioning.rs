#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use tower::ServiceExt;

use paseto_gate::middleware::versioning::{
    Versioning, X_APPLICATION_STABLE_VERSION, X_APPLICATION_VERSION,
};

fn app() -> Router {
    let router = Router::new()
        .route("/v1/toto", get(|| async { "[v1] toto" }))
        .route("/v2/toto", get(|| async { "[v2] toto" }))
        .route(
            "/v1/echo",
            get(|uri: axum::http::Uri| async move { uri.to_string() }),
        );

    Versioning::new("vnd.myapp.v2", ["vnd.myapp.v1", "vnd.myapp.v2"]).wrap(router)
}

async fn call(
    path: &str,
    version: Option<&str>,
) -> (StatusCode, Option<String>, Option<String>, String) {
    let mut builder = Request::builder().uri(path);
    if let Some(version) = version {
        builder = builder.header(X_APPLICATION_VERSION, version);
    }
    let res = app()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = res.status();
    let header = |name| {
        res.headers()
            .get(name)
            .map(|v: &axum::http::HeaderValue| v.to_str().unwrap().to_string())
    };
    let asked = header(X_APPLICATION_VERSION);
    let stable = header(X_APPLICATION_STABLE_VERSION);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (
        status,
        asked,
        stable,
        String::from_utf8(body.to_vec()).unwrap(),
    )
}

#[tokio::test]
async fn header_selects_the_route_version() {
    let (status, asked, stable, body) = call("/toto", Some("vnd.myapp.v1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[v1] toto");
    assert_eq!(asked.as_deref(), Some("vnd.myapp.v1"));
    assert_eq!(stable.as_deref(), Some("vnd.myapp.v2"));

    let (status, _, _, body) = call("/toto", Some("vnd.myapp.v2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[v2] toto");
}

#[tokio::test]
async fn versioned_paths_work_without_header() {
    let (status, asked, stable, body) = call("/v1/toto", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[v1] toto");
    assert_eq!(asked, None);
    assert_eq!(stable, None);

    let (_, _, _, body) = call("/v2/toto", None).await;
    assert_eq!(body, "[v2] toto");
}

#[tokio::test]
async fn empty_header_passes_through() {
    let (status, asked, _, body) = call("/v1/toto", Some("")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[v1] toto");
    assert_eq!(asked, None);
}

#[tokio::test]
async fn unsupported_version_is_rejected() {
    let (status, asked, stable, body) = call("/toto", Some("vnd.myapp.v42")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body.contains("unsupported X-Application-Version: vnd.myapp.v42"),
        "{body}"
    );
    assert_eq!(asked.as_deref(), Some("vnd.myapp.v42"));
    assert_eq!(stable.as_deref(), Some("vnd.myapp.v2"));
}

#[tokio::test]
async fn rewrite_applies_even_to_versioned_paths() {
    // becomes /v2/v1/toto
    let (status, asked, _, _) = call("/v1/toto", Some("vnd.myapp.v2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(asked.as_deref(), Some("vnd.myapp.v2"));
}

#[tokio::test]
async fn query_string_survives_the_rewrite() {
    let (status, _, _, body) = call("/echo?page=2", Some("vnd.myapp.v1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/v1/echo?page=2");
}

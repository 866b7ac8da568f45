//! Header-driven API versioning.
//!
//! `X-Application-Version: vnd.myapp.v1` rewrites `/toto` to `/v1/toto` before
//! routing. The asked and the stable version are echoed in the response
//! headers whenever the request carried a version.
//!
//! Must wrap the whole router (see [`Versioning::wrap`]): a `Router::layer`
//! runs after routing, when rewriting the path no longer has any effect.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Uri, uri::PathAndQuery},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower::Layer;

use crate::error::AppError;

pub const X_APPLICATION_VERSION: HeaderName = HeaderName::from_static("x-application-version");
pub const X_APPLICATION_STABLE_VERSION: HeaderName =
    HeaderName::from_static("x-application-stable-version");

#[derive(Debug, Error)]
pub enum VersioningError {
    #[error("unsupported X-Application-Version: {0}")]
    Unsupported(String),
    #[error("cannot rewrite path with prefix {prefix:?}")]
    Rewrite { prefix: String },
}

impl IntoResponse for VersioningError {
    fn into_response(self) -> Response {
        match self {
            VersioningError::Unsupported(_) => {
                AppError::bad_request("UNSUPPORTED_VERSION", self.to_string()).into_response()
            }
            VersioningError::Rewrite { .. } => AppError::Internal.into_response(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Versioning {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    stable: HeaderValue,
    // asked version -> path prefix
    prefixes: HashMap<String, String>,
}

impl Versioning {
    /// `stable` is only advertised; routing is driven by `supported`.
    pub fn new<I, S>(stable: &str, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stable = HeaderValue::from_str(stable).unwrap_or_else(|_| {
            tracing::warn!(stable, "stable version is not a valid header value");
            HeaderValue::from_static("")
        });

        let prefixes = supported
            .into_iter()
            .map(|vnd| {
                let vnd = vnd.as_ref().trim();
                (vnd.to_string(), prefix_for(vnd))
            })
            .filter(|(vnd, _)| !vnd.is_empty())
            .collect();

        Self {
            inner: Arc::new(Inner { stable, prefixes }),
        }
    }

    /// Put versioning in front of routing.
    ///
    /// 例：
    /// ```ignore
    /// let app = Versioning::new("vnd.myapp.v2", ["vnd.myapp.v1", "vnd.myapp.v2"]).wrap(router);
    /// ```
    pub fn wrap(&self, router: Router) -> Router {
        let service =
            middleware::from_fn_with_state(self.clone(), versioning_middleware).layer(router);
        Router::new().fallback_service(service)
    }

    fn rewrite(&self, vnd: &str, uri: &Uri) -> Result<Uri, VersioningError> {
        let prefix = self
            .inner
            .prefixes
            .get(vnd)
            .ok_or_else(|| VersioningError::Unsupported(vnd.to_string()))?;

        if prefix.is_empty() {
            return Ok(uri.clone());
        }

        let rewritten = match uri.query() {
            Some(query) => format!("{prefix}{}?{query}", uri.path()),
            None => format!("{prefix}{}", uri.path()),
        };
        let invalid = || VersioningError::Rewrite {
            prefix: prefix.clone(),
        };
        let path_and_query = PathAndQuery::try_from(rewritten).map_err(|_| invalid())?;

        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(path_and_query);
        Uri::from_parts(parts).map_err(|_| invalid())
    }
}

/// `/` + the last dot-separated segment (`vnd.myapp.v3` -> `/v3`).
///
/// A version without a dot is used whole; one ending with a dot maps to no prefix.
pub fn prefix_for(vnd: &str) -> String {
    let segment = vnd.rsplit('.').next().unwrap_or(vnd).trim_matches('/');
    if segment.is_empty() {
        String::new()
    } else {
        format!("/{segment}")
    }
}

async fn versioning_middleware(
    State(versioning): State<Versioning>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(asked) = req
        .headers()
        .get(X_APPLICATION_VERSION)
        .filter(|v| !v.is_empty())
        .cloned()
    else {
        return next.run(req).await;
    };
    let vnd = String::from_utf8_lossy(asked.as_bytes()).into_owned();

    let mut res = match versioning.rewrite(&vnd, req.uri()) {
        Ok(uri) => {
            tracing::debug!(
                version = %vnd,
                from = %req.uri(),
                to = %uri,
                "versioned route"
            );
            *req.uri_mut() = uri;
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(error = ?err, "versioning rejected");
            err.into_response()
        }
    };

    let headers = res.headers_mut();
    headers.insert(X_APPLICATION_VERSION, asked);
    headers.insert(
        X_APPLICATION_STABLE_VERSION,
        versioning.inner.stable.clone(),
    );
    res
}

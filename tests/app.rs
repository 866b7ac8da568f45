#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The assembled application: health, versioned `/me`, and the notes resource
//! behind the gate.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use paseto_gate::app::build_router;
use paseto_gate::config::{AppEnv, Config};
use paseto_gate::middleware::versioning::{X_APPLICATION_STABLE_VERSION, X_APPLICATION_VERSION};
use paseto_gate::services::paseto::{Claims, SymmetricKey, Token};

const KEY: &[u8] = b"400c48a557be10254d235cf8c506e6fe";
// {"sub":"John Doe"}
const JOHN_DOE: &str = "v2.local.Q0O8UKihblHPFEjLH0r1dJKntyLDpPItRvbpC49xR_lbdc8Hfx7K4kA6TfFffTD5BAaMXiqnp1yShA";

fn config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: vec![],
        paseto_signing_key: KEY.to_vec(),
        paseto_token_lookup: "header:Authorization".into(),
        paseto_auth_scheme: "Bearer".into(),
        paseto_context_key: "paseto".into(),
        paseto_skip_paths: vec!["/health".into()],
        paseto_audience: None,
        paseto_issuer: None,
        api_stable_version: "vnd.paseto-gate.v2".into(),
        api_supported_versions: vec!["vnd.paseto-gate.v1".into(), "vnd.paseto-gate.v2".into()],
        http_body_limit_bytes: 1024 * 1024,
        http_timeout: Duration::from_secs(30),
    }
}

fn token_for(subject: &str) -> String {
    let key = SymmetricKey::from_slice(KEY).unwrap();
    Token::new(Claims::new().with_subject(subject))
        .with_footer("kid:local")
        .encrypt(&key)
        .unwrap()
}

struct Call<'a> {
    method: Method,
    uri: &'a str,
    token: Option<&'a str>,
    version: Option<&'a str>,
    body: Option<Value>,
}

impl<'a> Call<'a> {
    fn get(uri: &'a str) -> Self {
        Self {
            method: Method::GET,
            uri,
            token: None,
            version: None,
            body: None,
        }
    }

    fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    async fn send(self, app: &Router) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(version) = self.version {
            builder = builder.header(X_APPLICATION_VERSION, version);
        }
        let body = match self.body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let res = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, value)
    }
}

#[tokio::test]
async fn health_is_skipped_by_the_gate() {
    let app = build_router(&config()).unwrap();
    let (status, headers, body) = Call::get("/health").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn bad_key_refuses_to_build() {
    let mut config = config();
    config.paseto_signing_key = b"too small".to_vec();
    assert!(build_router(&config).is_err());

    let mut config = self::config();
    config.paseto_token_lookup = "body:paseto".into();
    assert!(build_router(&config).is_err());
}

#[tokio::test]
async fn me_per_version() {
    let app = build_router(&config()).unwrap();

    let (status, _, body) = Call::get("/v1/me").token(JOHN_DOE).send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"subject": "John Doe"}));

    let token = token_for("Jane Doe");
    let (status, headers, body) = Call::get("/me")
        .token(&token)
        .version("vnd.paseto-gate.v2")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claims"]["sub"], "Jane Doe");
    assert_eq!(body["footer"], "kid:local");
    assert_eq!(headers[X_APPLICATION_STABLE_VERSION], "vnd.paseto-gate.v2");

    let (status, _, body) = Call::get("/me")
        .token(JOHN_DOE)
        .version("vnd.paseto-gate.v9")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_VERSION");
}

#[tokio::test]
async fn gate_rejections_are_classified() {
    let app = build_router(&config()).unwrap();

    let (status, _, body) = Call::get("/v1/me").send(&app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PASETO_MISSING");

    let (status, _, body) = Call::get("/v1/me").token("v1.local.abc").send(&app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PASETO_UNSUPPORTED");

    let expired = Token::new(Claims {
        expiration: Some(Utc::now() - chrono::Duration::seconds(1)),
        ..Claims::new().with_subject("John Doe")
    })
    .encrypt(&SymmetricKey::from_slice(KEY).unwrap())
    .unwrap();
    let (status, _, body) = Call::get("/v1/me").token(&expired).send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid or expired paseto");
}

#[tokio::test]
async fn audience_from_config_is_enforced() {
    let mut config = config();
    config.paseto_audience = Some("notes".into());
    let app = build_router(&config).unwrap();

    let (status, _, _) = Call::get("/v1/me").token(JOHN_DOE).send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = Token::new(Claims {
        audience: Some("notes".into()),
        ..Claims::new().with_subject("John Doe")
    })
    .encrypt(&SymmetricKey::from_slice(KEY).unwrap())
    .unwrap();
    let (status, _, _) = Call::get("/v1/me").token(&token).send(&app).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn notes_are_scoped_to_the_subject() {
    let app = build_router(&config()).unwrap();
    let jane = token_for("Jane Doe");

    let (status, _, created) = Call::get("/notes")
        .method(Method::POST)
        .token(JOHN_DOE)
        .version("vnd.paseto-gate.v1")
        .json(json!({"title": "groceries", "body": "milk"}))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "John Doe");
    let id = created["id"].as_u64().unwrap();
    let item = format!("/v1/notes/{id}");

    let (status, _, body) = Call::get("/v1/notes")
        .method(Method::POST)
        .token(JOHN_DOE)
        .json(json!({"title": " "}))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "title is required");

    let (_, _, list) = Call::get("/v1/notes").token(JOHN_DOE).send(&app).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, _, list) = Call::get("/v1/notes").token(&jane).send(&app).await;
    assert_eq!(list, json!([]));

    let (status, _, body) = Call::get(&item).token(JOHN_DOE).send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "groceries");
    let (status, _, _) = Call::get(&item).token(&jane).send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // no update capability
    let (status, _, _) = Call::get(&item)
        .method(Method::PATCH)
        .token(JOHN_DOE)
        .json(json!({"title": "x"}))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _, _) = Call::get(&item)
        .method(Method::DELETE)
        .token(&jane)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = Call::get(&item)
        .method(Method::DELETE)
        .token(JOHN_DOE)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = Call::get(&item).token(JOHN_DOE).send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/*
 * Responsibility
 * - 環境変数や設定の読み込み (PASETO 署名鍵、token lookup、versioning、CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::paseto::{DEFAULT_AUTH_SCHEME, DEFAULT_CONTEXT_KEY, DEFAULT_TOKEN_LOOKUP};

pub const DEFAULT_STABLE_VERSION: &str = "vnd.paseto-gate.v2";
pub const DEFAULT_SUPPORTED_VERSIONS: &str = "vnd.paseto-gate.v1,vnd.paseto-gate.v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Length is checked when the gate is built.
    pub paseto_signing_key: Vec<u8>,
    pub paseto_token_lookup: String,
    pub paseto_auth_scheme: String,
    pub paseto_context_key: String,
    pub paseto_skip_paths: Vec<String>,
    pub paseto_audience: Option<String>,
    pub paseto_issuer: Option<String>,

    pub api_stable_version: String,
    pub api_supported_versions: Vec<String>,

    pub http_body_limit_bytes: usize,
    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("paseto_signing_key", &"<redacted>")
            .field("paseto_token_lookup", &self.paseto_token_lookup)
            .field("paseto_auth_scheme", &self.paseto_auth_scheme)
            .field("paseto_context_key", &self.paseto_context_key)
            .field("paseto_skip_paths", &self.paseto_skip_paths)
            .field("paseto_audience", &self.paseto_audience)
            .field("paseto_issuer", &self.paseto_issuer)
            .field("api_stable_version", &self.api_stable_version)
            .field("api_supported_versions", &self.api_supported_versions)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = list_var("CORS_ALLOWED_ORIGINS", "");

        // hex wins over the raw form
        let paseto_signing_key = match std::env::var("PASETO_SIGNING_KEY_HEX") {
            Ok(encoded) => hex::decode(encoded.trim())
                .map_err(|_| ConfigError::Invalid("PASETO_SIGNING_KEY_HEX"))?,
            Err(_) => std::env::var("PASETO_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("PASETO_SIGNING_KEY"))?
                .into_bytes(),
        };

        let paseto_token_lookup = std::env::var("PASETO_TOKEN_LOOKUP")
            .unwrap_or_else(|_| DEFAULT_TOKEN_LOOKUP.to_string());
        let paseto_auth_scheme = std::env::var("PASETO_AUTH_SCHEME")
            .unwrap_or_else(|_| DEFAULT_AUTH_SCHEME.to_string());
        let paseto_context_key = std::env::var("PASETO_CONTEXT_KEY")
            .unwrap_or_else(|_| DEFAULT_CONTEXT_KEY.to_string());
        let paseto_skip_paths = list_var("PASETO_SKIP_PATHS", "/health");

        let paseto_audience = optional_var("PASETO_AUDIENCE");
        let paseto_issuer = optional_var("PASETO_ISSUER");

        let api_stable_version = std::env::var("API_STABLE_VERSION")
            .unwrap_or_else(|_| DEFAULT_STABLE_VERSION.to_string());
        let api_supported_versions = list_var("API_SUPPORTED_VERSIONS", DEFAULT_SUPPORTED_VERSIONS);

        let http_body_limit_bytes = std::env::var("HTTP_BODY_LIMIT_BYTES")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?
            .unwrap_or(1024 * 1024);

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?
            .unwrap_or(30);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            paseto_signing_key,
            paseto_token_lookup,
            paseto_auth_scheme,
            paseto_context_key,
            paseto_skip_paths,
            paseto_audience,
            paseto_issuer,
            api_stable_version,
            api_supported_versions,
            http_body_limit_bytes,
            http_timeout: Duration::from_secs(http_timeout_seconds),
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn list_var(key: &str, default: &str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
}

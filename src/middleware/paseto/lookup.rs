//! Where the gate looks for the raw token.
//!
//! Parsed once from a `"<source>:<name>"` string:
//! - `header:<name>`: `<name>: <AuthScheme> <token>`
//! - `query:<name>`: `?<name>=<token>`
//! - `param:<name>`: path parameter of the matched route
//! - `cookie:<name>`: `Cookie: <name>=<token>`

use std::fmt;
use std::str::FromStr;

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::{HeaderMap, HeaderName, Uri, request::Parts};
use axum_extra::extract::CookieJar;

use super::error::{ConfigurationError, PasetoError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    Header(HeaderName),
    Query(String),
    Param(String),
    Cookie(String),
}

impl FromStr for TokenLookup {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::TokenLookup(s.to_string());

        let (source, name) = s.split_once(':').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }

        match source.trim() {
            "header" => HeaderName::from_str(name)
                .map(TokenLookup::Header)
                .map_err(|_| invalid()),
            "query" => Ok(TokenLookup::Query(name.to_string())),
            "param" => Ok(TokenLookup::Param(name.to_string())),
            "cookie" => Ok(TokenLookup::Cookie(name.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for TokenLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLookup::Header(name) => write!(f, "header:{}", name),
            TokenLookup::Query(name) => write!(f, "query:{}", name),
            TokenLookup::Param(name) => write!(f, "param:{}", name),
            TokenLookup::Cookie(name) => write!(f, "cookie:{}", name),
        }
    }
}

impl TokenLookup {
    /// Pull the raw token out of the request, or fail with `CredentialMissing`.
    ///
    /// `auth_scheme` only matters for header lookups.
    pub async fn extract(
        &self,
        parts: &mut Parts,
        auth_scheme: &str,
    ) -> Result<String, PasetoError> {
        let found = match self {
            TokenLookup::Header(name) => from_header(&parts.headers, name, auth_scheme),
            TokenLookup::Query(name) => from_query(&parts.uri, name),
            TokenLookup::Cookie(name) => from_cookie(&parts.headers, name),
            TokenLookup::Param(name) => {
                // Only available once the router matched a route with parameters.
                match RawPathParams::from_request_parts(parts, &()).await {
                    Ok(params) => params
                        .iter()
                        .find(|(key, _)| *key == name.as_str())
                        .map(|(_, value)| value.to_string()),
                    Err(_) => None,
                }
            }
        };

        found
            .filter(|token| !token.is_empty())
            .ok_or(PasetoError::CredentialMissing)
    }
}

// `<scheme> <token>`: exactly one space, non-empty token.
fn from_header(headers: &HeaderMap, name: &HeaderName, auth_scheme: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    let token = value.strip_prefix(auth_scheme)?.strip_prefix(' ')?;
    Some(token.to_string())
}

fn from_query(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn from_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

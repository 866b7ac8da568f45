/*
 * Responsibility
 * - 復号済みトークンの claims (sub/iat/exp/nbf ...) と footer の型
 * - JSON payload <-> Claims の変換
 * - Token は request ごとに新しく作られ、request extensions に載る
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key::SymmetricKey;
use super::v2_local::{self, TokenError};

/// Registered claims plus any additional ones.
///
/// Timestamps are RFC 3339 strings on the wire. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Additional (non-registered) claim.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<(), TokenError> {
        self.extra.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }
}

/// A verified token: its claims and the (authenticated, unencrypted) footer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub claims: Claims,
    pub footer: String,
}

impl Token {
    pub fn new(claims: Claims) -> Self {
        Self {
            claims,
            footer: String::new(),
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject.as_deref()
    }

    /// Encode as a `v2.local` token. Used by tests and local tooling; the gate
    /// itself only ever decrypts.
    pub fn encrypt(&self, key: &SymmetricKey) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(&self.claims)?;
        v2_local::encrypt(key, &payload, self.footer.as_bytes())
    }

    pub fn decrypt(raw: &str, key: &SymmetricKey) -> Result<Self, TokenError> {
        let decrypted = v2_local::decrypt(raw, key)?;
        let claims: Claims = serde_json::from_slice(&decrypted.payload)?;
        let footer = String::from_utf8(decrypted.footer)?;
        Ok(Self { claims, footer })
    }
}

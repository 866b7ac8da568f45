//! PASETO `v2.local` codec (XChaCha20-Poly1305 + BLAKE2b nonce derivation).
//!
//! This module is intentionally "core-only": it knows nothing about claims,
//! HTTP or configuration. It turns bytes into a token string and back.
//!
//! Token layout:
//! `v2.local.` || base64url(nonce || ciphertext || tag) [ `.` || base64url(footer) ]
//!
//! The header, the nonce and the footer are authenticated through the
//! pre-authentication encoding (PAE) passed as AEAD associated data.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use blake2::{
    Blake2bMac,
    digest::{Mac, consts::U24},
};
use chacha20poly1305::{
    Key, KeyInit, XChaCha20Poly1305, XNonce,
    aead::{Aead, Payload},
};

use super::key::SymmetricKey;

pub const HEADER: &str = "v2.local.";

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token header is not v2.local")]
    InvalidHeader,
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("invalid base64url encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token authentication failed")]
    Authentication,
    #[error("invalid claims payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("footer is not valid UTF-8")]
    Footer(#[from] std::string::FromUtf8Error),
    #[error("token encryption failed")]
    Encryption,
    #[error("random source unavailable: {0}")]
    Rng(getrandom::Error),
}

/// Raw output of a successful decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    pub payload: Vec<u8>,
    pub footer: Vec<u8>,
}

/// Encrypt `message` under `key`; a non-empty `footer` is appended in clear.
pub fn encrypt(key: &SymmetricKey, message: &[u8], footer: &[u8]) -> Result<String, TokenError> {
    let mut seed = [0u8; NONCE_LEN];
    getrandom::fill(&mut seed).map_err(TokenError::Rng)?;
    encrypt_with_seed(key, message, footer, &seed)
}

fn encrypt_with_seed(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    seed: &[u8; NONCE_LEN],
) -> Result<String, TokenError> {
    // nonce = BLAKE2b(message, key = seed, size = 24)
    let mut mac = <Blake2bMac<U24> as blake2::digest::KeyInit>::new_from_slice(seed)
        .map_err(|_| TokenError::Encryption)?;
    mac.update(message);
    let nonce = mac.finalize().into_bytes();

    let pre_auth = pae(&[HEADER.as_bytes(), nonce.as_slice(), footer]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(nonce.as_slice()),
            Payload {
                msg: message,
                aad: &pre_auth,
            },
        )
        .map_err(|_| TokenError::Encryption)?;

    let mut body = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    body.extend_from_slice(nonce.as_slice());
    body.extend_from_slice(&ciphertext);

    let mut token = String::from(HEADER);
    token.push_str(&URL_SAFE_NO_PAD.encode(&body));
    if !footer.is_empty() {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }
    Ok(token)
}

/// Authenticate and decrypt a `v2.local` token.
pub fn decrypt(token: &str, key: &SymmetricKey) -> Result<Decrypted, TokenError> {
    let rest = token
        .strip_prefix(HEADER)
        .ok_or(TokenError::InvalidHeader)?;

    let (body, footer) = match rest.split_once('.') {
        Some((body, footer)) => (body, Some(footer)),
        None => (rest, None),
    };
    if footer.is_some_and(|f| f.contains('.')) {
        return Err(TokenError::Malformed("too many segments"));
    }

    let body = URL_SAFE_NO_PAD.decode(body)?;
    let footer = match footer {
        Some(f) => URL_SAFE_NO_PAD.decode(f)?,
        None => Vec::new(),
    };

    if body.len() < NONCE_LEN + TAG_LEN {
        return Err(TokenError::Malformed("payload too short"));
    }
    let (nonce, ciphertext) = body.split_at(NONCE_LEN);

    let pre_auth = pae(&[HEADER.as_bytes(), nonce, footer.as_slice()]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let payload = cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: &pre_auth,
            },
        )
        .map_err(|_| TokenError::Authentication)?;

    Ok(Decrypted { payload, footer })
}

// Pre-authentication encoding: LE64(count) || for each piece LE64(len) || piece
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let len = 8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>();
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

// MSB is cleared for interoperability with languages lacking unsigned ints
fn le64(n: u64) -> [u8; 8] {
    (n & (u64::MAX >> 1)).to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"400c48a557be10254d235cf8c506e6fe";
    const JOHN_DOE: &str =
        "v2.local.Q0O8UKihblHPFEjLH0r1dJKntyLDpPItRvbpC49xR_lbdc8Hfx7K4kA6TfFffTD5BAaMXiqnp1yShA";

    fn key() -> SymmetricKey {
        SymmetricKey::from_slice(KEY).unwrap()
    }

    #[test]
    fn decrypts_interop_fixture() {
        let out = decrypt(JOHN_DOE, &key()).unwrap();
        assert_eq!(out.payload, br#"{"sub":"John Doe"}"#);
        assert!(out.footer.is_empty());
    }

    #[test]
    fn pae_matches_reference_encoding() {
        assert_eq!(pae(&[]), vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            pae(&[b"".as_slice()]),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let encoded = pae(&[b"test".as_slice()]);
        assert_eq!(
            &encoded[..16],
            &[1, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(&encoded[16..], b"test");
    }

    #[test]
    fn footer_is_carried_and_authenticated() {
        let token = encrypt(&key(), b"{}", b"kid:1").unwrap();
        let (_, footer) = token.rsplit_once('.').unwrap();
        assert_eq!(URL_SAFE_NO_PAD.decode(footer).unwrap(), b"kid:1");

        let out = decrypt(&token, &key()).unwrap();
        assert_eq!(out.footer, b"kid:1");

        let forged = format!(
            "{}.{}",
            token.rsplit_once('.').unwrap().0,
            URL_SAFE_NO_PAD.encode(b"kid:2")
        );
        assert!(matches!(
            decrypt(&forged, &key()),
            Err(TokenError::Authentication)
        ));
    }

    #[test]
    fn same_message_and_seed_is_deterministic() {
        let seed = [9u8; NONCE_LEN];
        let a = encrypt_with_seed(&key(), b"payload", b"", &seed).unwrap();
        let b = encrypt_with_seed(&key(), b"payload", b"", &seed).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, encrypt(&key(), b"payload", b"").unwrap());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let other = SymmetricKey::from_slice(b"invalid-57be10254d235cf8c506e6fe").unwrap();
        assert!(matches!(
            decrypt(JOHN_DOE, &other),
            Err(TokenError::Authentication)
        ));
    }

    #[test]
    fn tampered_body_fails_authentication() {
        let mut bytes = JOHN_DOE.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'Q' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(decrypt(&tampered, &key()).is_err());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            decrypt("v2.public.abc", &key()),
            Err(TokenError::InvalidHeader)
        ));
        assert!(matches!(
            decrypt("v2.local.invalid-token", &key()),
            Err(TokenError::Encoding(_))
        ));
        assert!(matches!(
            decrypt("v2.local.AAAA", &key()),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            decrypt("v2.local.AAAA.AAAA.AAAA", &key()),
            Err(TokenError::Malformed(_))
        ));
    }
}

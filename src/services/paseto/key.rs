/*
 * Responsibility
 * - v2.local の共有鍵 (32 bytes) を保持する
 * - 長さチェックは構築時に一度だけ行う
 * - 鍵素材は Debug に出さず、drop 時に zeroize する
 */
use std::fmt;

use zeroize::Zeroize;

pub const KEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("signing key must be 32 bytes length, got {0}")]
pub struct InvalidKeyLength(pub usize);

#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InvalidKeyLength> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| InvalidKeyLength(bytes.len()))?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SymmetricKey {
    type Error = InvalidKeyLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.write_str("SymmetricKey(..)")
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

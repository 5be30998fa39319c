//! Opaque participant identities
//!
//! Authentication happens outside the core; an identity here is only a
//! fixed-size key that is unique per voter (or revealer).

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Key derivation context for external identities
const IDENTITY_CONTEXT: &str = "sealvote 2024 participant identity v1";

/// 32-byte participant identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity([u8; 32]);

/// Identity of a ballot submitter
pub type VoterId = Identity;

impl Identity {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an identity from an external handle such as a wallet address.
    ///
    /// Handles are trimmed and otherwise hashed byte for byte. A `0x`-prefixed
    /// hex handle is the one exception: its digits are compared without case.
    pub fn derive(external: &str) -> Self {
        let trimmed = external.trim();
        let mut hasher = blake3::Hasher::new_derive_key(IDENTITY_CONTEXT);
        match hex_handle(trimmed) {
            Some(digits) => {
                hasher.update(b"0x");
                hasher.update(digits.to_ascii_lowercase().as_bytes());
            }
            None => {
                hasher.update(trimmed.as_bytes());
            }
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(s: &str) -> CoreResult<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| CoreError::InvalidInput(format!("Invalid identity hex: {}", e)))?;

        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidInput(format!("Expected 32 identity bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

/// Digits of a `0x` hex handle, `None` for any other handle
fn hex_handle(handle: &str) -> Option<&str> {
    let digits = handle
        .strip_prefix("0x")
        .or_else(|| handle.strip_prefix("0X"))?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())).then_some(digits)
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({})", hex::encode(&self.0[..8]))
    }
}

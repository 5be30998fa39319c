//! Encrypted tally counters backed by `FheUint64`

use tfhe::prelude::*;
use tfhe::{CompactFheUint64, CompactPublicKey, FheUint64};

use super::keys::{ClientKey, ServerKey};
use crate::{CipherError, CipherResult, Decrypt, HomomorphicOps};

/// Encrypted 64-bit counter
#[derive(Clone)]
pub struct FheTallyCiphertext {
    inner: FheUint64,
    /// Operation count (noise proxy)
    op_count: u32,
}

impl FheTallyCiphertext {
    /// Encrypt with the client key
    pub fn encrypt(value: u64, client_key: &ClientKey) -> CipherResult<Self> {
        let inner = FheUint64::try_encrypt(value, &client_key.inner)
            .map_err(|e| CipherError::EncryptionFailed(format!("{:?}", e)))?;
        Ok(Self { inner, op_count: 0 })
    }

    /// Encrypt a yes/no ballot with the published compact public key
    pub fn encrypt_choice(choice: bool, public_key: &CompactPublicKey) -> Self {
        let compact = CompactFheUint64::encrypt(u64::from(choice), public_key);
        Self {
            inner: compact.expand(),
            op_count: 0,
        }
    }

    /// Operation count since encryption
    pub fn op_count(&self) -> u32 {
        self.op_count
    }

    fn trivial(value: u64, key: &ServerKey) -> CipherResult<FheUint64> {
        key.activate();
        FheUint64::try_encrypt_trivial(value)
            .map_err(|e| CipherError::OperationFailed(format!("{:?}", e)))
    }
}

impl std::fmt::Debug for FheTallyCiphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FheTallyCiphertext")
            .field("ops", &self.op_count)
            .finish()
    }
}

impl HomomorphicOps for FheTallyCiphertext {
    type EvalKey = ServerKey;

    fn encrypted_zero(key: &ServerKey) -> CipherResult<Self> {
        Ok(Self {
            inner: Self::trivial(0, key)?,
            op_count: 0,
        })
    }

    fn add(&self, other: &Self, key: &ServerKey) -> CipherResult<Self> {
        key.activate();
        Ok(Self {
            inner: &self.inner + &other.inner,
            op_count: self.op_count.saturating_add(other.op_count).saturating_add(1),
        })
    }

    fn complement(&self, key: &ServerKey) -> CipherResult<Self> {
        let one = Self::trivial(1, key)?;
        Ok(Self {
            inner: &one - &self.inner,
            op_count: self.op_count.saturating_add(1),
        })
    }

    fn to_bytes(&self) -> CipherResult<Vec<u8>> {
        Ok(bincode::serialize(&(&self.inner, self.op_count))?)
    }

    fn from_bytes(bytes: &[u8]) -> CipherResult<Self> {
        let (inner, op_count): (FheUint64, u32) = bincode::deserialize(bytes)
            .map_err(|e| CipherError::InvalidCiphertext(e.to_string()))?;
        Ok(Self { inner, op_count })
    }
}

impl Decrypt<FheTallyCiphertext> for ClientKey {
    fn authorizes(&self, key: &ServerKey) -> bool {
        self.key_id == key.key_id && self.config_hash == key.config_hash
    }

    fn decrypt_count(&self, ciphertext: &FheTallyCiphertext, max: u64) -> CipherResult<u64> {
        let value: u64 = ciphertext.inner.decrypt(&self.inner);
        if value > max {
            return Err(CipherError::OutOfRange { max });
        }
        Ok(value)
    }
}

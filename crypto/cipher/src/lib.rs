//! SEALVOTE Ballot Ciphertexts
//!
//! Additively homomorphic encryption for yes/no ballots and running tallies.
//! The tally engine only ever sees ciphertexts through [`HomomorphicOps`];
//! plaintext is reachable solely through a [`Decrypt`] capability.
//!
//! # Backends
//! - [`elgamal`]: exponential ElGamal over Ristretto (default)
//! - `tfhe_impl`: TFHE-rs `FheUint64` sums (feature `tfhe`)
//!
//! # Key roles
//! - Evaluation key: combines ciphertexts, cannot decrypt (ElGamal public key,
//!   TFHE server key)
//! - Decryption capability: recovers bounded counts (ElGamal secret key,
//!   TFHE client key)

pub mod errors;
pub mod elgamal;

#[cfg(feature = "tfhe")]
pub mod tfhe_impl;

pub use errors::CipherError;
pub use elgamal::{ElGamalCiphertext, KeyPair, PublicKey, SecretKey};

/// Result type for cipher operations
pub type CipherResult<T> = Result<T, CipherError>;

/// Number of leading characters kept by [`preview_hex`] (including `0x`)
const PREVIEW_HEAD: usize = 10;

/// Number of trailing characters kept by [`preview_hex`]
const PREVIEW_TAIL: usize = 8;

/// Operations available on an encrypted integer without decrypting it.
///
/// Implementors must keep their internal representation private: the only
/// way to combine two values is through these methods, under an evaluation
/// key that cannot decrypt.
pub trait HomomorphicOps: Sized + Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Key material required for homomorphic evaluation
    type EvalKey: Send + Sync + 'static;

    /// A ciphertext of zero, usable as the starting point of a sum
    fn encrypted_zero(key: &Self::EvalKey) -> CipherResult<Self>;

    /// Homomorphic addition: `Enc(a) + Enc(b) = Enc(a + b)`
    fn add(&self, other: &Self, key: &Self::EvalKey) -> CipherResult<Self>;

    /// Homomorphic complement of a 0/1 value: `Enc(m) -> Enc(1 - m)`
    fn complement(&self, key: &Self::EvalKey) -> CipherResult<Self>;

    /// Serialize for storage or transmission
    fn to_bytes(&self) -> CipherResult<Vec<u8>>;

    /// Deserialize a ciphertext produced by [`HomomorphicOps::to_bytes`]
    fn from_bytes(bytes: &[u8]) -> CipherResult<Self>;

    /// BLAKE3 digest of the serialized ciphertext
    fn fingerprint(&self) -> CipherResult<[u8; 32]> {
        Ok(*blake3::hash(&self.to_bytes()?).as_bytes())
    }

    /// Truncated hex rendering for display
    fn preview(&self) -> CipherResult<String> {
        Ok(preview_hex(&self.to_bytes()?))
    }
}

/// A decryption capability for ciphertexts of type `C`.
pub trait Decrypt<C: HomomorphicOps> {
    /// Whether this capability decrypts values produced under `key`
    fn authorizes(&self, key: &C::EvalKey) -> bool;

    /// Decrypt a count known to lie in `0..=max`.
    ///
    /// Returns [`CipherError::OutOfRange`] when the plaintext is not in range.
    fn decrypt_count(&self, ciphertext: &C, max: u64) -> CipherResult<u64>;
}

/// Render bytes as `0x` hex, keeping the first 10 and last 8 characters.
pub fn preview_hex(bytes: &[u8]) -> String {
    let full = format!("0x{}", hex::encode(bytes));
    if full.len() <= PREVIEW_HEAD + PREVIEW_TAIL {
        return full;
    }
    format!("{}...{}", &full[..PREVIEW_HEAD], &full[full.len() - PREVIEW_TAIL..])
}

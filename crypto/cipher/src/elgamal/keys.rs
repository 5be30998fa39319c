//! ElGamal key management
//!
//! - PublicKey: evaluation key for the tally engine, also used by voters to encrypt
//! - SecretKey: decryption capability, held by whoever is allowed to disclose

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{CipherError, CipherResult};

/// Serialized size of a key in bytes
pub const KEY_BYTES: usize = 32;

/// Public key `H = x·G`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: RistrettoPoint,
}

impl PublicKey {
    /// Decode a compressed Ristretto point
    pub fn from_bytes(bytes: &[u8]) -> CipherResult<Self> {
        let compressed = CompressedRistretto::from_slice(bytes)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let point = compressed
            .decompress()
            .ok_or_else(|| CipherError::InvalidKey("Not a valid Ristretto point".into()))?;

        Ok(Self { point })
    }

    /// Compressed encoding
    pub fn to_bytes(&self) -> [u8; KEY_BYTES] {
        self.point.compress().to_bytes()
    }

    /// Stable identifier for this key
    pub fn id(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sealvote_elgamal_pk_v1");
        hasher.update(&self.to_bytes());
        *hasher.finalize().as_bytes()
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.point
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("id", &hex::encode(&self.id()[..8]))
            .finish()
    }
}

/// Secret scalar `x`. Zeroized on drop.
#[derive(Clone)]
pub struct SecretKey {
    scalar: Scalar,
}

impl SecretKey {
    /// Generate a fresh secret key
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            scalar: Scalar::random(rng),
        }
    }

    /// Decode a canonical scalar
    pub fn from_bytes(bytes: &[u8]) -> CipherResult<Self> {
        let arr: [u8; KEY_BYTES] = bytes.try_into().map_err(|_| {
            CipherError::InvalidKey(format!("Expected {} bytes, got {}", KEY_BYTES, bytes.len()))
        })?;
        let scalar: Option<Scalar> = Scalar::from_canonical_bytes(arr).into();
        let scalar = scalar
            .ok_or_else(|| CipherError::InvalidKey("Non-canonical scalar".into()))?;

        Ok(Self { scalar })
    }

    /// Canonical scalar encoding
    pub fn to_bytes(&self) -> [u8; KEY_BYTES] {
        self.scalar.to_bytes()
    }

    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: self.scalar * RISTRETTO_BASEPOINT_POINT,
        }
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.scalar
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("public_id", &hex::encode(&self.public_key().id()[..8]))
            .finish()
    }
}

/// Secret and public key together
#[derive(Clone)]
pub struct KeyPair {
    /// Decryption capability (secret)
    pub secret: SecretKey,
    /// Evaluation / encryption key (can be published)
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate a key pair from the operating system RNG
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a key pair from the given RNG
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = SecretKey::generate(rng);
        let public = secret.public_key();
        Self { secret, public }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_id", &hex::encode(&self.public.id()[..8]))
            .finish()
    }
}

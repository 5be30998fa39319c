//! ElGamal ciphertexts with homomorphic addition

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};

use super::dlog::DiscreteLogTable;
use super::keys::{PublicKey, SecretKey};
use crate::{CipherError, CipherResult, Decrypt, HomomorphicOps};

/// Serialized size: two compressed points
pub const CIPHERTEXT_BYTES: usize = 64;

/// Encrypted integer `(r·G, m·G + r·H)`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ElGamalCiphertext {
    ephemeral: RistrettoPoint,
    blinded: RistrettoPoint,
}

impl ElGamalCiphertext {
    /// Encrypt a small integer under `key`
    pub fn encrypt<R: RngCore + CryptoRng>(value: u64, key: &PublicKey, rng: &mut R) -> Self {
        let r = Scalar::random(rng);
        Self {
            ephemeral: r * RISTRETTO_BASEPOINT_POINT,
            blinded: Scalar::from(value) * RISTRETTO_BASEPOINT_POINT + r * key.point(),
        }
    }

    /// Encrypt a yes/no ballot as 1/0
    pub fn encrypt_choice<R: RngCore + CryptoRng>(
        choice: bool,
        key: &PublicKey,
        rng: &mut R,
    ) -> Self {
        Self::encrypt(u64::from(choice), key, rng)
    }
}

impl std::fmt::Debug for ElGamalCiphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fingerprint = blake3::hash(self.blinded.compress().as_bytes());
        f.debug_struct("ElGamalCiphertext")
            .field("fingerprint", &hex::encode(&fingerprint.as_bytes()[..8]))
            .finish()
    }
}

impl HomomorphicOps for ElGamalCiphertext {
    type EvalKey = PublicKey;

    fn encrypted_zero(_key: &PublicKey) -> CipherResult<Self> {
        Ok(Self {
            ephemeral: RistrettoPoint::identity(),
            blinded: RistrettoPoint::identity(),
        })
    }

    fn add(&self, other: &Self, _key: &PublicKey) -> CipherResult<Self> {
        Ok(Self {
            ephemeral: self.ephemeral + other.ephemeral,
            blinded: self.blinded + other.blinded,
        })
    }

    fn complement(&self, _key: &PublicKey) -> CipherResult<Self> {
        // Enc(1; 0) - Enc(m; r) = Enc(1 - m; -r)
        Ok(Self {
            ephemeral: -self.ephemeral,
            blinded: RISTRETTO_BASEPOINT_POINT - self.blinded,
        })
    }

    fn to_bytes(&self) -> CipherResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(CIPHERTEXT_BYTES);
        bytes.extend_from_slice(self.ephemeral.compress().as_bytes());
        bytes.extend_from_slice(self.blinded.compress().as_bytes());
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> CipherResult<Self> {
        if bytes.len() != CIPHERTEXT_BYTES {
            return Err(CipherError::InvalidCiphertext(format!(
                "Expected {} bytes, got {}",
                CIPHERTEXT_BYTES,
                bytes.len()
            )));
        }

        let decode = |chunk: &[u8]| -> CipherResult<RistrettoPoint> {
            CompressedRistretto::from_slice(chunk)
                .map_err(|e| CipherError::InvalidCiphertext(e.to_string()))?
                .decompress()
                .ok_or_else(|| CipherError::InvalidCiphertext("Not a valid Ristretto point".into()))
        };

        Ok(Self {
            ephemeral: decode(&bytes[..32])?,
            blinded: decode(&bytes[32..])?,
        })
    }
}

impl Decrypt<ElGamalCiphertext> for SecretKey {
    fn authorizes(&self, key: &PublicKey) -> bool {
        self.public_key() == *key
    }

    fn decrypt_count(&self, ciphertext: &ElGamalCiphertext, max: u64) -> CipherResult<u64> {
        let message = ciphertext.blinded - self.scalar() * ciphertext.ephemeral;
        let table = DiscreteLogTable::new(max);
        table
            .solve(&message)
            .ok_or(CipherError::OutOfRange { max: table.max() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::KeyPair;
    use rand::rngs::OsRng;

    #[test]
    fn test_encrypt_decrypt() {
        let keypair = KeyPair::generate();
        let ct = ElGamalCiphertext::encrypt(42, &keypair.public, &mut OsRng);

        assert_eq!(keypair.secret.decrypt_count(&ct, 100).unwrap(), 42);
    }

    #[test]
    fn test_homomorphic_add() {
        let keypair = KeyPair::generate();
        let a = ElGamalCiphertext::encrypt(100, &keypair.public, &mut OsRng);
        let b = ElGamalCiphertext::encrypt(50, &keypair.public, &mut OsRng);

        let sum = a.add(&b, &keypair.public).unwrap();
        assert_eq!(keypair.secret.decrypt_count(&sum, 1_000).unwrap(), 150);
    }

    #[test]
    fn test_complement_of_choices() {
        let keypair = KeyPair::generate();
        let yes = ElGamalCiphertext::encrypt_choice(true, &keypair.public, &mut OsRng);
        let no = ElGamalCiphertext::encrypt_choice(false, &keypair.public, &mut OsRng);

        let not_yes = yes.complement(&keypair.public).unwrap();
        let not_no = no.complement(&keypair.public).unwrap();

        assert_eq!(keypair.secret.decrypt_count(&not_yes, 1).unwrap(), 0);
        assert_eq!(keypair.secret.decrypt_count(&not_no, 1).unwrap(), 1);
    }

    #[test]
    fn test_zero_is_additive_identity() {
        let keypair = KeyPair::generate();
        let zero = ElGamalCiphertext::encrypted_zero(&keypair.public).unwrap();
        let ct = ElGamalCiphertext::encrypt(7, &keypair.public, &mut OsRng);

        let sum = zero.add(&ct, &keypair.public).unwrap();
        assert_eq!(keypair.secret.decrypt_count(&sum, 10).unwrap(), 7);
        assert_eq!(keypair.secret.decrypt_count(&zero, 0).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_detected() {
        let keypair = KeyPair::generate();
        let ct = ElGamalCiphertext::encrypt(5, &keypair.public, &mut OsRng);

        let err = keypair.secret.decrypt_count(&ct, 4).unwrap_err();
        assert!(matches!(err, CipherError::OutOfRange { max: 4 }));
    }

    #[test]
    fn test_wrong_key_not_authorized() {
        let keypair = KeyPair::generate();
        let other = KeyPair::generate();

        assert!(Decrypt::<ElGamalCiphertext>::authorizes(&keypair.secret, &keypair.public));
        assert!(!Decrypt::<ElGamalCiphertext>::authorizes(&other.secret, &keypair.public));
    }

    #[test]
    fn test_serialization_preserves_plaintext() {
        let keypair = KeyPair::generate();
        let ct = ElGamalCiphertext::encrypt(3, &keypair.public, &mut OsRng);

        let bytes = ct.to_bytes().unwrap();
        assert_eq!(bytes.len(), CIPHERTEXT_BYTES);

        let restored = ElGamalCiphertext::from_bytes(&bytes).unwrap();
        assert_eq!(restored, ct);
        assert_eq!(keypair.secret.decrypt_count(&restored, 10).unwrap(), 3);
    }

    #[test]
    fn test_malformed_bytes_rejected() {
        assert!(ElGamalCiphertext::from_bytes(&[0u8; 10]).is_err());
        assert!(ElGamalCiphertext::from_bytes(&[0xffu8; CIPHERTEXT_BYTES]).is_err());
    }

    #[test]
    fn test_encryption_is_randomized() {
        let keypair = KeyPair::generate();
        let a = ElGamalCiphertext::encrypt_choice(true, &keypair.public, &mut OsRng);
        let b = ElGamalCiphertext::encrypt_choice(true, &keypair.public, &mut OsRng);

        assert_ne!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }
}

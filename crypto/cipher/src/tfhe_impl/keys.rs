//! FHE key management with TFHE-rs
//!
//! - ClientKey: encryption and decryption (held by the disclosing authority)
//! - ServerKey: homomorphic evaluation (held by the tally engine)
//! - CompactPublicKey: encryption only (published to voters)

use tfhe::{generate_keys, CompactPublicKey, ConfigBuilder};
use tfhe::{ClientKey as TfheClientKey, ServerKey as TfheServerKey};

use crate::{CipherError, CipherResult};

/// TFHE parameter selection
#[derive(Clone, Debug)]
pub struct FheConfig {
    /// Security parameter (bits)
    pub security_bits: u32,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self { security_bits: 128 }
    }
}

impl FheConfig {
    fn build(&self) -> tfhe::Config {
        if self.security_bits >= 128 {
            ConfigBuilder::default().build()
        } else {
            // Lower security for testing
            ConfigBuilder::default_with_small_encryption().build()
        }
    }

    fn hash(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sealvote_tfhe_config_v1");
        hasher.update(&self.security_bits.to_le_bytes());
        *hasher.finalize().as_bytes()
    }
}

/// Identifier of one keygen: BLAKE3 over the serialized client key
fn client_key_id(inner: &TfheClientKey) -> CipherResult<[u8; 32]> {
    let bytes = bincode::serialize(inner)
        .map_err(|e| CipherError::KeyGenerationFailed(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"sealvote_tfhe_client_key_v1");
    hasher.update(&bytes);
    Ok(*hasher.finalize().as_bytes())
}

/// Client key for encryption and decryption
#[derive(Clone)]
pub struct ClientKey {
    pub(crate) inner: TfheClientKey,
    pub(crate) config_hash: [u8; 32],
    pub(crate) key_id: [u8; 32],
    pub(crate) public: CompactPublicKey,
}

impl ClientKey {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> CipherResult<Vec<u8>> {
        Ok(bincode::serialize(&self.inner)?)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8], config: &FheConfig) -> CipherResult<Self> {
        let inner: TfheClientKey = bincode::deserialize(bytes)?;
        let public = CompactPublicKey::new(&inner);
        Ok(Self {
            key_id: client_key_id(&inner)?,
            inner,
            config_hash: config.hash(),
            public,
        })
    }

    /// Derive a server key for the tally engine
    pub fn derive_server_key(&self) -> ServerKey {
        ServerKey {
            inner: TfheServerKey::new(&self.inner),
            config_hash: self.config_hash,
            key_id: self.key_id,
        }
    }

    /// Identifier shared with every server key derived from this key
    pub fn key_id(&self) -> [u8; 32] {
        self.key_id
    }

    /// Public key voters encrypt with
    pub fn public_key(&self) -> &CompactPublicKey {
        &self.public
    }
}

impl std::fmt::Debug for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientKey")
            .field("config_hash", &hex::encode(&self.config_hash[..8]))
            .field("key_id", &hex::encode(&self.key_id[..8]))
            .finish()
    }
}

/// Server key for homomorphic operations
#[derive(Clone)]
pub struct ServerKey {
    inner: TfheServerKey,
    pub(crate) config_hash: [u8; 32],
    /// Id of the client key this key was derived from
    pub(crate) key_id: [u8; 32],
}

impl ServerKey {
    /// Install this key for TFHE-rs operations on the calling thread.
    ///
    /// TFHE-rs keeps the server key in thread-local storage, so every
    /// evaluation entry point calls this first.
    pub fn activate(&self) {
        tfhe::set_server_key(self.inner.clone());
    }

    /// Verify this key was generated with `config`
    pub fn verify_config(&self, config: &FheConfig) -> bool {
        self.config_hash == config.hash()
    }

    /// Serialize to bytes (large: tens of MB). The client key id travels along.
    pub fn to_bytes(&self) -> CipherResult<Vec<u8>> {
        Ok(bincode::serialize(&(&self.key_id, &self.inner))?)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8], config: &FheConfig) -> CipherResult<Self> {
        let (key_id, inner): ([u8; 32], TfheServerKey) = bincode::deserialize(bytes)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        Ok(Self {
            inner,
            config_hash: config.hash(),
            key_id,
        })
    }

    pub fn key_id(&self) -> [u8; 32] {
        self.key_id
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("config_hash", &hex::encode(&self.config_hash[..8]))
            .field("key_id", &hex::encode(&self.key_id[..8]))
            .finish()
    }
}

/// Client and server key generated together
#[derive(Clone, Debug)]
pub struct FheKeyPair {
    pub client: ClientKey,
    pub server: ServerKey,
}

impl FheKeyPair {
    /// Generate a new key pair
    pub fn generate(config: &FheConfig) -> CipherResult<Self> {
        let (client_key, server_key) = generate_keys(config.build());
        let public = CompactPublicKey::new(&client_key);
        let config_hash = config.hash();
        let key_id = client_key_id(&client_key)?;

        Ok(Self {
            client: ClientKey {
                inner: client_key,
                config_hash,
                key_id,
                public,
            },
            server: ServerKey {
                inner: server_key,
                config_hash,
                key_id,
            },
        })
    }
}

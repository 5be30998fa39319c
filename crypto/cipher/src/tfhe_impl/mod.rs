//! TFHE-rs backend
//!
//! Tallies as `FheUint64` values. The server key is the evaluation key and
//! the client key is the decryption capability.
//!
//! WARNING: key generation takes tens of seconds and server keys are large.

mod keys;
mod ciphertext;

pub use keys::{ClientKey, FheConfig, FheKeyPair, ServerKey};
pub use ciphertext::FheTallyCiphertext;

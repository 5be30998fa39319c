//! Exponential ElGamal over the Ristretto group
//!
//! `Enc(m) = (r·G, m·G + r·H)` with `H = x·G`. Adding ciphertexts adds the
//! exponents, so sums of 0/1 ballots stay encrypted until a holder of `x`
//! recovers `m·G` and solves a small discrete log.

mod keys;
mod ciphertext;
mod dlog;

pub use keys::{KeyPair, PublicKey, SecretKey};
pub use ciphertext::ElGamalCiphertext;
pub use dlog::DiscreteLogTable;

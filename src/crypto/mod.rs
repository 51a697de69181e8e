//! Cryptographic utilities for request authentication
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management and recoverable signatures (secp256k1)
//! - Signer address recovery and derivation

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, sha256, sha256_hex};
pub use keys::{
    network_hrp, public_key_to_address, recover_address, strip_hex_prefix, KeyError, KeyPair,
    RECOVERABLE_SIG_LEN,
};

//! ECDSA key management and signer recovery
//!
//! Provides key pair generation, recoverable signing, and public key
//! recovery using the secp256k1 elliptic curve. Every authenticated
//! request to the service carries a recoverable signature from which
//! the signer's chain address is derived.

use rand::rngs::OsRng;
use ripemd::{Digest, Ripemd160};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::{double_sha256, sha256};

/// Length of a recoverable signature: 64 compact bytes plus the recovery id
pub const RECOVERABLE_SIG_LEN: usize = 65;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(strip_hex_prefix(hex_key)).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Derive the chain address for this key pair on the given network
    pub fn address(&self, network_id: u32) -> String {
        public_key_to_address(&self.public_key, network_id)
    }

    /// Sign a payload with a recoverable signature, returned as hex
    ///
    /// The payload is digested with SHA-256 before signing. The result is
    /// the 64 compact signature bytes followed by the recovery id.
    pub fn sign_recoverable(&self, payload: &[u8]) -> Result<String, KeyError> {
        let secp = Secp256k1::new();
        let digest = sha256(payload);
        let message = Message::from_digest_slice(&digest)?;
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; RECOVERABLE_SIG_LEN];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = recovery_id.to_i32() as u8;
        Ok(hex::encode(bytes))
    }
}

/// Human-readable address prefix for a network id
pub fn network_hrp(network_id: u32) -> &'static str {
    match network_id {
        1 => "main",
        5 => "test",
        _ => "local",
    }
}

/// Convert a public key to a chain address
///
/// The address is the network prefix joined to the Base58Check encoding
/// of RIPEMD160(SHA256(pubkey)).
pub fn public_key_to_address(public_key: &PublicKey, network_id: u32) -> String {
    // SHA256 of the compressed public key, then RIPEMD160
    let sha256_hash = sha256(&public_key.serialize());
    let mut ripemd = Ripemd160::new();
    ripemd.update(&sha256_hash);
    let key_hash = ripemd.finalize();

    // Version byte + key hash + 4-byte checksum, Base58 encoded
    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&key_hash);
    let checksum = double_sha256(&address_bytes);
    address_bytes.extend_from_slice(&checksum[..4]);

    format!(
        "{}-{}",
        network_hrp(network_id),
        bs58::encode(address_bytes).into_string()
    )
}

/// Recover the signer's chain address from a payload and a recoverable
/// signature
///
/// `payload` is the exact byte sequence that was signed; `signature_hex`
/// is the hex encoding of the 65-byte recoverable signature (an optional
/// `0x` prefix is accepted). Returns an error on any malformed input;
/// never panics.
pub fn recover_address(
    payload: &[u8],
    signature_hex: &str,
    network_id: u32,
) -> Result<String, KeyError> {
    let bytes =
        hex::decode(strip_hex_prefix(signature_hex)).map_err(|_| KeyError::InvalidSignature)?;
    if bytes.len() != RECOVERABLE_SIG_LEN {
        return Err(KeyError::InvalidSignature);
    }

    let recovery_id =
        RecoveryId::from_i32(bytes[64] as i32).map_err(|_| KeyError::InvalidSignature)?;
    let signature = RecoverableSignature::from_compact(&bytes[..64], recovery_id)
        .map_err(|_| KeyError::InvalidSignature)?;

    let secp = Secp256k1::new();
    let digest = sha256(payload);
    let message = Message::from_digest_slice(&digest)?;
    let public_key = secp.recover_ecdsa(&message, &signature)?;

    Ok(public_key_to_address(&public_key, network_id))
}

/// Strip an optional `0x` prefix from a hex string
pub fn strip_hex_prefix(hex_str: &str) -> &str {
    hex_str.strip_prefix("0x").unwrap_or(hex_str)
}

//! Signed transaction envelope
//!
//! A fully-signed transaction submitted for issuance is the unsigned
//! transaction bytes followed by the collected credentials. Only the
//! envelope structure is interpreted here; the unsigned payload itself
//! stays opaque to this service.
//!
//! Layout (big-endian):
//! Version (2) + UnsignedLen (4) + UnsignedBytes + CredentialCount (4) +
//! Credentials (65 bytes each)

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

use crate::crypto::{strip_hex_prefix, RECOVERABLE_SIG_LEN};

/// Envelope codec version
pub const CODEC_VERSION: u16 = 0;

/// Errors from envelope encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid hex encoding")]
    InvalidHex,
    #[error("Unsupported codec version: {0}")]
    UnsupportedVersion(u16),
    #[error("Truncated envelope")]
    Truncated,
    #[error("Trailing bytes after envelope")]
    TrailingBytes,
}

/// A decoded signed-transaction envelope
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The unsigned transaction payload, opaque to this service
    pub unsigned_bytes: Vec<u8>,
    /// Recoverable signatures collected for the transaction
    pub credentials: Vec<[u8; RECOVERABLE_SIG_LEN]>,
}

impl SignedTransaction {
    /// Decode an envelope from raw bytes
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut buf = data;

        if buf.remaining() < 6 {
            return Err(CodecError::Truncated);
        }
        let version = buf.get_u16();
        if version != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let unsigned_len = buf.get_u32() as usize;
        if buf.remaining() < unsigned_len {
            return Err(CodecError::Truncated);
        }
        let unsigned_bytes = buf[..unsigned_len].to_vec();
        buf.advance(unsigned_len);

        if buf.remaining() < 4 {
            return Err(CodecError::Truncated);
        }
        let credential_count = buf.get_u32() as usize;
        if buf.remaining() < credential_count * RECOVERABLE_SIG_LEN {
            return Err(CodecError::Truncated);
        }

        let mut credentials = Vec::with_capacity(credential_count);
        for _ in 0..credential_count {
            let mut credential = [0u8; RECOVERABLE_SIG_LEN];
            credential.copy_from_slice(&buf[..RECOVERABLE_SIG_LEN]);
            buf.advance(RECOVERABLE_SIG_LEN);
            credentials.push(credential);
        }

        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes);
        }

        Ok(Self {
            unsigned_bytes,
            credentials,
        })
    }

    /// Decode an envelope from a hex string (optional `0x` prefix)
    pub fn from_hex(signed_tx_hex: &str) -> Result<Self, CodecError> {
        let bytes =
            hex::decode(strip_hex_prefix(signed_tx_hex)).map_err(|_| CodecError::InvalidHex)?;
        Self::decode(&bytes)
    }

    /// Encode the envelope to raw bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(
            10 + self.unsigned_bytes.len() + self.credentials.len() * RECOVERABLE_SIG_LEN,
        );
        buf.put_u16(CODEC_VERSION);
        buf.put_u32(self.unsigned_bytes.len() as u32);
        buf.put_slice(&self.unsigned_bytes);
        buf.put_u32(self.credentials.len() as u32);
        for credential in &self.credentials {
            buf.put_slice(credential);
        }
        buf.to_vec()
    }
}

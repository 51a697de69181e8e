//! Chain transaction envelope handling
//!
//! Minimal codec for the signed-transaction envelope submitted at
//! issuance. The unsigned transaction body is never interpreted.

pub mod envelope;

pub use envelope::{CodecError, SignedTransaction, CODEC_VERSION};

//! Cell payload serialization.
//!
//! A [`Codec`] turns the ordered `(key, record)` list cached under one cell
//! into bytes for the backend and back. Decoding must reproduce the exact
//! list, order included, since order is eviction priority.
//!
//! # Available Codecs
//!
//! - [`BincodeCodec`]: plain bincode
//! - [`ZlibBincodeCodec`]: bincode compressed with zlib

mod binary;

pub use binary::{BincodeCodec, ZlibBincodeCodec};

use thiserror::Error;

/// Errors raised while encoding or decoding a cell payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload could not be serialized or deserialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    /// Compression or decompression failed.
    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

/// Encode/decode pair for cell payloads.
pub trait Codec<R>: Send + Sync {
    /// Encode an ordered payload.
    fn encode(&self, pairs: &[(String, R)]) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes produced by [`Codec::encode`].
    ///
    /// Malformed input yields an error, never a partial payload.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, R)>, CodecError>;
}

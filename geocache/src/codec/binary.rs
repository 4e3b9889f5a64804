//! bincode-based codecs.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Codec, CodecError};

/// Plain bincode encoding of the payload list.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }
}

impl<R> Codec<R> for BincodeCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, pairs: &[(String, R)]) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(pairs)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, R)>, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// bincode encoding wrapped in a zlib stream.
///
/// Cell payloads hold many similar records, so they compress well; this
/// trades CPU for backend memory and network transfer.
#[derive(Debug, Clone, Copy)]
pub struct ZlibBincodeCodec {
    level: Compression,
}

impl ZlibBincodeCodec {
    /// Create a codec with the default compression level.
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Create a codec with an explicit compression level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibBincodeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Codec<R> for ZlibBincodeCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, pairs: &[(String, R)]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        bincode::serialize_into(&mut encoder, pairs)?;
        encoder.flush()?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, R)>, CodecError> {
        // Slice decoding checks every length prefix against the bytes present.
        let mut buf = Vec::new();
        ZlibDecoder::new(bytes).read_to_end(&mut buf)?;
        Ok(bincode::deserialize(&buf)?)
    }
}

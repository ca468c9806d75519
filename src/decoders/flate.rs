//! FlateDecode (zlib/deflate) implementation.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// FlateDecode filter implementation.
///
/// Tries zlib first, then raw deflate, then deflate past a damaged two-byte
/// header. Output produced before a corruption point is kept.
pub struct FlateDecoder;

/// Read `reader` to the end; `Some` if anything was produced.
fn inflate_lossy(mut reader: impl Read, label: &str) -> Option<Vec<u8>> {
    let mut output = Vec::new();
    match reader.read_to_end(&mut output) {
        Ok(_) => Some(output),
        Err(e) if !output.is_empty() => {
            log::warn!("{} partial recovery: {} bytes before error: {}", label, output.len(), e);
            Some(output)
        },
        Err(e) => {
            log::debug!("{} failed: {}", label, e);
            None
        },
    }
}

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        if let Some(output) = inflate_lossy(ZlibDecoder::new(input), "zlib") {
            return Ok(output);
        }
        if let Some(output) = inflate_lossy(DeflateDecoder::new(input), "raw deflate") {
            return Ok(output);
        }
        if input.len() > 2 {
            if let Some(output) = inflate_lossy(DeflateDecoder::new(&input[2..]), "deflate after header") {
                return Ok(output);
            }
        }
        Err(Error::Decode(format!("FlateDecode: cannot inflate {} bytes", input.len())))
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

//! LZWDecode implementation.
//!
//! PDF LZW uses MSB-first codes starting at 9 bits. With `/EarlyChange 1`
//! (the default) the code width grows one code early, which is the TIFF
//! variant of the algorithm.

use weezl::{BitOrder, decode::Decoder};

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// LZWDecode filter implementation.
pub struct LzwDecoder {
    /// Value of `/EarlyChange` (true unless the stream sets it to 0)
    pub early_change: bool,
}

impl Default for LzwDecoder {
    fn default() -> Self {
        Self { early_change: true }
    }
}

impl StreamDecoder for LzwDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = if self.early_change {
            Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
        } else {
            Decoder::new(BitOrder::Msb, 8)
        };

        decoder
            .decode(input)
            .map_err(|e| Error::Decode(format!("LZWDecode error: {:?}", e)))
    }

    fn name(&self) -> &str {
        "LZWDecode"
    }
}

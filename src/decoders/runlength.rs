//! RunLengthDecode implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// RunLengthDecode filter implementation.
///
/// A length byte `n` below 128 copies the next `n + 1` bytes, above 128
/// repeats the next byte `257 - n` times, and 128 ends the data.
pub struct RunLengthDecoder;

impl StreamDecoder for RunLengthDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut rest = input;

        while let Some((&length, tail)) = rest.split_first() {
            rest = tail;
            match length {
                128 => break,
                0..=127 => {
                    let count = length as usize + 1;
                    if rest.len() < count {
                        return Err(Error::Decode(format!(
                            "RunLengthDecode: literal run of {} with {} bytes left",
                            count,
                            rest.len()
                        )));
                    }
                    output.extend_from_slice(&rest[..count]);
                    rest = &rest[count..];
                },
                _ => {
                    let (&byte, tail) = rest
                        .split_first()
                        .ok_or_else(|| Error::Decode("RunLengthDecode: missing run byte".to_string()))?;
                    output.resize(output.len() + 257 - length as usize, byte);
                    rest = tail;
                },
            }
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "RunLengthDecode"
    }
}

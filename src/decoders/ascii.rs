//! ASCIIHexDecode and ASCII85Decode.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCIIHexDecode: pairs of hex digits, whitespace ignored, `>` ends the data.
/// An odd final digit is padded with 0.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2);
        let mut high: Option<u8> = None;

        for &c in input {
            if c == b'>' {
                break;
            }
            if c.is_ascii_whitespace() || c == 0 {
                continue;
            }
            let nibble = (c as char)
                .to_digit(16)
                .ok_or_else(|| Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", c as char)))?
                as u8;
            match high.take() {
                Some(h) => output.push(h << 4 | nibble),
                None => high = Some(nibble),
            }
        }
        if let Some(h) = high {
            output.push(h << 4);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

/// ASCII85Decode: groups of five characters `!`..`u` encode four bytes,
/// `z` encodes four zero bytes, `~>` ends the data.
pub struct Ascii85Decoder;

impl StreamDecoder for Ascii85Decoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 4 / 5);
        let mut group = [0u8; 5];
        let mut count = 0;

        let data = input.strip_prefix(b"<~").unwrap_or(input);
        for &c in data {
            match c {
                b'~' => break,
                b'z' if count == 0 => output.extend_from_slice(&[0; 4]),
                b'z' => return Err(Error::Decode("ASCII85Decode: 'z' inside a group".to_string())),
                b'!'..=b'u' => {
                    group[count] = c - b'!';
                    count += 1;
                    if count == 5 {
                        output.extend_from_slice(&group_value(&group)?.to_be_bytes());
                        count = 0;
                    }
                },
                _ if c.is_ascii_whitespace() || c == 0 => {},
                _ => {
                    return Err(Error::Decode(format!(
                        "ASCII85Decode: invalid character '{}'",
                        c as char
                    )));
                },
            }
        }

        match count {
            0 => {},
            1 => return Err(Error::Decode("ASCII85Decode: dangling single character".to_string())),
            _ => {
                group[count..].fill(b'u' - b'!');
                let bytes = group_value(&group)?.to_be_bytes();
                output.extend_from_slice(&bytes[..count - 1]);
            },
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCII85Decode"
    }
}

fn group_value(group: &[u8; 5]) -> Result<u32> {
    let value = group.iter().fold(0u64, |acc, &d| acc * 85 + d as u64);
    u32::try_from(value).map_err(|_| Error::Decode("ASCII85Decode: group overflow".to_string()))
}

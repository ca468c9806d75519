//! Stream decoder implementations for PDF filters.
//!
//! Supported filters:
//! - FlateDecode (zlib/deflate), with PNG and TIFF predictors
//! - LZWDecode, with PNG and TIFF predictors and `/EarlyChange`
//! - ASCIIHexDecode and ASCII85Decode
//! - RunLengthDecode
//!
//! Image filters (DCT, JPX, CCITT, JBIG2) end the chain and hand the data back
//! untouched. Abbreviated filter names from inline images are accepted.

use crate::error::{Error, Result};
use crate::parser_config::ParserOptions;

mod ascii;
mod flate;
mod lzw;
mod predictor;
mod runlength;

pub use ascii::{Ascii85Decoder, AsciiHexDecoder};
pub use flate::FlateDecoder;
pub use lzw::LzwDecoder;
pub use predictor::{DecodeParams, decode_predictor};
pub use runlength::RunLengthDecoder;

/// Trait for PDF stream decoders.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of this decoder (e.g., "FlateDecode").
    fn name(&self) -> &str;
}

/// Filters that produce image samples; decoding stops in front of them.
const IMAGE_FILTERS: &[&str] = &[
    "DCTDecode",
    "DCT",
    "JPXDecode",
    "CCITTFaxDecode",
    "CCF",
    "JBIG2Decode",
];

/// Look up the decoder for a filter name.
///
/// Returns `Ok(None)` for image filters, which are left encoded.
pub fn decoder_for(name: &str, params: Option<&DecodeParams>) -> Result<Option<Box<dyn StreamDecoder>>> {
    let decoder: Box<dyn StreamDecoder> = match name {
        "FlateDecode" | "Fl" => Box::new(FlateDecoder),
        "LZWDecode" | "LZW" => Box::new(LzwDecoder {
            early_change: params.map_or(true, |p| p.early_change),
        }),
        "ASCIIHexDecode" | "AHx" => Box::new(AsciiHexDecoder),
        "ASCII85Decode" | "A85" => Box::new(Ascii85Decoder),
        "RunLengthDecode" | "RL" => Box::new(RunLengthDecoder),
        _ if IMAGE_FILTERS.contains(&name) => return Ok(None),
        _ => return Err(Error::UnsupportedFilter(name.to_string())),
    };
    Ok(Some(decoder))
}

/// Run `data` through a filter chain.
///
/// Each entry pairs a filter name with its optional `/DecodeParms`.
/// Decompression-bomb limits from `options` are checked after every stage.
pub fn decode_stream(
    data: &[u8],
    chain: &[(String, Option<DecodeParams>)],
    options: &ParserOptions,
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for (name, params) in chain {
        let decoder = match decoder_for(name, params.as_ref())? {
            Some(decoder) => decoder,
            None => {
                log::debug!("Leaving {} data encoded", name);
                break;
            },
        };

        current = decoder.decode(&current)?;
        options.check_decompressed(data.len(), current.len())?;

        if let Some(params) = params {
            let predicted = matches!(decoder.name(), "FlateDecode" | "LZWDecode");
            if predicted && params.predictor > 1 {
                let row_len = params.row_bytes()?;
                if options.max_decompressed_size > 0 && row_len > options.max_decompressed_size {
                    return Err(Error::Decode(format!(
                        "predictor row of {} bytes exceeds limit {}",
                        row_len, options.max_decompressed_size
                    )));
                }
                current = decode_predictor(&current, params)?;
            }
        }
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> Vec<(String, Option<DecodeParams>)> {
        names.iter().map(|n| (n.to_string(), None)).collect()
    }

    #[test]
    fn test_decode_stream_no_filters() {
        let data = b"Hello, World!";
        let result = decode_stream(data, &[], &ParserOptions::default()).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_decode_stream_unsupported_filter() {
        match decode_stream(b"test", &chain(&["Bogus"]), &ParserOptions::default()) {
            Err(Error::UnsupportedFilter(name)) => assert_eq!(name, "Bogus"),
            other => panic!("Expected UnsupportedFilter error, got {:?}", other),
        }
    }

    #[test]
    fn test_image_filter_ends_chain() {
        let result = decode_stream(
            b"48656C6C6F>",
            &chain(&["DCTDecode", "ASCIIHexDecode"]),
            &ParserOptions::default(),
        )
        .unwrap();
        assert_eq!(result, b"48656C6C6F>");
    }

    #[test]
    fn test_flate_with_png_predictor() {
        use flate2::{Compression, write::ZlibEncoder};
        use std::io::Write;

        // Two rows of 2 columns with the Up predictor
        let raw = [2u8, 1, 2, 2, 1, 1];
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let compressed = encoder.finish().unwrap();

        let params = DecodeParams {
            predictor: 12,
            columns: 2,
            ..Default::default()
        };
        let result = decode_stream(
            &compressed,
            &[("FlateDecode".to_string(), Some(params))],
            &ParserOptions::default(),
        )
        .unwrap();
        assert_eq!(result, vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_decompressed_size_limit() {
        let options = ParserOptions {
            max_decompressed_size: 2,
            ..ParserOptions::default()
        };
        let result = decode_stream(b"414243", &chain(&["AHx"]), &options);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_oversized_predictor_row_rejected() {
        use flate2::{Compression, write::ZlibEncoder};
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0, 1, 2, 3]).unwrap();
        let compressed = encoder.finish().unwrap();

        let hostile = DecodeParams {
            predictor: 12,
            columns: 4_611_686_018_427_387_904,
            colors: 8,
            ..Default::default()
        };
        let result = decode_stream(
            &compressed,
            &[("FlateDecode".to_string(), Some(hostile))],
            &ParserOptions::default(),
        );
        assert!(matches!(result, Err(Error::Decode(_))));

        let wide = DecodeParams {
            predictor: 12,
            columns: 1 << 30,
            ..Default::default()
        };
        let options = ParserOptions {
            max_decompressed_size: 1024,
            ..ParserOptions::default()
        };
        let result = decode_stream(&compressed, &[("FlateDecode".to_string(), Some(wide))], &options);
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}

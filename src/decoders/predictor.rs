//! PNG (10-15) and TIFF (2) predictors from `/DecodeParms`.

use crate::error::{Error, Result};
use crate::object::Dict;

/// Decode parameters for Flate and LZW streams.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: usize,
    /// Color components per sample
    pub colors: usize,
    /// Bits per component
    pub bits_per_component: usize,
    /// LZW `/EarlyChange`
    pub early_change: bool,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
            early_change: true,
        }
    }
}

impl DecodeParams {
    /// Read parameters from a `/DecodeParms` dictionary, with PDF defaults
    /// for missing or non-positive entries.
    pub fn from_dict(dict: &Dict) -> Self {
        let int = |key: &str| dict.get(key).and_then(|v| v.as_integer());
        let positive = |key: &str, default: usize| {
            int(key)
                .and_then(|v| usize::try_from(v).ok())
                .filter(|&v| v > 0)
                .unwrap_or(default)
        };
        Self {
            predictor: int("Predictor").unwrap_or(1),
            columns: positive("Columns", 1),
            colors: positive("Colors", 1),
            bits_per_component: positive("BitsPerComponent", 8),
            early_change: int("EarlyChange") != Some(0),
        }
    }

    /// Bytes per predicted row, excluding the PNG filter-type byte.
    pub fn row_bytes(&self) -> Result<usize> {
        self.columns
            .checked_mul(self.colors)
            .and_then(|samples| samples.checked_mul(self.bits_per_component))
            .map(|bits| bits.div_ceil(8))
            .ok_or_else(|| {
                Error::Decode(format!(
                    "predictor row of {} columns x {} colors x {} bits overflows",
                    self.columns, self.colors, self.bits_per_component
                ))
            })
    }

    fn pixel_bytes(&self) -> Result<usize> {
        self.colors
            .checked_mul(self.bits_per_component)
            .map(|bits| bits.div_ceil(8).max(1))
            .ok_or_else(|| {
                Error::Decode(format!(
                    "predictor pixel of {} colors x {} bits overflows",
                    self.colors, self.bits_per_component
                ))
            })
    }
}

/// Reverse the predictor named by `params`.
pub fn decode_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => decode_tiff(data, params),
        10..=15 => decode_png(data, params),
        other => Err(Error::Decode(format!("Unsupported predictor: {}", other))),
    }
}

/// TIFF predictor 2, 8-bit components only.
fn decode_tiff(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(Error::Decode(format!(
            "TIFF predictor with {} bits per component",
            params.bits_per_component
        )));
    }
    let row_len = params.row_bytes()?.max(1);
    let bpp = params.pixel_bytes()?;
    let mut output = data.to_vec();
    for row in output.chunks_mut(row_len) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(output)
}

/// PNG predictors. Every row carries its own filter-type byte. A trailing
/// partial row is dropped with a warning.
fn decode_png(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    let row_len = params.row_bytes()?;
    let bpp = params.pixel_bytes()?;
    let stride = row_len
        .checked_add(1)
        .ok_or_else(|| Error::Decode(format!("predictor row of {} bytes overflows", row_len)))?;

    if data.len() % stride != 0 {
        log::warn!(
            "PNG predictor: {} trailing bytes do not form a full row of {}",
            data.len() % stride,
            stride
        );
    }

    let mut output = Vec::with_capacity(data.len() / stride * row_len);
    // Empty until the first row is decoded; reads as zeros.
    let mut prev: Vec<u8> = Vec::new();

    for chunk in data.chunks_exact(stride) {
        let kind = chunk[0];
        let mut row = chunk[1..].to_vec();
        for i in 0..row_len {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev.get(i).copied().unwrap_or(0);
            let up_left = if i >= bpp { prev.get(i - bpp).copied().unwrap_or(0) } else { 0 };
            let predicted = match kind {
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => 0,
            };
            row[i] = row[i].wrapping_add(predicted);
        }
        output.extend_from_slice(&row);
        prev = row;
    }

    Ok(output)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Value;

    fn png(columns: usize) -> DecodeParams {
        DecodeParams {
            predictor: 12,
            columns,
            ..Default::default()
        }
    }

    #[test]
    fn test_png_sub_and_up_rows() {
        // Row 1: Sub over [1, 1, 1] -> [1, 2, 3]; row 2: Up over [1, 1, 1] -> [2, 3, 4]
        let data = [1, 1, 1, 1, 2, 1, 1, 1];
        assert_eq!(decode_predictor(&data, &png(3)).unwrap(), vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_png_average_and_paeth() {
        let data = [0, 10, 20, 3, 10, 10, 4, 0, 0];
        // Row 2 Average: 10 + 10/2 = 15, 10 + (15 + 20)/2 = 27
        // Row 3 Paeth: left 0, up 15 -> 15; left 15, up 27, up-left 15 -> 27
        assert_eq!(
            decode_predictor(&data, &png(2)).unwrap(),
            vec![10, 20, 15, 27, 15, 27]
        );
    }

    #[test]
    fn test_tiff_predictor() {
        let params = DecodeParams {
            predictor: 2,
            columns: 3,
            ..Default::default()
        };
        assert_eq!(decode_predictor(&[5, 1, 1, 7, 2, 2], &params).unwrap(), vec![5, 6, 7, 7, 9, 11]);
    }

    #[test]
    fn test_unknown_predictor() {
        let params = DecodeParams {
            predictor: 7,
            ..Default::default()
        };
        assert!(decode_predictor(b"x", &params).is_err());
    }

    #[test]
    fn test_overflowing_row_is_decode_error() {
        let mut dict = Dict::new();
        dict.insert("Predictor".to_string(), Value::Integer(12));
        dict.insert("Columns".to_string(), Value::Integer(4_611_686_018_427_387_904));
        dict.insert("Colors".to_string(), Value::Integer(8));
        let params = DecodeParams::from_dict(&dict);
        assert!(matches!(params.row_bytes(), Err(Error::Decode(_))));
        assert!(matches!(decode_predictor(&[0, 1, 2], &params), Err(Error::Decode(_))));
    }

    #[test]
    fn test_huge_row_without_data_allocates_nothing() {
        // Fits in usize but no full row is present
        let params = png(1 << 40);
        assert_eq!(decode_predictor(&[2, 1, 1], &params).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_from_dict_defaults() {
        let mut dict = Dict::new();
        dict.insert("Predictor".to_string(), Value::Integer(12));
        dict.insert("Columns".to_string(), Value::Integer(4));
        dict.insert("EarlyChange".to_string(), Value::Integer(0));
        let params = DecodeParams::from_dict(&dict);
        assert_eq!(params.predictor, 12);
        assert_eq!(params.columns, 4);
        assert_eq!(params.colors, 1);
        assert!(!params.early_change);
    }
}

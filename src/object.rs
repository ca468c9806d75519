//! PDF object types.
//!
//! [`Value`] is the closed set of PDF object kinds. A [`Value::Reference`] is
//! never dereferenced implicitly; callers go through
//! [`PdfDocument::resolve`](crate::document::PdfDocument::resolve), which hands
//! back an independent copy.

use std::collections::HashMap;

use crate::decoders::DecodeParams;
use crate::error::{Error, Result};
use crate::parser_config::ParserOptions;

/// Dictionary payload: name (without the slash) to value.
pub type Dict = HashMap<String, Value>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (without the leading /)
    Name(String),
    /// Array of objects
    Array(Vec<Value>),
    /// Dictionary (key-value pairs)
    Dict(Dict),
    /// Stream (dictionary + undecoded data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Raw stream data, filters not yet applied
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Value {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::String(_) => "String",
            Value::Name(_) => "Name",
            Value::Array(_) => "Array",
            Value::Dict(_) => "Dictionary",
            Value::Stream { .. } => "Stream",
            Value::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer or real, widened to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dict and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            Value::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Value::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up `key` when this value is a dictionary or stream.
    /// Anything else, or a missing key, yields `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key))
    }

    /// Decode a PDF text string.
    ///
    /// Strings starting with the UTF-16BE byte order mark are decoded as
    /// UTF-16; everything else is PDFDocEncoding. Names come back verbatim.
    pub fn text(&self) -> Option<String> {
        match self {
            Value::String(bytes) => Some(decode_text_string(bytes)),
            Value::Name(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Decode stream data using the default (lenient) parser options.
    pub fn decode_stream_data(&self) -> Result<Vec<u8>> {
        self.decode_stream_data_with_options(&ParserOptions::default())
    }

    /// Decode stream data through the `/Filter` chain.
    ///
    /// `/DecodeParms` is matched to filters by position when it is an array,
    /// and applies to the single filter when it is a dictionary.
    pub fn decode_stream_data_with_options(&self, options: &ParserOptions) -> Result<Vec<u8>> {
        match self {
            Value::Stream { dict, data } => {
                let filters = dict
                    .get("Filter")
                    .map(extract_filter_names)
                    .unwrap_or_default();

                if filters.is_empty() {
                    return Ok(data.to_vec());
                }

                let params = extract_decode_params(dict.get("DecodeParms"), filters.len());
                let chain: Vec<(String, Option<DecodeParams>)> =
                    filters.into_iter().zip(params).collect();
                crate::decoders::decode_stream(data, &chain, options)
            },
            _ => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, else PDFDocEncoding).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes
        .iter()
        .map(|&b| crate::fonts::encoding::pdf_doc_char(b))
        .collect()
}

/// Extract filter names from a Filter object.
///
/// The Filter entry can be either a single Name or an Array of Names.
fn extract_filter_names(filter_obj: &Value) -> Vec<String> {
    match filter_obj {
        Value::Name(name) => vec![name.clone()],
        Value::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

/// One optional parameter set per filter.
fn extract_decode_params(params_obj: Option<&Value>, count: usize) -> Vec<Option<DecodeParams>> {
    let mut params = vec![None; count];
    match params_obj {
        Some(Value::Dict(d)) => {
            if let Some(first) = params.first_mut() {
                *first = Some(DecodeParams::from_dict(d));
            }
        },
        Some(Value::Array(arr)) => {
            for (slot, obj) in params.iter_mut().zip(arr) {
                *slot = obj.as_dict().map(DecodeParams::from_dict);
            }
        },
        _ => {},
    }
    params
}

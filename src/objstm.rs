//! Object streams (`/Type /ObjStm`).
//!
//! ```text
//! N 0 obj
//! << /Type /ObjStm /N 2 /First 9 /Filter /FlateDecode >>
//! stream
//! 10 0 11 15      % pairs: (object number, offset relative to /First)
//! << ... >>       % object 10
//! [ ... ]         % object 11
//! endstream
//! endobj
//! ```
//!
//! The container is decoded once; each member is parsed when first asked for.

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::object::Value;
use crate::parser::ObjectReader;
use crate::parser_config::ParserOptions;

/// A decoded object stream.
#[derive(Debug)]
pub struct ObjectStream {
    data: Vec<u8>,
    first: usize,
    pairs: Vec<(u32, usize)>,
    options: ParserOptions,
}

impl ObjectStream {
    /// Decode `stream` and read its header pairs.
    pub fn parse(stream: &Value, options: &ParserOptions) -> Result<Self> {
        let dict = match stream {
            Value::Stream { dict, .. } => dict,
            other => {
                return Err(Error::InvalidObjectType {
                    expected: "Stream".to_string(),
                    found: other.type_name().to_string(),
                });
            },
        };
        if let Some(kind) = dict.get("Type").and_then(Value::as_name) {
            if kind != "ObjStm" {
                return Err(Error::InvalidPdf(format!("expected /Type /ObjStm, got /{}", kind)));
            }
        }

        let count = dict
            .get("N")
            .and_then(Value::as_integer)
            .filter(|n| (0..=1_000_000).contains(n))
            .ok_or_else(|| Error::InvalidPdf("object stream missing valid /N".to_string()))?
            as usize;
        let first = dict
            .get("First")
            .and_then(Value::as_integer)
            .and_then(|f| usize::try_from(f).ok())
            .ok_or_else(|| Error::InvalidPdf("object stream missing valid /First".to_string()))?;

        let data = stream.decode_stream_data_with_options(options)?;
        if data.len() < first {
            return Err(Error::InvalidPdf(format!(
                "object stream data is {} bytes, /First is {}",
                data.len(),
                first
            )));
        }

        let pairs = read_pairs(&data[..first], count)?;
        Ok(Self {
            data,
            first,
            pairs,
            options: *options,
        })
    }

    /// Number of objects listed in the header.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the header lists no objects.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parse the member at `index`, returning its object number and value.
    pub fn get(&self, index: usize) -> Result<(u32, Value)> {
        let &(number, offset) = self.pairs.get(index).ok_or_else(|| {
            Error::InvalidPdf(format!(
                "object stream index {} out of range ({} objects)",
                index,
                self.pairs.len()
            ))
        })?;
        let start = self.first.saturating_add(offset);
        if start >= self.data.len() {
            return Err(Error::InvalidPdf(format!(
                "object {} offset {} beyond object stream data",
                number, offset
            )));
        }

        let lexer = Lexer::at(&self.data, start).allow_stream(false);
        let value = ObjectReader::new(lexer).with_options(&self.options).read_object()?;
        Ok((number, value))
    }
}

/// Read `count` pairs of (object number, relative offset).
fn read_pairs(header: &[u8], count: usize) -> Result<Vec<(u32, usize)>> {
    let mut lexer = Lexer::new(header).allow_objptr(false).allow_eof(true);
    let mut pairs = Vec::with_capacity(count);

    for _ in 0..count {
        let number = match lexer.next_token()? {
            Token::Integer(n) => u32::try_from(n).ok(),
            _ => None,
        };
        let offset = match lexer.next_token()? {
            Token::Integer(n) => usize::try_from(n).ok(),
            _ => None,
        };
        match (number, offset) {
            (Some(number), Some(offset)) => pairs.push((number, offset)),
            _ => {
                log::warn!("Object stream header has {} valid pairs, /N is {}", pairs.len(), count);
                break;
            },
        }
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Dict, ObjectRef};

    fn object_stream(header: &str, body: &str, n: i64) -> Value {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Value::Name("ObjStm".to_string()));
        dict.insert("N".to_string(), Value::Integer(n));
        dict.insert("First".to_string(), Value::Integer(header.len() as i64));
        Value::Stream {
            dict,
            data: bytes::Bytes::from(format!("{}{}", header, body)),
        }
    }

    #[test]
    fn test_members_parse_lazily_by_index() {
        let stream = object_stream("10 0 11 15 ", "<< /A 5 0 R >> [1 2 0 R]", 2);
        let objstm = ObjectStream::parse(&stream, &ParserOptions::default()).unwrap();
        assert_eq!(objstm.len(), 2);

        let (num, value) = objstm.get(1).unwrap();
        assert_eq!(num, 11);
        assert_eq!(
            value,
            Value::Array(vec![Value::Integer(1), Value::Reference(ObjectRef::new(2, 0))])
        );

        let (num, value) = objstm.get(0).unwrap();
        assert_eq!(num, 10);
        assert!(value.as_dict().is_some());
    }

    #[test]
    fn test_index_out_of_range() {
        let stream = object_stream("10 0 ", "42", 1);
        let objstm = ObjectStream::parse(&stream, &ParserOptions::default()).unwrap();
        assert!(objstm.get(3).is_err());
    }

    #[test]
    fn test_first_beyond_data() {
        let mut stream = object_stream("10 0 ", "42", 1);
        if let Value::Stream { dict, .. } = &mut stream {
            dict.insert("First".to_string(), Value::Integer(500));
        }
        assert!(ObjectStream::parse(&stream, &ParserOptions::default()).is_err());
    }

    #[test]
    fn test_short_header_keeps_valid_pairs() {
        let stream = object_stream("10 0 ", "42", 3);
        let objstm = ObjectStream::parse(&stream, &ParserOptions::default()).unwrap();
        assert_eq!(objstm.len(), 1);
        assert_eq!(objstm.get(0).unwrap().1, Value::Integer(42));
    }
}

//! PDF object parser.
//!
//! [`ObjectReader`] combines tokens from a [`Lexer`] into complete values
//! (arrays, dictionaries, streams, indirect objects) by recursive descent.
//! Escapes in literal and hex strings are decoded here.

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::object::{Dict, ObjectRef, Value};
use crate::parser_config::ParserOptions;

/// Decode escape sequences in PDF literal strings.
///
/// Supported: `\n \r \t \b \f \( \) \\`, octal `\ddd` (1-3 digits) and
/// backslash-newline line continuations. Unknown escapes keep the backslash.
///
/// ```
/// # use pdftext::parser::decode_literal_string_escapes;
/// let decoded = decode_literal_string_escapes(b"Section \\247 71.01");
/// assert_eq!(decoded, b"Section \xa7 71.01");
/// ```
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }

        match raw[i + 1] {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(8),
            b'f' => result.push(12),
            b'(' => result.push(b'('),
            b')' => result.push(b')'),
            b'\\' => result.push(b'\\'),
            b'\n' => {},
            b'\r' => {
                if raw.get(i + 2) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let digits = raw[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|d| (b'0'..=b'7').contains(*d))
                    .fold((0u32, 0usize), |(v, n), &d| (v * 8 + (d - b'0') as u32, n + 1));
                result.push((digits.0 & 0xFF) as u8);
                i += 1 + digits.1;
                continue;
            },
            _ => {
                result.push(b'\\');
                i += 1;
                continue;
            },
        }
        i += 2;
    }

    result
}

/// Decode a hex string body to bytes.
///
/// Whitespace is ignored. An odd final digit is padded with 0.
///
/// ```
/// use pdftext::parser::decode_hex;
///
/// assert_eq!(decode_hex(b"48656C6C6F").unwrap(), b"Hello");
/// assert_eq!(decode_hex(b"901FA").unwrap(), vec![0x90, 0x1F, 0xA0]);
/// ```
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .filter(|c| !c.is_ascii_whitespace() && **c != 0)
        .map(|&c| {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| Error::syntax(0, format!("invalid hex digit '{}'", c as char)))
        })
        .collect::<Result<_>>()?;

    Ok(digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect())
}

/// Parse a single object from `input`, with object pointers recognised.
///
/// ```
/// use pdftext::parser::parse_object;
///
/// let obj = parse_object(b"[ 1 2 /Name ]").unwrap();
/// assert_eq!(obj.as_array().map(Vec::len), Some(3));
/// ```
pub fn parse_object(input: &[u8]) -> Result<Value> {
    ObjectReader::new(Lexer::new(input)).read_object()
}

/// Recursive-descent reader of PDF values.
pub struct ObjectReader<'a> {
    lexer: Lexer<'a>,
    max_nesting: usize,
    allow_missing_endobj: bool,
    length_resolver: Option<&'a dyn Fn(ObjectRef) -> Option<i64>>,
}

impl<'a> ObjectReader<'a> {
    /// Reader over `lexer` with lenient default options.
    pub fn new(lexer: Lexer<'a>) -> Self {
        let options = ParserOptions::default();
        Self {
            lexer,
            max_nesting: options.max_nesting,
            allow_missing_endobj: !options.strict,
            length_resolver: None,
        }
    }

    /// Apply nesting and `endobj` leniency settings from `options`.
    pub fn with_options(mut self, options: &ParserOptions) -> Self {
        self.max_nesting = options.max_nesting;
        self.allow_missing_endobj = !options.strict;
        self
    }

    /// Resolver for indirect `/Length` values of streams.
    pub fn with_length_resolver(mut self, resolver: &'a dyn Fn(ObjectRef) -> Option<i64>) -> Self {
        self.length_resolver = Some(resolver);
        self
    }

    /// Next raw token from the underlying lexer.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        self.lexer.next_token()
    }

    /// Push a token back to the underlying lexer.
    pub fn push_back(&mut self, tok: Token<'a>) -> Result<()> {
        self.lexer.push_back(tok)
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    /// Read one complete value.
    pub fn read_object(&mut self) -> Result<Value> {
        let tok = self.lexer.next_token()?;
        self.read_value(tok, 0)
    }

    /// Read a `num gen obj ... endobj` envelope.
    pub fn read_indirect_object(&mut self) -> Result<(ObjectRef, Value)> {
        let header = match self.lexer.next_token()? {
            Token::ObjHeader(r) => r,
            other => {
                return Err(Error::syntax(
                    self.lexer.position(),
                    format!("expected object header, found {:?}", other),
                ));
            },
        };

        let value = self.read_object()?;

        match self.lexer.next_token() {
            Ok(tok) if tok.is_keyword("endobj") => {},
            found if self.allow_missing_endobj => {
                log::warn!(
                    "Object {} missing 'endobj' (found {:?}), continuing",
                    header,
                    found.as_ref().map_err(|e| e.to_string())
                );
            },
            _ => {
                return Err(Error::syntax(
                    self.lexer.position(),
                    format!("object {} missing endobj", header),
                ));
            },
        }

        Ok((header, value))
    }

    fn read_value(&mut self, tok: Token<'a>, depth: usize) -> Result<Value> {
        if depth > self.max_nesting {
            return Err(Error::syntax(
                self.lexer.position(),
                format!("nesting deeper than {}", self.max_nesting),
            ));
        }

        match tok {
            Token::Null => Ok(Value::Null),
            Token::True => Ok(Value::Boolean(true)),
            Token::False => Ok(Value::Boolean(false)),
            Token::Integer(i) => Ok(Value::Integer(i)),
            Token::Real(r) => Ok(Value::Real(r)),
            Token::Name(name) => Ok(Value::Name(name)),
            Token::Reference(r) => Ok(Value::Reference(r)),
            Token::LiteralString(bytes) => Ok(Value::String(decode_literal_string_escapes(bytes))),
            Token::HexString(bytes) => decode_hex(bytes).map(Value::String).map_err(|_| {
                Error::syntax(self.lexer.position(), "invalid hex string")
            }),
            Token::ArrayStart => self.read_array(depth),
            Token::DictStart => self.read_dict_or_stream(depth),
            Token::Eof => Err(Error::UnexpectedEof),
            Token::Keyword(kw) => Err(Error::syntax(
                self.lexer.position(),
                format!("unexpected keyword '{}'", kw),
            )),
            other => Err(Error::syntax(
                self.lexer.position(),
                format!("unexpected token {:?}", other),
            )),
        }
    }

    fn read_array(&mut self, depth: usize) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.lexer.next_token()? {
                Token::ArrayEnd => return Ok(Value::Array(items)),
                Token::Eof => return Err(Error::UnexpectedEof),
                tok => items.push(self.read_value(tok, depth + 1)?),
            }
        }
    }

    fn read_dict_or_stream(&mut self, depth: usize) -> Result<Value> {
        let mut dict = Dict::new();
        loop {
            match self.lexer.next_token()? {
                Token::DictEnd => break,
                Token::Eof => return Err(Error::UnexpectedEof),
                Token::Name(key) => {
                    let tok = self.lexer.next_token()?;
                    let value = self.read_value(tok, depth + 1)?;
                    dict.insert(key, value);
                },
                other => {
                    return Err(Error::syntax(
                        self.lexer.position(),
                        format!("dictionary key must be a name, found {:?}", other),
                    ));
                },
            }
        }

        if !self.lexer.allows_stream() || !self.lexer.peek_keyword("stream") {
            return Ok(Value::Dict(dict));
        }
        self.lexer.next_token()?;

        let length = match dict.get("Length") {
            Some(Value::Integer(n)) => usize::try_from(*n).ok(),
            Some(Value::Reference(r)) => {
                let resolved = self.length_resolver.and_then(|resolve| resolve(*r));
                if resolved.is_none() {
                    log::debug!("Indirect stream /Length {} unavailable, scanning", r);
                }
                resolved.and_then(|n| usize::try_from(n).ok())
            },
            _ => None,
        };

        let body = self.lexer.read_stream_body(length)?;
        Ok(Value::Stream {
            dict,
            data: bytes::Bytes::copy_from_slice(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Value {
        Value::Name(s.to_string())
    }

    // ========================================================================
    // Primitive Type Tests
    // ========================================================================

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_object(b"null").unwrap(), Value::Null);
        assert_eq!(parse_object(b"true").unwrap(), Value::Boolean(true));
        assert_eq!(parse_object(b"-123").unwrap(), Value::Integer(-123));
        assert_eq!(parse_object(b"2.5").unwrap(), Value::Real(2.5));
        assert_eq!(parse_object(b"/Type").unwrap(), name("Type"));
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!(parse_object(b"(Hello)").unwrap(), Value::String(b"Hello".to_vec()));
        assert_eq!(parse_object(b"<48656C6C6F>").unwrap(), Value::String(b"Hello".to_vec()));
        assert_eq!(parse_object(b"<>").unwrap(), Value::String(Vec::new()));
    }

    // ========================================================================
    // Escape Sequence Tests
    // ========================================================================

    #[test]
    fn test_escape_sequences_simple() {
        assert_eq!(decode_literal_string_escapes(b"a\\nb\\tc"), b"a\nb\tc");
        assert_eq!(decode_literal_string_escapes(b"\\(x\\)\\\\"), b"(x)\\");
        assert_eq!(decode_literal_string_escapes(b"\\b\\f"), &[8, 12]);
    }

    #[test]
    fn test_escape_sequence_octal() {
        assert_eq!(decode_literal_string_escapes(b"\\101"), b"A");
        assert_eq!(decode_literal_string_escapes(b"\\53"), b"+");
        assert_eq!(decode_literal_string_escapes(b"\\0a"), b"\0a");
        assert_eq!(decode_literal_string_escapes(b"\\1018"), b"A8");
    }

    #[test]
    fn test_escape_sequence_line_continuation() {
        assert_eq!(decode_literal_string_escapes(b"ab\\\ncd"), b"abcd");
        assert_eq!(decode_literal_string_escapes(b"ab\\\r\ncd"), b"abcd");
    }

    #[test]
    fn test_unknown_escape_keeps_backslash() {
        assert_eq!(decode_literal_string_escapes(b"\\q"), b"\\q");
    }

    #[test]
    fn test_decode_hex_odd_length() {
        assert_eq!(decode_hex(b"4 8 6").unwrap(), vec![0x48, 0x60]);
    }

    // ========================================================================
    // Composite Tests
    // ========================================================================

    #[test]
    fn test_parse_array_with_references() {
        let obj = parse_object(b"[1 0 R 2 0 R 7]").unwrap();
        assert_eq!(
            obj,
            Value::Array(vec![
                Value::Reference(ObjectRef::new(1, 0)),
                Value::Reference(ObjectRef::new(2, 0)),
                Value::Integer(7),
            ])
        );
    }

    #[test]
    fn test_parse_nested_dictionaries() {
        let obj = parse_object(b"<< /Type /Page /Res << /Font << /F1 5 0 R >> >> >>").unwrap();
        let font = obj
            .get("Res")
            .and_then(|r| r.get("Font"))
            .and_then(|f| f.get("F1"))
            .and_then(Value::as_reference);
        assert_eq!(font, Some(ObjectRef::new(5, 0)));
        assert_eq!(obj.get("Type"), Some(&name("Page")));
    }

    #[test]
    fn test_parse_unclosed_array() {
        assert!(matches!(parse_object(b"[1 2"), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_parse_dictionary_non_name_key() {
        assert!(matches!(parse_object(b"<< 1 2 >>"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_keyword_inside_object_is_error() {
        assert!(matches!(parse_object(b"[1 Tj]"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_nesting_limit() {
        let mut input = vec![b'['; 200];
        input.extend(vec![b']'; 200]);
        let mut options = ParserOptions::default();
        options.max_nesting = 50;
        let mut reader = ObjectReader::new(Lexer::new(&input)).with_options(&options);
        assert!(matches!(reader.read_object(), Err(Error::Syntax { .. })));
    }

    // ========================================================================
    // Indirect Object Tests
    // ========================================================================

    #[test]
    fn test_read_indirect_stream() {
        let input = b"4 0 obj\n<< /Length 5 >>\nstream\nHello\nendstream\nendobj\n";
        let mut reader = ObjectReader::new(Lexer::new(input));
        let (r, value) = reader.read_indirect_object().unwrap();
        assert_eq!(r, ObjectRef::new(4, 0));
        match value {
            Value::Stream { data, .. } => assert_eq!(&data[..], b"Hello"),
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_read_indirect_stream_with_indirect_length() {
        let input = b"4 0 obj << /Length 9 0 R >> stream\nabc\nendstream endobj";
        let resolve = |r: ObjectRef| if r.id == 9 { Some(3) } else { None };
        let mut reader = ObjectReader::new(Lexer::new(input)).with_length_resolver(&resolve);
        let (_, value) = reader.read_indirect_object().unwrap();
        match value {
            Value::Stream { data, .. } => assert_eq!(&data[..], b"abc"),
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_endobj_lenient_and_strict() {
        let input = b"1 0 obj 42 2 0 obj";
        let mut lenient = ObjectReader::new(Lexer::new(input));
        assert_eq!(lenient.read_indirect_object().unwrap().1, Value::Integer(42));

        let mut strict = ObjectReader::new(Lexer::new(input)).with_options(&ParserOptions::strict());
        assert!(strict.read_indirect_object().is_err());
    }

    #[test]
    fn test_stream_not_read_when_disabled() {
        let input = b"<< /A 1 >> stream";
        let mut reader = ObjectReader::new(Lexer::new(input).allow_stream(false));
        assert!(matches!(reader.read_object().unwrap(), Value::Dict(_)));
        assert!(reader.next_token().unwrap().is_keyword("stream"));
    }
}

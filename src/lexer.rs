//! PDF lexer (tokenizer).
//!
//! Low-level tokenization of PDF byte streams and of the PostScript subset used
//! by CMaps and content streams.
//!
//! The free function [`token`] recognises one raw token with `nom`. [`Lexer`]
//! wraps it with position tracking, a single push-back slot, recognition of
//! `num gen R` / `num gen obj`, and stream body extraction.
//!
//! Whitespace (space, \t, \r, \n, \0, \f) and comments (% to EOL) are skipped.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{map, value},
    sequence::preceded,
};

use crate::error::{Error, Result};
use crate::object::ObjectRef;

/// Token types recognized by the PDF lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),

    /// Real (floating-point) number (e.g., 3.14, -2.5, .5)
    Real(f64),

    /// Literal string bytes, escapes not yet decoded
    LiteralString(&'a [u8]),

    /// Hexadecimal string digits, whitespace preserved
    HexString(&'a [u8]),

    /// Name with `#XX` escapes decoded (e.g., "Type" from "/Type")
    Name(String),

    /// Boolean true keyword
    True,

    /// Boolean false keyword
    False,

    /// Null keyword
    Null,

    /// Array start delimiter [
    ArrayStart,

    /// Array end delimiter ]
    ArrayEnd,

    /// Dictionary start delimiter <<
    DictStart,

    /// Dictionary end delimiter >>
    DictEnd,

    /// Any other bare word: `obj`, `endobj`, `stream`, `R`, operators,
    /// `{` and `}`
    Keyword(String),

    /// `num gen R`, only produced when object pointers are allowed
    Reference(ObjectRef),

    /// `num gen obj`, only produced when object pointers are allowed
    ObjHeader(ObjectRef),

    /// End of input, only produced when end of input is allowed
    Eof,
}

impl Token<'_> {
    /// True for a [`Token::Keyword`] equal to `kw`.
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == kw)
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

fn is_delimiter(c: u8) -> bool {
    matches!(c, b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}')
}

fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

/// Parse whitespace characters; at least one is required.
fn whitespace(input: &[u8]) -> IResult<&[u8], ()> {
    value((), take_while1(is_whitespace))(input)
}

/// Parse a comment (% to end of line).
fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip all whitespace and comments. Never fails.
fn skip_ws(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let mut remaining = input;

    loop {
        if let Ok((rest, _)) = whitespace(remaining) {
            remaining = rest;
            continue;
        }
        if let Ok((rest, _)) = comment(remaining) {
            remaining = rest;
            continue;
        }
        break;
    }

    Ok((remaining, input))
}

/// Parse a literal string enclosed in balanced parentheses.
///
/// The raw bytes are returned with escapes intact; the object reader decodes
/// them. Running out of input before the closing parenthesis is reported as
/// `Incomplete`.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (remaining, _) = char('(')(input)?;
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        match remaining[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    if depth != 0 || pos > remaining.len() {
        return Err(nom::Err::Incomplete(nom::Needed::Unknown));
    }

    let content = &remaining[..pos - 1];
    Ok((&remaining[pos..], Token::LiteralString(content)))
}

/// Parse a hexadecimal string enclosed in angle brackets.
///
/// Only hex digits and whitespace may appear inside. A missing `>` at end of
/// input is `Incomplete`.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }
    let (rest, _) = char('<')(input)?;
    let (rest, digits) = take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c))(rest)?;
    if rest.is_empty() {
        return Err(nom::Err::Incomplete(nom::Needed::new(1)));
    }
    let (rest, _) = char('>')(rest)?;
    Ok((rest, Token::HexString(digits)))
}

/// Decode #XX escape sequences in PDF names.
///
/// Invalid sequences are preserved literally.
///
/// ```
/// # use pdftext::lexer::decode_name_escapes;
/// assert_eq!(decode_name_escapes("A#20B#23C"), "A B#C");
/// assert_eq!(decode_name_escapes("Type"), "Type");
/// assert_eq!(decode_name_escapes("A#"), "A#");
/// ```
pub fn decode_name_escapes(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars();

    while let Some(ch) = chars.next() {
        if ch != '#' {
            result.push(ch);
            continue;
        }
        match (chars.next(), chars.next()) {
            (Some(h1), Some(h2)) => match (h1.to_digit(16), h2.to_digit(16)) {
                (Some(hi), Some(lo)) => result.push(char::from((hi * 16 + lo) as u8)),
                _ => {
                    result.push('#');
                    result.push(h1);
                    result.push(h2);
                },
            },
            (Some(h1), None) => {
                result.push('#');
                result.push(h1);
            },
            _ => result.push('#'),
        }
    }

    result
}

/// Parse a name starting with /.
fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(take_while(is_regular), |bytes| {
            Token::Name(decode_name_escapes(&String::from_utf8_lossy(bytes)))
        }),
    )(input)
}

/// Parse structural delimiters. `<<` and `>>` are checked before the
/// single-character forms.
fn parse_delimiter(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
        map(tag(b"{"), |_| Token::Keyword("{".to_string())),
        map(tag(b"}"), |_| Token::Keyword("}".to_string())),
    ))(input)
}

/// A word that begins like a number: a digit, or a sign or point followed by
/// a digit or point.
fn looks_numeric(word: &[u8]) -> bool {
    match word {
        [first, ..] if first.is_ascii_digit() => true,
        [b'+' | b'-' | b'.', second, ..] => second.is_ascii_digit() || *second == b'.',
        _ => false,
    }
}

/// Parse a numeric word: `[+-]? digits? (. digits?)?` with at least one digit.
///
/// Integers that do not fit in `i64` are returned as reals.
fn parse_number_word(word: &[u8]) -> Option<Token<'static>> {
    let (negative, body) = match word.first() {
        Some(b'-') => (true, &word[1..]),
        Some(b'+') => (false, &word[1..]),
        _ => (false, word),
    };
    let (int_part, frac_part) = match body.iter().position(|&c| c == b'.') {
        Some(dot) => (&body[..dot], Some(&body[dot + 1..])),
        None => (body, None),
    };
    let all_digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.map_or(true, <[u8]>::is_empty) {
        return None;
    }

    let int_str = std::str::from_utf8(int_part).ok()?;
    let sign = if negative { "-" } else { "" };
    match frac_part {
        None => match int_str.parse::<i64>() {
            Ok(n) => Some(Token::Integer(if negative { -n } else { n })),
            Err(_) => format!("{}{}", sign, int_str).parse().ok().map(Token::Real),
        },
        Some(frac) => {
            let frac_str = std::str::from_utf8(frac).ok()?;
            let int_str = if int_str.is_empty() { "0" } else { int_str };
            let frac_str = if frac_str.is_empty() { "0" } else { frac_str };
            format!("{}{}.{}", sign, int_str, frac_str)
                .parse()
                .ok()
                .map(Token::Real)
        },
    }
}

/// Parse a bare word and classify it as a boolean, null, number or keyword.
///
/// A word that looks numeric but does not parse is a `Failure`, so the caller
/// can report a syntax error instead of a keyword.
fn parse_word(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, word) = take_while1(is_regular)(input)?;
    let tok = match word {
        b"true" => Token::True,
        b"false" => Token::False,
        b"null" => Token::Null,
        _ if looks_numeric(word) => parse_number_word(word).ok_or_else(|| {
            nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?,
        _ => Token::Keyword(String::from_utf8_lossy(word).into_owned()),
    };
    Ok((rest, tok))
}

/// Parse a single PDF token after skipping whitespace and comments.
///
/// Object pointers are not recognised here; see [`Lexer`].
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = skip_ws(input)?;

    alt((
        parse_delimiter,
        parse_name,
        parse_literal_string,
        parse_hex_string,
        parse_word,
    ))(input)
}

/// Lookahead for the ` gen R` or ` gen obj` tail of an object pointer.
/// Returns the generation and whether the keyword was `obj`.
fn objptr_tail(input: &[u8]) -> IResult<&[u8], (u16, bool)> {
    let (rest, _) = whitespace(input)?;
    let (rest, _) = skip_ws(rest)?;
    let (rest, gen) = digit1(rest)?;
    let (rest, _) = skip_ws(rest)?;
    let (rest, word) = take_while1(is_regular)(rest)?;

    let gen: u16 = std::str::from_utf8(gen)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    match word {
        b"R" => Ok((rest, (gen, false))),
        b"obj" => Ok((rest, (gen, true))),
        _ => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))),
    }
}

/// Stateful tokenizer over an in-memory buffer.
///
/// Positions are absolute offsets into the buffer the lexer was created with.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    pushed: Option<Token<'a>>,
    allow_eof: bool,
    allow_objptr: bool,
    allow_stream: bool,
}

impl<'a> Lexer<'a> {
    /// Lexer at the start of `input` with object pointers and streams allowed
    /// and end of input treated as an error.
    pub fn new(input: &'a [u8]) -> Self {
        Self::at(input, 0)
    }

    /// Lexer starting at absolute offset `pos` of `input`.
    pub fn at(input: &'a [u8], pos: usize) -> Self {
        Self {
            input,
            pos: pos.min(input.len()),
            pushed: None,
            allow_eof: false,
            allow_objptr: true,
            allow_stream: true,
        }
    }

    /// Whether end of input yields [`Token::Eof`] instead of an error.
    pub fn allow_eof(mut self, allow: bool) -> Self {
        self.allow_eof = allow;
        self
    }

    /// Whether `num gen R` and `num gen obj` are recognised.
    pub fn allow_objptr(mut self, allow: bool) -> Self {
        self.allow_objptr = allow;
        self
    }

    /// Whether a stream body may follow a dictionary.
    pub fn allow_stream(mut self, allow: bool) -> Self {
        self.allow_stream = allow;
        self
    }

    /// Whether stream bodies are enabled.
    pub fn allows_stream(&self) -> bool {
        self.allow_stream
    }

    /// Current absolute offset. A pushed-back token is not accounted for.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the pushed-back token if any, else read the next one.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        if let Some(tok) = self.pushed.take() {
            return Ok(tok);
        }
        self.read_token()
    }

    /// Hold `tok` so the next [`next_token`](Self::next_token) returns it.
    ///
    /// The slot holds one token; a second push-back is rejected.
    pub fn push_back(&mut self, tok: Token<'a>) -> Result<()> {
        if self.pushed.is_some() {
            return Err(Error::PushBackOccupied);
        }
        self.pushed = Some(tok);
        Ok(())
    }

    /// True if the next token is the keyword `kw`. Nothing is consumed.
    pub fn peek_keyword(&self, kw: &str) -> bool {
        if let Some(tok) = &self.pushed {
            return tok.is_keyword(kw);
        }
        matches!(token(&self.input[self.pos..]), Ok((_, tok)) if tok.is_keyword(kw))
    }

    fn read_token(&mut self) -> Result<Token<'a>> {
        let input: &'a [u8] = self.input;
        let (rest, _) = skip_ws(&input[self.pos..]).map_err(|_| Error::UnexpectedEof)?;
        self.pos = input.len() - rest.len();

        if rest.is_empty() {
            return if self.allow_eof {
                Ok(Token::Eof)
            } else {
                Err(Error::UnexpectedEof)
            };
        }

        let (after, tok) = match token(rest) {
            Ok(ok) => ok,
            Err(nom::Err::Incomplete(_)) => return Err(Error::UnexpectedEof),
            Err(nom::Err::Failure(_)) => {
                return Err(Error::syntax(self.pos, "malformed number"));
            },
            Err(nom::Err::Error(_)) => {
                return Err(Error::syntax(
                    self.pos,
                    format!("unexpected byte 0x{:02X}", rest[0]),
                ));
            },
        };
        self.pos = input.len() - after.len();

        if let Token::Integer(num) = tok {
            if self.allow_objptr {
                if let Ok(id) = u32::try_from(num) {
                    if let Ok((tail_rest, (gen, is_obj))) = objptr_tail(after) {
                        self.pos = input.len() - tail_rest.len();
                        let r = ObjectRef::new(id, gen);
                        return Ok(if is_obj {
                            Token::ObjHeader(r)
                        } else {
                            Token::Reference(r)
                        });
                    }
                }
            }
        }

        Ok(tok)
    }

    /// Read a stream body. Call right after the `stream` keyword.
    ///
    /// With a declared length the body is taken verbatim when `endstream`
    /// follows it; otherwise the input is scanned for `endstream` and one
    /// trailing EOL is dropped. The `endstream` keyword is consumed.
    pub fn read_stream_body(&mut self, declared_len: Option<usize>) -> Result<&'a [u8]> {
        let input: &'a [u8] = self.input;
        let mut start = self.pos;

        if input[start..].starts_with(b"\r\n") {
            start += 2;
        } else if input[start..].starts_with(b"\n") {
            start += 1;
        } else if input[start..].starts_with(b"\r") {
            log::warn!("Stream at byte {} uses bare CR after 'stream' keyword", start);
            start += 1;
        }

        if let Some(len) = declared_len {
            if let Some(end) = start.checked_add(len).filter(|&end| end <= input.len()) {
                let (after, _) = skip_ws(&input[end..]).unwrap_or((&input[end..], &[]));
                if after.starts_with(b"endstream") {
                    self.pos = input.len() - after.len() + b"endstream".len();
                    return Ok(&input[start..end]);
                }
            }
            log::warn!(
                "Stream at byte {} has /Length {} not followed by endstream, scanning",
                start,
                len
            );
        }

        let idx = find_endstream(&input[start..]).ok_or(Error::UnexpectedEof)?;
        let mut end = start + idx;
        if input[start..end].ends_with(b"\r\n") {
            end -= 2;
        } else if input[start..end].ends_with(b"\n") || input[start..end].ends_with(b"\r") {
            end -= 1;
        }
        self.pos = start + idx + b"endstream".len();
        Ok(&input[start..end])
    }
}

/// Offset of the first `endstream` in `data`.
fn find_endstream(data: &[u8]) -> Option<usize> {
    data.windows(b"endstream".len()).position(|w| w == b"endstream")
}

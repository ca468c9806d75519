//! Tokenizer and object reader over whole inputs.

use pdftext::lexer::{Lexer, Token};
use pdftext::parser::{parse_object, ObjectReader};
use pdftext::{Error, ObjectRef, Value};
use proptest::prelude::*;

fn tokens(input: &[u8]) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(input).allow_eof(true);
    let mut out = Vec::new();
    loop {
        match lexer.next_token().expect("tokenize") {
            Token::Eof => return out,
            tok => out.push(tok),
        }
    }
}

#[test]
fn test_content_stream_tokens() {
    let toks = tokens(b"BT /F1 12 Tf 72 712 Td (Hi) Tj [(A) -120 (B)] TJ ET");
    assert_eq!(toks.len(), 16);
    assert_eq!(toks[0], Token::Keyword("BT".to_string()));
    assert_eq!(toks[1], Token::Name("F1".to_string()));
    assert_eq!(toks[7], Token::LiteralString(b"Hi"));
    assert_eq!(toks[10], Token::LiteralString(b"A"));
    assert_eq!(toks[11], Token::Integer(-120));
    assert_eq!(toks[15], Token::Keyword("ET".to_string()));
}

#[test]
fn test_object_pointers_in_context() {
    let toks = tokens(b"7 0 obj << /Parent 3 0 R /Kids [4 0 R 5 0 R] >> endobj");
    assert_eq!(toks[0], Token::ObjHeader(ObjectRef::new(7, 0)));
    assert_eq!(toks[3], Token::Reference(ObjectRef::new(3, 0)));
    assert!(toks.iter().any(|t| t.is_keyword("endobj")));
}

#[test]
fn test_pushback_round_trip() {
    let mut lexer = Lexer::new(b"1 2 3").allow_objptr(false);
    let one = lexer.next_token().unwrap();
    lexer.push_back(one.clone()).unwrap();
    assert!(matches!(lexer.push_back(Token::Null), Err(Error::PushBackOccupied)));
    assert_eq!(lexer.next_token().unwrap(), one);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
}

#[test]
fn test_eof_without_allowance_is_error() {
    let mut lexer = Lexer::new(b"   % only a comment");
    assert!(matches!(lexer.next_token(), Err(Error::UnexpectedEof)));
}

#[test]
fn test_reader_builds_nested_values() {
    let value = parse_object(b"<< /A [1 2.5 (x) <414243>] /B << /C true /D null >> /E 9 0 R >>").unwrap();
    let a = value.get("A").and_then(Value::as_array).expect("array /A");
    assert_eq!(a[1], Value::Real(2.5));
    assert_eq!(a[3], Value::String(b"ABC".to_vec()));
    assert_eq!(value.get("B").and_then(|b| b.get("C")), Some(&Value::Boolean(true)));
    assert_eq!(value.get("E"), Some(&Value::Reference(ObjectRef::new(9, 0))));
}

#[test]
fn test_reader_reads_consecutive_objects() {
    let mut reader = ObjectReader::new(Lexer::new(b"/One (two) [3]").allow_eof(true));
    assert_eq!(reader.read_object().unwrap(), Value::Name("One".to_string()));
    assert_eq!(reader.read_object().unwrap(), Value::String(b"two".to_vec()));
    assert_eq!(reader.read_object().unwrap(), Value::Array(vec![Value::Integer(3)]));
}

proptest! {
    #[test]
    fn lexer_never_panics(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut lexer = Lexer::new(&input).allow_eof(true);
        for _ in 0..512 {
            match lexer.next_token() {
                Ok(Token::Eof) | Err(_) => break,
                Ok(_) => {},
            }
        }
    }

    #[test]
    fn reader_never_panics(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse_object(&input);
    }

    #[test]
    fn integers_tokenize_exactly(n in -1_000_000_000_000i64..1_000_000_000_000) {
        let text = n.to_string();
        let mut lexer = Lexer::new(text.as_bytes()).allow_objptr(false);
        prop_assert_eq!(lexer.next_token().unwrap(), Token::Integer(n));
    }
}

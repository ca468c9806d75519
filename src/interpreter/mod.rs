//! Interpreter for the restricted PostScript found in PDF files.
//!
//! CMap programs and page content streams share one execution model: operands
//! are pushed on a [`Stack`], and each operator keyword is handed to an
//! [`OperatorHandler`] that pops what it needs. The interpreter itself only
//! implements dictionary scoping:
//!
//! | Keyword | Effect |
//! |---------|--------|
//! | `dict` | pop the capacity, push a new empty dictionary |
//! | `currentdict` | push a copy of the innermost open dictionary |
//! | `begin` | pop a dictionary and open a copy of it as a scope |
//! | `end` | close the innermost scope |
//! | `def` | pop value and name, bind them in the innermost scope |
//! | `pop` | discard the top of the stack |
//!
//! Any other keyword is looked up in the open scopes, innermost first. A
//! binding is pushed as an operand; an unbound keyword goes to the handler.
//!
//! Dictionaries are values, not shared references. A `def` inside a scope
//! opened with `begin` changes only that scope, never the dictionary that was
//! popped or any other copy of it, and a dictionary pushed by `currentdict`
//! does not see later `def`s.
//! Procedures, executable arrays and control flow are not supported.

mod seq_reader;
mod stack;

pub use seq_reader::SeqReader;
pub use stack::Stack;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::object::{Dict, Value};
use crate::parser::ObjectReader;
use crate::parser_config::ParserOptions;
use std::io::{Cursor, Read};

/// Executes the operators the interpreter does not handle itself.
///
/// Content-stream text extraction and CMap loading each provide one.
/// Closures of the form `FnMut(&mut Stack, &str) -> Result<bool>` implement
/// it directly.
pub trait OperatorHandler {
    /// Run `op` against `stack`.
    ///
    /// `Ok(true)` continues, `Ok(false)` stops the program successfully and
    /// an error aborts it.
    fn handle(&mut self, stack: &mut Stack, op: &str) -> Result<bool>;
}

impl<F> OperatorHandler for F
where
    F: FnMut(&mut Stack, &str) -> Result<bool>,
{
    fn handle(&mut self, stack: &mut Stack, op: &str) -> Result<bool> {
        self(stack, op)
    }
}

/// Run `program` (a stream, or an array of streams) with default options.
///
/// # Example
///
/// ```
/// use pdftext::interpreter::{interpret_bytes, Stack};
/// use pdftext::{Result, Value};
///
/// let mut seen = Vec::new();
/// interpret_bytes(b"1 2 add", &mut |stack: &mut Stack, op: &str| -> Result<bool> {
///     let b = stack.pop();
///     let a = stack.pop();
///     seen.push((op.to_string(), a, b));
///     Ok(true)
/// })?;
/// assert_eq!(seen[0].0, "add");
/// assert_eq!(seen[0].1, Value::Integer(1));
/// # Ok::<(), pdftext::Error>(())
/// ```
pub fn interpret<H>(program: &Value, handler: &mut H) -> Result<()>
where
    H: OperatorHandler + ?Sized,
{
    interpret_with_options(program, &ParserOptions::default(), handler)
}

/// Run `program` with the decode limits from `options`.
pub fn interpret_with_options<H>(program: &Value, options: &ParserOptions, handler: &mut H) -> Result<()>
where
    H: OperatorHandler + ?Sized,
{
    let source = program_source(program, options)?;
    interpret_bytes(&source, handler)
}

/// Run an already decoded program.
pub fn interpret_bytes<H>(source: &[u8], handler: &mut H) -> Result<()>
where
    H: OperatorHandler + ?Sized,
{
    let lexer = Lexer::new(source)
        .allow_eof(true)
        .allow_objptr(false)
        .allow_stream(false);
    let mut reader = ObjectReader::new(lexer);
    let mut stack = Stack::new();
    let mut scopes: Vec<Dict> = Vec::new();

    loop {
        let op = match reader.next_token()? {
            Token::Eof => return Ok(()),
            Token::Keyword(kw) => kw,
            operand => {
                reader.push_back(operand)?;
                let value = reader.read_object()?;
                stack.push(value);
                continue;
            },
        };

        match op.as_str() {
            "dict" => {
                stack.pop();
                stack.push(Value::Dict(Dict::new()));
            },
            "currentdict" => {
                let current = scopes.last().ok_or(Error::NoCurrentDict)?;
                stack.push(Value::Dict(current.clone()));
            },
            "begin" => match stack.pop() {
                Value::Dict(dict) => scopes.push(dict),
                other => return Err(Error::BeginOnNonDict(other.type_name())),
            },
            "end" => {
                scopes.pop().ok_or(Error::UnbalancedEnd)?;
            },
            "def" => {
                let scope = scopes.last_mut().ok_or(Error::DefWithoutOpenDict)?;
                let value = stack.pop();
                match stack.pop() {
                    Value::Name(key) => {
                        scope.insert(key, value);
                    },
                    other => log::warn!("def with {} key, skipping", other.type_name()),
                }
            },
            "pop" => {
                stack.pop();
            },
            _ => {
                if let Some(bound) = scopes.iter().rev().find_map(|scope| scope.get(op.as_str())) {
                    stack.push(bound.clone());
                    continue;
                }
                if !handler.handle(&mut stack, &op)? {
                    return Ok(());
                }
            },
        }
    }
}

/// Decoded bytes of a program. Arrays are joined with a newline between
/// streams and read through a [`SeqReader`].
fn program_source(program: &Value, options: &ParserOptions) -> Result<Vec<u8>> {
    match program {
        Value::Stream { .. } => program.decode_stream_data_with_options(options),
        Value::Array(parts) => {
            let mut joined: Box<dyn Read> = Box::new(std::io::empty());
            for (i, part) in parts.iter().enumerate() {
                if !matches!(part, Value::Stream { .. }) {
                    return Err(Error::NotStreamOrArray(part.type_name()));
                }
                let data = part.decode_stream_data_with_options(options)?;
                if i > 0 {
                    joined = Box::new(joined.chain(&b"\n"[..]));
                }
                joined = Box::new(joined.chain(Cursor::new(data)));
            }
            SeqReader::new(joined).read_to_end()
        },
        other => Err(Error::NotStreamOrArray(other.type_name())),
    }
}

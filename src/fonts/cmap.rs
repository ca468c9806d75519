//! ToUnicode CMaps.
//!
//! A CMap is a small PostScript program. It is run through the
//! [interpreter](crate::interpreter) with a handler that collects code space
//! ranges and `bfchar`/`bfrange` mappings:
//!
//! ```text
//! /CIDInit /ProcSet findresource begin
//! 12 dict begin
//! begincmap
//! 1 begincodespacerange <00> <FF> endcodespacerange
//! 1 beginbfchar <01> <0041> endbfchar
//! 1 beginbfrange <10> <12> <0061> endbfrange
//! endcmap
//! CMapName currentdict /CMap defineresource pop
//! end end
//! ```

use crate::error::{Error, Result};
use crate::interpreter::{interpret, interpret_bytes, OperatorHandler, Stack};
use crate::object::{Dict, Value};

const NO_CHAR: char = '\u{FFFD}';

/// Longest code, in bytes.
const MAX_CODE_LEN: usize = 4;

/// Inclusive range of codes of one byte width.
#[derive(Debug, Clone, PartialEq)]
struct CodeRange {
    lo: Vec<u8>,
    hi: Vec<u8>,
}

impl CodeRange {
    fn contains(&self, code: &[u8]) -> bool {
        self.lo.as_slice() <= code && code <= self.hi.as_slice()
    }
}

/// Source range mapped to a destination string or array.
#[derive(Debug, Clone, PartialEq)]
struct BfRange {
    range: CodeRange,
    dst: Value,
}

/// Code to Unicode mapping read from a ToUnicode CMap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CMap {
    /// Code space ranges, indexed by code width minus one
    codespaces: [Vec<CodeRange>; MAX_CODE_LEN],
    bfranges: Vec<BfRange>,
}

impl CMap {
    /// Run a CMap stream (or array of streams).
    pub fn from_program(program: &Value) -> Result<Self> {
        let mut builder = CMapBuilder::default();
        interpret(program, &mut builder)?;
        Ok(builder.cmap)
    }

    /// Run already decoded CMap source.
    pub fn parse(source: &[u8]) -> Result<Self> {
        let mut builder = CMapBuilder::default();
        interpret_bytes(source, &mut builder)?;
        Ok(builder.cmap)
    }

    /// True when no code space was declared.
    pub fn is_empty(&self) -> bool {
        self.codespaces.iter().all(Vec::is_empty)
    }

    /// Split `raw` into codes and map each to text.
    ///
    /// Each item is `(code, text)` where `code` is the big-endian value of the
    /// code bytes. Codes without a mapping yield U+FFFD. A byte outside every
    /// code space yields U+FFFD and is skipped on its own.
    pub fn decode(&self, raw: &[u8]) -> Vec<(u32, String)> {
        let mut out = Vec::new();
        let mut rest = raw;

        'codes: while !rest.is_empty() {
            for n in 1..=MAX_CODE_LEN.min(rest.len()) {
                let code = &rest[..n];
                if self.codespaces[n - 1].iter().any(|space| space.contains(code)) {
                    out.push((code_value(code), self.lookup(code)));
                    rest = &rest[n..];
                    continue 'codes;
                }
            }
            log::debug!("Byte {:#04x} is outside every code space", rest[0]);
            out.push((rest[0] as u32, NO_CHAR.to_string()));
            rest = &rest[1..];
        }
        out
    }

    /// Decode `raw` to a single string.
    pub fn decode_str(&self, raw: &[u8]) -> String {
        self.decode(raw).into_iter().map(|(_, text)| text).collect()
    }

    fn lookup(&self, code: &[u8]) -> String {
        let found = self
            .bfranges
            .iter()
            .find(|bf| bf.range.lo.len() == code.len() && bf.range.contains(code));
        let bf = match found {
            Some(bf) => bf,
            None => {
                log::debug!("No mapping for code {:02x?}", code);
                return NO_CHAR.to_string();
            },
        };

        match &bf.dst {
            Value::String(dst) => {
                let mut dst = dst.clone();
                if let (Some(last), Some(&code_last), Some(&lo_last)) =
                    (dst.last_mut(), code.last(), bf.range.lo.last())
                {
                    *last = last.wrapping_add(code_last.wrapping_sub(lo_last));
                }
                utf16_be_decode(&dst)
            },
            Value::Array(items) => {
                let offset = code_value(code).saturating_sub(code_value(&bf.range.lo)) as usize;
                match items.get(offset) {
                    Some(Value::String(dst)) => utf16_be_decode(dst),
                    _ => NO_CHAR.to_string(),
                }
            },
            other => {
                log::debug!("bfrange destination of type {}", other.type_name());
                NO_CHAR.to_string()
            },
        }
    }
}

/// Big-endian value of a code of up to four bytes.
fn code_value(code: &[u8]) -> u32 {
    code.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Decode UTF-16BE without a BOM; a trailing odd byte is dropped.
fn utf16_be_decode(bytes: &[u8]) -> String {
    let units = bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(NO_CHAR))
        .collect()
}

/// Operator handler that accumulates a [`CMap`].
#[derive(Default)]
struct CMapBuilder {
    cmap: CMap,
    /// Entry count announced by the open `begin*` operator
    pending: Option<usize>,
}

impl CMapBuilder {
    fn take_count(&mut self, op: &str) -> Result<usize> {
        self.pending
            .take()
            .ok_or_else(|| Error::CMap(format!("{} without matching begin", op)))
    }
}

impl OperatorHandler for CMapBuilder {
    fn handle(&mut self, stack: &mut Stack, op: &str) -> Result<bool> {
        match op {
            "findresource" => {
                let category = stack.pop();
                let key = stack.pop();
                log::debug!("findresource {:?} {:?}", key, category);
                stack.push(Value::Dict(Dict::new()));
            },
            "begincmap" => stack.push(Value::Dict(Dict::new())),
            "endcmap" => {
                stack.pop();
            },
            "begincodespacerange" | "beginbfchar" | "beginbfrange" => {
                let count = stack
                    .pop()
                    .as_integer()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| Error::CMap(format!("{} needs an entry count", op)))?;
                self.pending = Some(count);
            },
            "endcodespacerange" => {
                let count = self.take_count(op)?.min(stack.len());
                let mut ranges = Vec::with_capacity(count);
                for _ in 0..count {
                    let hi = string_operand(stack.pop());
                    let lo = string_operand(stack.pop());
                    if lo.is_empty() || lo.len() != hi.len() || lo.len() > MAX_CODE_LEN {
                        return Err(Error::CMap(format!(
                            "bad code space range {:02x?}..{:02x?}",
                            lo, hi
                        )));
                    }
                    ranges.push(CodeRange { lo, hi });
                }
                for range in ranges.into_iter().rev() {
                    self.cmap.codespaces[range.lo.len() - 1].push(range);
                }
            },
            "endbfchar" => {
                let count = self.take_count(op)?.min(stack.len());
                let mut chars = Vec::with_capacity(count);
                for _ in 0..count {
                    let dst = stack.pop();
                    let src = string_operand(stack.pop());
                    chars.push(BfRange {
                        range: CodeRange {
                            lo: src.clone(),
                            hi: src,
                        },
                        dst,
                    });
                }
                self.cmap.bfranges.extend(chars.into_iter().rev());
            },
            "endbfrange" => {
                let count = self.take_count(op)?.min(stack.len());
                let mut ranges = Vec::with_capacity(count);
                for _ in 0..count {
                    let dst = stack.pop();
                    let hi = string_operand(stack.pop());
                    let lo = string_operand(stack.pop());
                    ranges.push(BfRange {
                        range: CodeRange { lo, hi },
                        dst,
                    });
                }
                self.cmap.bfranges.extend(ranges.into_iter().rev());
            },
            "defineresource" => {
                let category = stack.pop();
                let value = stack.pop();
                let key = stack.pop();
                log::debug!(
                    "defineresource {} as {}",
                    key.as_name().unwrap_or("?"),
                    category.as_name().unwrap_or("?")
                );
                stack.push(value);
            },
            _ => log::debug!("Ignoring CMap operator '{}'", op),
        }
        Ok(true)
    }
}

/// Bytes of a string operand; anything else is treated as empty.
fn string_operand(value: Value) -> Vec<u8> {
    match value {
        Value::String(bytes) => bytes,
        other => {
            if !other.is_null() {
                log::debug!("Expected string in CMap, found {}", other.type_name());
            }
            Vec::new()
        },
    }
}

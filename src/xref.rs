//! Cross-reference table parser.
//!
//! The xref maps object numbers to byte offsets, or to slots inside object
//! streams. Classic `xref` tables, cross-reference streams (`/Type /XRef`) and
//! hybrid files (`/XRefStm`) are supported. Sections are chained through
//! `/Prev`; newer sections win.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::object::{Dict, Value};
use crate::parser::ObjectReader;
use crate::parser_config::ParserOptions;

/// Longest `/Prev` chain that is followed.
const MAX_XREF_SECTIONS: usize = 100;

/// Where an object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// Deleted or never-used object number
    Free {
        /// Generation the number will get if reused
        generation: u16,
    },
    /// Object stored at a byte offset in the file
    Uncompressed {
        /// Absolute byte offset of `num gen obj`
        offset: u64,
        /// Generation number
        generation: u16,
    },
    /// Object stored inside an object stream; generation is implicitly 0
    Compressed {
        /// Object number of the containing `/Type /ObjStm`
        stream: u32,
        /// Index of the object inside that stream
        index: u32,
    },
}

impl XRefEntry {
    /// True for free entries.
    pub fn is_free(&self) -> bool {
        matches!(self, XRefEntry::Free { .. })
    }
}

/// Cross-reference table that maps object numbers to their locations.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XRefEntry>,
    trailer: Option<Dict>,
}

impl CrossRefTable {
    /// Create a new empty cross-reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailer dictionary.
    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = Some(trailer);
    }

    /// Trailer of the newest section.
    pub fn trailer(&self) -> Option<&Dict> {
        self.trailer.as_ref()
    }

    /// Add or replace an entry.
    pub fn add_entry(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Get an entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// All object numbers with an entry.
    pub fn object_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Merge an older section. Entries and trailer already present win.
    pub fn merge_from(&mut self, older: CrossRefTable) {
        for (num, entry) in older.entries {
            self.entries.entry(num).or_insert(entry);
        }
        if self.trailer.is_none() {
            self.trailer = older.trailer;
        }
    }

    /// Fill absent or free slots from a hybrid file's `/XRefStm` section.
    fn merge_hybrid(&mut self, stream_section: CrossRefTable) {
        for (num, entry) in stream_section.entries {
            match self.entries.get(&num) {
                None | Some(XRefEntry::Free { .. }) => {
                    self.entries.insert(num, entry);
                },
                Some(_) => {},
            }
        }
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Find the offset named by the last `startxref` in the file.
pub fn find_xref_offset(data: &[u8]) -> Result<usize> {
    let tail_start = data.len().saturating_sub(2048);
    let pos = rfind(&data[tail_start..], b"startxref")
        .map(|p| p + tail_start)
        .or_else(|| rfind(data, b"startxref"))
        .ok_or(Error::InvalidXref)?;

    let mut lexer = Lexer::at(data, pos + b"startxref".len()).allow_objptr(false);
    match lexer.next_token() {
        Ok(Token::Integer(offset)) => usize::try_from(offset).map_err(|_| Error::InvalidXref),
        _ => Err(Error::InvalidXref),
    }
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Parse the section at `offset` and everything reachable through `/Prev`.
///
/// A `/Prev` loop or an unreadable older section ends the chain with a
/// warning; only a failure of the newest section is an error.
pub fn parse_xref(data: &[u8], offset: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    let mut xref = parse_section(data, offset, options)?;
    let mut visited = HashSet::from([offset]);
    let mut next = prev_offset(xref.trailer());

    while let Some(prev) = next {
        if !visited.insert(prev) {
            log::warn!("xref /Prev chain loops back to offset {}, stopping", prev);
            break;
        }
        if visited.len() > MAX_XREF_SECTIONS {
            log::warn!("xref /Prev chain longer than {} sections, stopping", MAX_XREF_SECTIONS);
            break;
        }
        log::debug!("Following /Prev to xref section at offset {}", prev);
        match parse_section(data, prev, options) {
            Ok(older) => {
                next = prev_offset(older.trailer());
                xref.merge_from(older);
            },
            Err(e) => {
                log::warn!("Skipping unreadable xref section at offset {}: {}", prev, e);
                break;
            },
        }
    }

    Ok(xref)
}

fn prev_offset(trailer: Option<&Dict>) -> Option<usize> {
    trailer
        .and_then(|t| t.get("Prev"))
        .and_then(Value::as_integer)
        .and_then(|p| usize::try_from(p).ok())
}

/// Parse one section, classic or stream, without following `/Prev`.
fn parse_section(data: &[u8], offset: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    if offset >= data.len() {
        return Err(Error::InvalidPdf(format!(
            "xref offset {} past end of file ({} bytes)",
            offset,
            data.len()
        )));
    }

    let mut lexer = Lexer::at(data, offset);
    match lexer.next_token()? {
        Token::Keyword(kw) if kw == "xref" => {
            log::debug!("Classic xref table at offset {}", offset);
            let mut table = parse_traditional_xref(data, lexer.position(), options)?;
            let stm = table
                .trailer()
                .and_then(|t| t.get("XRefStm"))
                .and_then(Value::as_integer)
                .and_then(|o| usize::try_from(o).ok());
            if let Some(stm_offset) = stm {
                match parse_xref_stream(data, stm_offset, options) {
                    Ok(section) => table.merge_hybrid(section),
                    Err(e) => log::warn!("Ignoring /XRefStm at {}: {}", stm_offset, e),
                }
            }
            Ok(table)
        },
        Token::ObjHeader(_) => {
            log::debug!("Cross-reference stream at offset {}", offset);
            parse_xref_stream(data, offset, options)
        },
        other => {
            log::warn!("No xref at offset {}, found {:?}", offset, other);
            Err(Error::InvalidXref)
        },
    }
}

/// Parse the subsections following the `xref` keyword, then the trailer.
///
/// ```text
/// xref
/// 0 3
/// 0000000000 65535 f
/// 0000000018 00000 n
/// 0000000154 00000 n
/// trailer
/// << /Size 3 /Root 1 0 R >>
/// ```
fn parse_traditional_xref(data: &[u8], pos: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    let mut xref = CrossRefTable::new();
    let mut lexer = Lexer::at(data, pos).allow_objptr(false);

    loop {
        let start = match lexer.next_token()? {
            Token::Keyword(kw) if kw == "trailer" => break,
            Token::Integer(n) => u32::try_from(n).map_err(|_| Error::InvalidXref)?,
            other => {
                log::warn!("Unexpected {:?} in xref table", other);
                return Err(Error::InvalidXref);
            },
        };
        let count = match lexer.next_token()? {
            Token::Integer(n) if (0..=1_000_000).contains(&n) => n as u32,
            _ => return Err(Error::InvalidXref),
        };

        for i in 0..count {
            let entry = read_table_entry(&mut lexer)?;
            xref.add_entry(start.saturating_add(i), entry);
        }
    }

    let trailer = ObjectReader::new(lexer.allow_objptr(true))
        .with_options(options)
        .read_object()?;
    match trailer {
        Value::Dict(dict) => xref.set_trailer(dict),
        other => {
            return Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            });
        },
    }

    Ok(xref)
}

/// One `offset generation n|f` line.
fn read_table_entry(lexer: &mut Lexer<'_>) -> Result<XRefEntry> {
    let offset = match lexer.next_token()? {
        Token::Integer(n) => u64::try_from(n).map_err(|_| Error::InvalidXref)?,
        _ => return Err(Error::InvalidXref),
    };
    let generation = match lexer.next_token()? {
        Token::Integer(n) => u16::try_from(n).unwrap_or(u16::MAX),
        _ => return Err(Error::InvalidXref),
    };
    match lexer.next_token()? {
        Token::Keyword(kind) if kind.eq_ignore_ascii_case("n") => {
            Ok(XRefEntry::Uncompressed { offset, generation })
        },
        Token::Keyword(kind) if kind.eq_ignore_ascii_case("f") => Ok(XRefEntry::Free { generation }),
        other => {
            log::warn!("Invalid xref entry type {:?}, treating as free", other);
            Ok(XRefEntry::Free { generation })
        },
    }
}

/// Parse a cross-reference stream object.
///
/// `/W [w1 w2 w3]` gives the field widths, `/Index` the subsection ranges
/// (default `[0 Size]`). Field 1 is the entry type (default 1 when its width
/// is 0): 0 free, 1 uncompressed, 2 compressed. Unknown types are skipped.
fn parse_xref_stream(data: &[u8], offset: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    let mut reader = ObjectReader::new(Lexer::at(data, offset)).with_options(options);
    let (_, stream) = reader.read_indirect_object()?;

    let dict = match &stream {
        Value::Stream { dict, .. } => dict,
        other => {
            return Err(Error::InvalidPdf(format!(
                "xref stream is a {}, not a stream",
                other.type_name()
            )));
        },
    };
    if let Some(kind) = dict.get("Type").and_then(Value::as_name) {
        if kind != "XRef" {
            return Err(Error::InvalidPdf(format!("expected /Type /XRef, got /{}", kind)));
        }
    }

    let widths: Vec<usize> = dict
        .get("W")
        .and_then(Value::as_array)
        .map(|w| {
            w.iter()
                .filter_map(Value::as_integer)
                .filter_map(|n| usize::try_from(n).ok())
                .collect()
        })
        .unwrap_or_default();
    if widths.len() != 3 || widths.iter().any(|&w| w > 8) {
        return Err(Error::InvalidPdf(format!("invalid /W {:?} in xref stream", widths)));
    }
    let (w1, w2, w3) = (widths[0], widths[1], widths[2]);
    let entry_size = w1 + w2 + w3;
    if entry_size == 0 {
        return Err(Error::InvalidPdf("xref stream /W is all zero".to_string()));
    }

    let size = dict.get("Size").and_then(Value::as_integer).unwrap_or(0).max(0) as u32;
    let ranges: Vec<(u32, u32)> = match dict.get("Index").and_then(Value::as_array) {
        Some(index) => index
            .chunks_exact(2)
            .filter_map(|pair| {
                let start = u32::try_from(pair[0].as_integer()?).ok()?;
                let count = u32::try_from(pair[1].as_integer()?).ok()?;
                Some((start, count))
            })
            .collect(),
        None => vec![(0, size)],
    };

    let decoded = stream.decode_stream_data_with_options(options)?;
    let mut rows = decoded.chunks_exact(entry_size);
    let mut xref = CrossRefTable::new();

    'ranges: for (start, count) in ranges {
        for i in 0..count {
            let Some(row) = rows.next() else {
                log::warn!("xref stream data ends before entry {}", start.saturating_add(i));
                break 'ranges;
            };
            let kind = if w1 == 0 { 1 } else { read_int(&row[..w1]) };
            let field2 = read_int(&row[w1..w1 + w2]);
            let field3 = read_int(&row[w1 + w2..]);

            let entry = match kind {
                0 => XRefEntry::Free {
                    generation: field3 as u16,
                },
                1 => XRefEntry::Uncompressed {
                    offset: field2,
                    generation: field3 as u16,
                },
                2 => XRefEntry::Compressed {
                    stream: field2 as u32,
                    index: field3 as u32,
                },
                other => {
                    log::debug!("Skipping xref stream entry of unknown type {}", other);
                    continue;
                },
            };
            xref.add_entry(start.saturating_add(i), entry);
        }
    }

    if let Value::Stream { dict, .. } = stream {
        xref.set_trailer(dict);
    }
    Ok(xref)
}

/// Read a big-endian integer of up to eight bytes.
fn read_int(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

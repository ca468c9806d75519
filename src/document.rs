//! PDF document model.
//!
//! [`PdfDocument`] owns the file bytes, the merged cross-reference table and
//! the resolver state. Objects are parsed on first request and memoised per
//! `(number, generation)` for the lifetime of the handle.
//!
//! The resolver keeps its state in `RefCell`/`Cell`, so every accessor takes
//! `&self` and a document can be walked while pages borrow it. The handle is
//! `!Sync`; share it across threads behind a `Mutex`.

use crate::error::{Error, Result};
use crate::object::{Dict, ObjectRef, Value};
use crate::objstm::ObjectStream;
use crate::page::Page;
use crate::parser::ObjectReader;
use crate::parser_config::ParserOptions;
use crate::xref::{find_xref_offset, parse_xref, CrossRefTable, XRefEntry};
use crate::lexer::{Lexer, Token};
use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

/// Page attributes inherited from ancestor `/Pages` nodes.
const INHERITABLE_ATTRIBUTES: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

/// How far into the file the `%PDF-` marker may appear.
const HEADER_SEARCH_LIMIT: usize = 1024;

/// An opened PDF document.
pub struct PdfDocument {
    data: Bytes,
    version: (u8, u8),
    xref: CrossRefTable,
    trailer: Dict,
    options: ParserOptions,
    /// Resolved objects by reference
    object_cache: RefCell<HashMap<ObjectRef, Value>>,
    /// Decoded object streams by container number
    objstm_cache: RefCell<HashMap<u32, Rc<ObjectStream>>>,
    /// References currently being resolved (cycle detection)
    resolving: RefCell<HashSet<ObjectRef>>,
    recursion_depth: Cell<u32>,
    parse_count: Cell<usize>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("version", &format!("{}.{}", self.version.0, self.version.1))
            .field("size", &self.data.len())
            .field("xref_entries", &self.xref.len())
            .field("cached_objects", &self.object_cache.borrow().len())
            .finish()
    }
}

impl PdfDocument {
    /// Open a PDF file with default options.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdftext::PdfDocument;
    ///
    /// let doc = PdfDocument::open("sample.pdf")?;
    /// println!("{} pages", doc.page_count()?);
    /// # Ok::<(), pdftext::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ParserOptions::default())
    }

    /// Open a PDF file with custom parser options.
    pub fn open_with_options(path: impl AsRef<Path>, options: ParserOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes_with_options(data, options)
    }

    /// Read the whole of `reader` and open it as a PDF.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with_options(data, ParserOptions::default())
    }

    /// Open a PDF held in memory with custom parser options.
    pub fn from_bytes_with_options(data: impl Into<Bytes>, options: ParserOptions) -> Result<Self> {
        let data = data.into();
        if options.max_file_size > 0 && data.len() > options.max_file_size {
            return Err(Error::InvalidPdf(format!(
                "file size {} exceeds limit {}",
                data.len(),
                options.max_file_size
            )));
        }

        let version = parse_header(&data)?;
        let xref_offset = find_xref_offset(&data)?;
        let xref = parse_xref(&data, xref_offset, &options)?;
        let trailer = xref
            .trailer()
            .cloned()
            .ok_or_else(|| Error::InvalidPdf("missing trailer dictionary".to_string()))?;

        if trailer.contains_key("Encrypt") {
            return Err(Error::Unsupported("encrypted documents".to_string()));
        }

        log::debug!(
            "Opened PDF {}.{} ({} bytes, {} xref entries)",
            version.0,
            version.1,
            data.len(),
            xref.len()
        );

        Ok(Self {
            data,
            version,
            xref,
            trailer,
            options,
            object_cache: RefCell::new(HashMap::new()),
            objstm_cache: RefCell::new(HashMap::new()),
            resolving: RefCell::new(HashSet::new()),
            recursion_depth: Cell::new(0),
            parse_count: Cell::new(0),
        })
    }

    /// PDF version from the header as (major, minor).
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// The merged trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    /// Options this document was opened with.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Number of objects parsed from bytes so far. Cache hits do not count.
    pub fn parse_count(&self) -> usize {
        self.parse_count.get()
    }

    /// Resolve an indirect reference.
    ///
    /// Results are cached; a second call for the same reference returns an
    /// equal value without parsing again. Failures are not cached and only
    /// affect the object asked for.
    pub fn resolve(&self, obj_ref: ObjectRef) -> Result<Value> {
        let depth = self.recursion_depth.get();
        if depth >= self.options.max_recursion_depth {
            log::warn!("Resolution depth {} reached at {}", depth, obj_ref);
            return Err(Error::RecursionLimitExceeded(self.options.max_recursion_depth));
        }

        if self.resolving.borrow().contains(&obj_ref) {
            log::warn!("Cyclic reference to {}", obj_ref);
            return Err(Error::CyclicReference(obj_ref));
        }

        if let Some(value) = self.object_cache.borrow().get(&obj_ref) {
            log::debug!("Cache hit for {}", obj_ref);
            return Ok(value.clone());
        }
        log::debug!("Cache miss for {}", obj_ref);

        let entry = *self
            .xref
            .get(obj_ref.id)
            .ok_or_else(|| Error::reference(obj_ref, "not in cross-reference table"))?;

        self.resolving.borrow_mut().insert(obj_ref);
        self.recursion_depth.set(depth + 1);

        let result = match entry {
            XRefEntry::Free { .. } => Err(Error::reference(obj_ref, "entry is free")),
            XRefEntry::Uncompressed { generation, .. } if generation != obj_ref.gen => Err(Error::reference(
                obj_ref,
                format!("generation mismatch (table has {})", generation),
            )),
            XRefEntry::Uncompressed { offset, .. } => self.load_uncompressed(obj_ref, offset),
            XRefEntry::Compressed { .. } if obj_ref.gen != 0 => Err(Error::reference(
                obj_ref,
                "compressed objects have generation 0",
            )),
            XRefEntry::Compressed { stream, index } => self.load_compressed(obj_ref, stream, index),
        };

        self.recursion_depth.set(depth);
        self.resolving.borrow_mut().remove(&obj_ref);

        let value = result?;
        self.object_cache.borrow_mut().insert(obj_ref, value.clone());
        Ok(value)
    }

    /// Follow `value` while it is a reference. Direct values are cloned.
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        let mut current = value.clone();
        let mut seen = HashSet::new();
        while let Value::Reference(r) = current {
            if !seen.insert(r) {
                return Err(Error::CyclicReference(r));
            }
            current = self.resolve(r)?;
        }
        Ok(current)
    }

    /// Resolve `dict[key]`, yielding `Value::Null` when the key is absent.
    pub fn lookup(&self, dict: &Dict, key: &str) -> Result<Value> {
        match dict.get(key) {
            Some(value) => self.resolve_value(value),
            None => Ok(Value::Null),
        }
    }

    /// The document catalog (`/Root`).
    pub fn catalog(&self) -> Result<Dict> {
        match self.lookup(&self.trailer, "Root")? {
            Value::Dict(dict) => Ok(dict),
            Value::Null => Err(Error::InvalidPdf("trailer missing /Root".to_string())),
            other => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Number of pages.
    ///
    /// Uses `/Count` of the page tree root, counting the leaves when it is
    /// missing or unusable.
    pub fn page_count(&self) -> Result<usize> {
        let root = self.page_tree_root()?;
        match root.get("Count").map(|v| self.resolve_value(v)).transpose()? {
            Some(Value::Integer(n)) if n >= 0 => Ok(n as usize),
            found => {
                log::warn!("Page tree /Count is {:?}, counting leaves", found);
                let mut visited = HashSet::new();
                self.count_leaves(&root, &mut visited)
            },
        }
    }

    /// Page `number`, counting from 1.
    ///
    /// `Ok(None)` is the null page: the number is out of range or the tree
    /// has no leaf there. Callers treat it as empty.
    pub fn page(&self, number: usize) -> Result<Option<Page<'_>>> {
        if number == 0 {
            return Ok(None);
        }
        let mut remaining = number - 1;
        let mut node = self.page_tree_root()?;
        let mut inherited = Dict::new();
        let mut visited = HashSet::new();

        'search: loop {
            for key in INHERITABLE_ATTRIBUTES {
                if let Some(value) = node.get(key) {
                    inherited.insert(key.to_string(), value.clone());
                }
            }

            let kids = match self.lookup(&node, "Kids")? {
                Value::Array(kids) => kids,
                _ => return Ok(None),
            };

            for kid in &kids {
                if let Value::Reference(r) = kid {
                    if visited.contains(r) {
                        log::warn!("Page tree revisits {}, giving up on page {}", r, number);
                        return Ok(None);
                    }
                }
                let kid_dict = match self.resolve_value(kid)? {
                    Value::Dict(dict) => dict,
                    other => {
                        log::warn!("Skipping page tree kid of type {}", other.type_name());
                        continue;
                    },
                };

                if node_type(&kid_dict) == "Pages" {
                    let count = self.node_count(&kid_dict)?;
                    if remaining < count {
                        if let Value::Reference(r) = kid {
                            visited.insert(*r);
                        }
                        node = kid_dict;
                        continue 'search;
                    }
                    remaining -= count;
                } else {
                    if remaining == 0 {
                        let mut dict = kid_dict;
                        for (key, value) in inherited {
                            dict.entry(key).or_insert(value);
                        }
                        return Ok(Some(Page::new(self, dict)));
                    }
                    remaining -= 1;
                }
            }
            return Ok(None);
        }
    }

    fn page_tree_root(&self) -> Result<Dict> {
        let catalog = self.catalog()?;
        match self.lookup(&catalog, "Pages")? {
            Value::Dict(dict) => Ok(dict),
            other => Err(Error::InvalidPdf(format!(
                "catalog /Pages is {}, expected a dictionary",
                other.type_name()
            ))),
        }
    }

    fn node_count(&self, node: &Dict) -> Result<usize> {
        match self.lookup(node, "Count")? {
            Value::Integer(n) if n >= 0 => Ok(n as usize),
            _ => {
                let mut visited = HashSet::new();
                self.count_leaves(node, &mut visited)
            },
        }
    }

    fn count_leaves(&self, node: &Dict, visited: &mut HashSet<ObjectRef>) -> Result<usize> {
        let kids = match self.lookup(node, "Kids")? {
            Value::Array(kids) => kids,
            _ => return Ok(0),
        };

        let mut total = 0;
        for kid in &kids {
            if let Value::Reference(r) = kid {
                if !visited.insert(*r) {
                    log::warn!("Page tree revisits {} while counting", r);
                    continue;
                }
            }
            if let Value::Dict(kid_dict) = self.resolve_value(kid)? {
                total += if node_type(&kid_dict) == "Pages" {
                    self.count_leaves(&kid_dict, visited)?
                } else {
                    1
                };
            }
        }
        Ok(total)
    }

    fn load_uncompressed(&self, obj_ref: ObjectRef, offset: u64) -> Result<Value> {
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start < self.data.len())
            .ok_or_else(|| {
                Error::reference(
                    obj_ref,
                    format!("offset {} past end of file ({} bytes)", offset, self.data.len()),
                )
            })?;

        let length_resolver = |len_ref: ObjectRef| -> Option<i64> {
            match self.resolve(len_ref) {
                Ok(value) => value.as_integer(),
                Err(e) => {
                    log::warn!("Cannot resolve stream length {}: {}", len_ref, e);
                    None
                },
            }
        };
        let lexer = Lexer::at(&self.data, start);
        let mut reader = ObjectReader::new(lexer)
            .with_options(&self.options)
            .with_length_resolver(&length_resolver);

        match reader.next_token() {
            Ok(Token::ObjHeader(header)) if header == obj_ref => reader.push_back(Token::ObjHeader(header))?,
            Ok(Token::ObjHeader(header)) => {
                return Err(Error::reference(
                    obj_ref,
                    format!("offset {} holds object {}", offset, header),
                ));
            },
            _ => {
                return Err(Error::reference(obj_ref, format!("no object header at offset {}", offset)));
            },
        }

        let (_, value) = reader.read_indirect_object()?;
        self.parse_count.set(self.parse_count.get() + 1);
        Ok(value)
    }

    fn load_compressed(&self, obj_ref: ObjectRef, stream: u32, index: u32) -> Result<Value> {
        let objstm = self.object_stream(stream)?;
        if index as usize >= objstm.len() {
            return Err(Error::reference(
                obj_ref,
                format!("object stream {} has no slot {} ({} objects)", stream, index, objstm.len()),
            ));
        }
        let (number, value) = objstm.get(index as usize)?;
        if number != obj_ref.id {
            return Err(Error::reference(
                obj_ref,
                format!("object stream {} slot {} holds object {}", stream, index, number),
            ));
        }
        self.parse_count.set(self.parse_count.get() + 1);
        Ok(value)
    }

    fn object_stream(&self, number: u32) -> Result<Rc<ObjectStream>> {
        if let Some(objstm) = self.objstm_cache.borrow().get(&number) {
            return Ok(Rc::clone(objstm));
        }

        let container = self.resolve(ObjectRef::new(number, 0))?;
        let objstm = Rc::new(ObjectStream::parse(&container, &self.options)?);
        log::debug!("Decoded object stream {} ({} objects)", number, objstm.len());
        self.objstm_cache.borrow_mut().insert(number, Rc::clone(&objstm));
        Ok(objstm)
    }
}

/// `/Type` of a page tree node; nodes without one are classified by `/Kids`.
fn node_type(node: &Dict) -> &str {
    match node.get("Type").and_then(Value::as_name) {
        Some(kind) => kind,
        None if node.contains_key("Kids") => "Pages",
        None => "Page",
    }
}

/// Find `%PDF-M.m` near the start of the file.
fn parse_header(data: &[u8]) -> Result<(u8, u8)> {
    let window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
    let start = window
        .windows(5)
        .position(|w| w == b"%PDF-")
        .ok_or_else(|| Error::InvalidHeader("no %PDF- marker in the first 1024 bytes".to_string()))?;
    if start > 0 {
        log::warn!("PDF header found at offset {}, ignoring leading bytes", start);
    }

    let digits = &data[start + 5..data.len().min(start + 8)];
    match digits {
        [major @ b'0'..=b'9', b'.', minor @ b'0'..=b'9'] => Ok((major - b'0', minor - b'0')),
        _ => Err(Error::InvalidHeader(format!(
            "invalid version '{}'",
            String::from_utf8_lossy(digits)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a classic-xref PDF from numbered object bodies.
    fn build_pdf(objects: &[(u32, &str)], trailer: &str) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = HashMap::new();
        for (id, body) in objects {
            offsets.insert(*id, out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
        }
        let size = objects.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1;
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", size).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for id in 1..size {
            match offsets.get(&id) {
                Some(off) => out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes()),
                None => out.extend_from_slice(b"0000000000 00000 f \n"),
            }
        }
        out.extend_from_slice(
            format!("trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n", size, trailer, xref_at).as_bytes(),
        );
        out
    }

    fn simple_pdf() -> Vec<u8> {
        build_pdf(
            &[
                (1, "<< /Type /Catalog /Pages 2 0 R >>"),
                (2, "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>"),
                (3, "<< /Type /Page /Parent 2 0 R >>"),
                (4, "(hello)"),
            ],
            "/Root 1 0 R",
        )
    }

    // ========================================================================
    // Header
    // ========================================================================

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header(b"%PDF-1.7\n").unwrap(), (1, 7));
        assert_eq!(parse_header(b"junk\n%PDF-2.0\n").unwrap(), (2, 0));
        assert!(matches!(parse_header(b"hello"), Err(Error::InvalidHeader(_))));
        assert!(matches!(parse_header(b"%PDF-x"), Err(Error::InvalidHeader(_))));
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[test]
    fn test_resolve_is_memoised() {
        let doc = PdfDocument::from_bytes(simple_pdf()).unwrap();
        let r = ObjectRef::new(4, 0);

        let first = doc.resolve(r).unwrap();
        let parsed = doc.parse_count();
        let second = doc.resolve(r).unwrap();

        assert_eq!(first, Value::String(b"hello".to_vec()));
        assert_eq!(first, second);
        assert_eq!(doc.parse_count(), parsed);
    }

    #[test]
    fn test_unknown_and_mismatched_references() {
        let doc = PdfDocument::from_bytes(simple_pdf()).unwrap();
        assert!(matches!(doc.resolve(ObjectRef::new(99, 0)), Err(Error::Reference { .. })));
        assert!(matches!(doc.resolve(ObjectRef::new(4, 1)), Err(Error::Reference { .. })));
        assert!(matches!(doc.resolve(ObjectRef::new(0, 0)), Err(Error::Reference { .. })));
    }

    #[test]
    fn test_recursion_limit() {
        let options = ParserOptions {
            max_recursion_depth: 0,
            ..ParserOptions::default()
        };
        let doc = PdfDocument::from_bytes_with_options(simple_pdf(), options).unwrap();
        assert!(matches!(
            doc.resolve(ObjectRef::new(4, 0)),
            Err(Error::RecursionLimitExceeded(0))
        ));
    }

    #[test]
    fn test_resolve_value_follows_chains() {
        let pdf = build_pdf(&[(1, "<< /Pages 2 0 R >>"), (2, "3 0 R"), (3, "42")], "/Root 1 0 R");
        let doc = PdfDocument::from_bytes(pdf).unwrap();
        let value = doc.resolve_value(&Value::Reference(ObjectRef::new(2, 0))).unwrap();
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn test_resolve_value_detects_loops() {
        let pdf = build_pdf(&[(1, "<< >>"), (2, "3 0 R"), (3, "2 0 R")], "/Root 1 0 R");
        let doc = PdfDocument::from_bytes(pdf).unwrap();
        assert!(matches!(
            doc.resolve_value(&Value::Reference(ObjectRef::new(2, 0))),
            Err(Error::CyclicReference(_))
        ));
    }

    #[test]
    fn test_encrypted_document_rejected() {
        let pdf = build_pdf(&[(1, "<< >>"), (2, "<< /Filter /Standard >>")], "/Root 1 0 R /Encrypt 2 0 R");
        assert!(matches!(PdfDocument::from_bytes(pdf), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_file_size_limit() {
        let options = ParserOptions {
            max_file_size: 10,
            ..ParserOptions::default()
        };
        assert!(matches!(
            PdfDocument::from_bytes_with_options(simple_pdf(), options),
            Err(Error::InvalidPdf(_))
        ));
    }

    // ========================================================================
    // Page tree
    // ========================================================================

    #[test]
    fn test_page_inherits_media_box() {
        let doc = PdfDocument::from_bytes(simple_pdf()).unwrap();
        assert_eq!(doc.page_count().unwrap(), 1);

        let page = doc.page(1).unwrap().unwrap();
        assert_eq!(page.media_box(), Some([0.0, 0.0, 612.0, 792.0]));
        assert!(doc.page(0).unwrap().is_none());
        assert!(doc.page(2).unwrap().is_none());
    }

    #[test]
    fn test_page_count_falls_back_to_leaves() {
        let pdf = build_pdf(
            &[
                (1, "<< /Type /Catalog /Pages 2 0 R >>"),
                (2, "<< /Type /Pages /Kids [3 0 R 4 0 R] >>"),
                (3, "<< /Type /Pages /Kids [5 0 R 6 0 R] >>"),
                (4, "<< /Type /Page >>"),
                (5, "<< /Type /Page >>"),
                (6, "<< /Type /Page /Rotate 90 >>"),
            ],
            "/Root 1 0 R",
        );
        let doc = PdfDocument::from_bytes(pdf).unwrap();
        assert_eq!(doc.page_count().unwrap(), 3);

        let second = doc.page(2).unwrap().unwrap();
        assert_eq!(second.dict().get("Rotate"), Some(&Value::Integer(90)));
        assert!(doc.page(3).unwrap().is_some());
    }
}

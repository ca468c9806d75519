//! In-test PDF assembly shared by the integration tests.
//!
//! Objects are written in the order they were added. `build` produces a
//! classic `xref` table; `build_with_xref_stream` produces a cross-reference
//! stream and is required when object streams are used.

#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::Write;

/// Where an object of the finished file lives.
enum Slot {
    Body(Vec<u8>),
    Packed { container: u32, index: u32 },
}

/// Builder for small PDF files.
#[derive(Default)]
pub struct PdfBuilder {
    order: Vec<u32>,
    slots: BTreeMap<u32, Slot>,
    /// Byte offsets to write into the xref instead of the real ones
    offset_overrides: BTreeMap<u32, u64>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id 0 obj <body> endobj`.
    pub fn object(mut self, id: u32, body: &str) -> Self {
        self.insert(id, Slot::Body(body.as_bytes().to_vec()));
        self
    }

    /// Add a stream object with a direct `/Length`. `extra` goes into the
    /// stream dictionary.
    pub fn stream(mut self, id: u32, extra: &str, data: &[u8]) -> Self {
        let mut body = format!("<< /Length {} {} >>\nstream\n", data.len(), extra).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.insert(id, Slot::Body(body));
        self
    }

    /// Add a FlateDecode stream.
    pub fn flate_stream(self, id: u32, extra: &str, data: &[u8]) -> Self {
        let compressed = flate(data);
        self.stream(id, &format!("/Filter /FlateDecode {}", extra), &compressed)
    }

    /// Add an object stream `id` holding `members`, compressed with Flate.
    pub fn object_stream(mut self, id: u32, members: &[(u32, &str)]) -> Self {
        let mut header = String::new();
        let mut bodies = String::new();
        for (index, (member, body)) in members.iter().enumerate() {
            header.push_str(&format!("{} {} ", member, bodies.len()));
            bodies.push_str(body);
            bodies.push('\n');
            self.insert(
                *member,
                Slot::Packed {
                    container: id,
                    index: index as u32,
                },
            );
        }
        let extra = format!("/Type /ObjStm /N {} /First {}", members.len(), header.len());
        let data = format!("{}{}", header, bodies);
        self.flate_stream(id, &extra, data.as_bytes())
    }

    /// Declare `id` as slot `index` of object stream `container` without
    /// writing anything. Only meaningful with `build_with_xref_stream`.
    pub fn compressed_entry(mut self, id: u32, container: u32, index: u32) -> Self {
        self.insert(id, Slot::Packed { container, index });
        self
    }

    /// Point the xref entry of `id` at `offset` instead of the object.
    pub fn override_offset(mut self, id: u32, offset: u64) -> Self {
        self.offset_overrides.insert(id, offset);
        self
    }

    /// Finish with a classic xref table. `trailer` is spliced into the trailer
    /// dictionary after `/Size`.
    pub fn build(&self, trailer: &str) -> Vec<u8> {
        let (mut out, offsets) = self.write_bodies();
        let size = self.max_id() + 1;

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", size).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for id in 1..size {
            match (offsets.get(&id), self.slots.get(&id)) {
                (Some(offset), _) => out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes()),
                (None, Some(Slot::Packed { .. })) => panic!("object {} needs an xref stream", id),
                _ => out.extend_from_slice(b"0000000000 00000 f \n"),
            }
        }
        out.extend_from_slice(
            format!("trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n", size, trailer, xref_at).as_bytes(),
        );
        out
    }

    /// Finish with an uncompressed cross-reference stream (`/W [1 4 2]`).
    pub fn build_with_xref_stream(&self, trailer: &str) -> Vec<u8> {
        let (mut out, offsets) = self.write_bodies();
        let xref_id = self.max_id() + 1;
        let size = xref_id + 1;
        let xref_at = out.len();

        let mut rows = Vec::new();
        for id in 0..size {
            let (kind, field2, field3): (u8, u32, u16) = if id == xref_id {
                (1, xref_at as u32, 0)
            } else if let Some(offset) = offsets.get(&id) {
                (1, *offset as u32, 0)
            } else if let Some(Slot::Packed { container, index }) = self.slots.get(&id) {
                (2, *container, *index as u16)
            } else {
                (0, 0, if id == 0 { 0xFFFF } else { 0 })
            };
            rows.push(kind);
            rows.extend_from_slice(&field2.to_be_bytes());
            rows.extend_from_slice(&field3.to_be_bytes());
        }

        out.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Type /XRef /Size {} /W [1 4 2] /Length {} {} >>\nstream\n",
                xref_id,
                size,
                rows.len(),
                trailer
            )
            .as_bytes(),
        );
        out.extend_from_slice(&rows);
        out.extend_from_slice(b"\nendstream\nendobj\n");
        out.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_at).as_bytes());
        out
    }

    fn insert(&mut self, id: u32, slot: Slot) {
        if self.slots.insert(id, slot).is_none() {
            self.order.push(id);
        }
    }

    fn max_id(&self) -> u32 {
        self.slots.keys().copied().max().unwrap_or(0)
    }

    fn write_bodies(&self) -> (Vec<u8>, BTreeMap<u32, u64>) {
        let mut out = b"%PDF-1.5\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = BTreeMap::new();
        for id in &self.order {
            if let Some(Slot::Body(body)) = self.slots.get(id) {
                offsets.insert(*id, out.len() as u64);
                out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
                out.extend_from_slice(body);
                out.extend_from_slice(b"\nendobj\n");
            }
        }
        for (id, offset) in &self.offset_overrides {
            offsets.insert(*id, *offset);
        }
        (out, offsets)
    }
}

/// Zlib-compress `data`.
pub fn flate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("write to Vec");
    encoder.finish().expect("finish zlib stream")
}

/// Catalog and a one-level page tree over `pages` (object numbers), using
/// objects 1 and 2.
pub fn with_page_tree(builder: PdfBuilder, pages: &[u32]) -> PdfBuilder {
    let kids: Vec<String> = pages.iter().map(|p| format!("{} 0 R", p)).collect();
    builder
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 612 792] >>",
                kids.join(" "),
                pages.len()
            ),
        )
}

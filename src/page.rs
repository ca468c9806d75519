//! Pages of a [`PdfDocument`].

use crate::content::{Content, TextExtractor};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::fonts::Font;
use crate::interpreter::interpret_with_options;
use crate::object::{Dict, Value};

/// A page dictionary with its inherited attributes filled in.
///
/// Borrowed from the document it came from; every lookup resolves through
/// the document's object cache.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    doc: &'a PdfDocument,
    dict: Dict,
}

impl<'a> Page<'a> {
    pub(crate) fn new(doc: &'a PdfDocument, dict: Dict) -> Self {
        Self { doc, dict }
    }

    /// The page dictionary, including inherited `/Resources`, `/MediaBox`,
    /// `/CropBox` and `/Rotate`.
    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    /// The resource dictionary; empty when the page has none.
    pub fn resources(&self) -> Result<Dict> {
        match self.doc.lookup(&self.dict, "Resources")? {
            Value::Dict(dict) => Ok(dict),
            _ => Ok(Dict::new()),
        }
    }

    /// `/MediaBox` as `[llx, lly, urx, ury]`.
    pub fn media_box(&self) -> Option<[f64; 4]> {
        let value = self.doc.lookup(&self.dict, "MediaBox").ok()?;
        match value.as_array()?.as_slice() {
            [a, b, c, d] => Some([a.as_number()?, b.as_number()?, c.as_number()?, d.as_number()?]),
            _ => None,
        }
    }

    /// Names of the fonts in `/Resources /Font`, sorted.
    pub fn fonts(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.font_resources()?.into_keys().collect();
        names.sort();
        Ok(names)
    }

    /// Load the font resource `name`; `Ok(None)` when there is no such font.
    pub fn font(&self, name: &str) -> Result<Option<Font>> {
        let fonts = self.font_resources()?;
        let value = match fonts.get(name) {
            Some(value) => self.doc.resolve_value(value)?,
            None => return Ok(None),
        };
        match value {
            Value::Dict(dict) => Font::load(self.doc, &dict).map(Some),
            other => {
                log::warn!("Font /{} is {}, not a dictionary", name, other.type_name());
                Ok(None)
            },
        }
    }

    /// Run `/Contents` and collect glyphs and rectangles.
    ///
    /// A page without `/Contents` has empty content.
    pub fn content(&self) -> Result<Content> {
        let program = match self.doc.lookup(&self.dict, "Contents")? {
            Value::Null => return Ok(Content::default()),
            Value::Array(parts) => Value::Array(
                parts
                    .iter()
                    .map(|part| self.doc.resolve_value(part))
                    .collect::<Result<_>>()?,
            ),
            other => other,
        };

        let mut extractor = TextExtractor::new(|name: &str| self.font(name));
        interpret_with_options(&program, self.doc.options(), &mut extractor)?;
        let content = extractor.finish();
        log::debug!("Page content: {} glyphs, {} rects", content.text.len(), content.rects.len());
        Ok(content)
    }

    fn font_resources(&self) -> Result<Dict> {
        let resources = self.resources()?;
        match self.doc.lookup(&resources, "Font")? {
            Value::Dict(fonts) => Ok(fonts),
            _ => Ok(Dict::new()),
        }
    }
}

//! Font dictionaries.
//!
//! Only what text extraction needs is read: the base font name, the glyph
//! widths and the code to Unicode mapping. Font programs are never parsed.

use super::cmap::CMap;
use super::encoding::{glyph_name_to_unicode, mac_roman_char, pdf_doc_char, win_ansi_char};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{Dict, Value};
use std::collections::HashMap;

/// How a font maps string bytes to text.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEncoding {
    /// Each byte taken as a Latin-1 character
    Raw,
    /// WinAnsiEncoding
    WinAnsi,
    /// MacRomanEncoding
    MacRoman,
    /// PDFDocEncoding
    PdfDoc,
    /// `/Differences` applied over raw bytes
    Differences(HashMap<u8, char>),
    /// ToUnicode CMap
    CMap(CMap),
}

impl TextEncoding {
    /// Split `raw` into codes with their text.
    pub fn decode(&self, raw: &[u8]) -> Vec<(u32, String)> {
        let single = |map: fn(u8) -> char| -> Vec<(u32, String)> {
            raw.iter().map(|&b| (b as u32, map(b).to_string())).collect()
        };
        match self {
            TextEncoding::Raw => single(latin1_char),
            TextEncoding::WinAnsi => single(win_ansi_char),
            TextEncoding::MacRoman => single(mac_roman_char),
            TextEncoding::PdfDoc => single(pdf_doc_char),
            TextEncoding::Differences(diffs) => raw
                .iter()
                .map(|&b| {
                    let ch = diffs.get(&b).copied().unwrap_or(b as char);
                    (b as u32, ch.to_string())
                })
                .collect(),
            TextEncoding::CMap(cmap) => cmap.decode(raw),
        }
    }

    /// Decode `raw` to a single string.
    pub fn decode_str(&self, raw: &[u8]) -> String {
        self.decode(raw).into_iter().map(|(_, text)| text).collect()
    }
}

fn latin1_char(b: u8) -> char {
    b as char
}

/// A font resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    base_font: String,
    first_char: i64,
    last_char: i64,
    widths: Vec<f64>,
    encoding: TextEncoding,
}

impl Default for Font {
    /// Font used when `Tf` names nothing usable: no widths, raw bytes.
    fn default() -> Self {
        Self {
            base_font: String::new(),
            first_char: 0,
            last_char: -1,
            widths: Vec::new(),
            encoding: TextEncoding::Raw,
        }
    }
}

impl Font {
    /// Load a font dictionary, resolving indirect entries through `doc`.
    pub fn load(doc: &PdfDocument, dict: &Dict) -> Result<Self> {
        Self::build(dict, &|value| doc.resolve_value(value))
    }

    /// Build a font from a dictionary whose entries are all direct.
    ///
    /// ```
    /// use pdftext::fonts::Font;
    /// use pdftext::parser::parse_object;
    ///
    /// let dict = parse_object(b"<< /BaseFont /ABCDEF+Helvetica /FirstChar 65 /Widths [722 667] >>")?;
    /// let font = Font::from_dict(dict.as_dict().unwrap())?;
    /// assert_eq!(font.base_font(), "ABCDEF+Helvetica");
    /// assert_eq!(font.name(), "Helvetica");
    /// assert_eq!(font.width(66), 667.0);
    /// assert_eq!(font.width(90), 0.0);
    /// # Ok::<(), pdftext::Error>(())
    /// ```
    pub fn from_dict(dict: &Dict) -> Result<Self> {
        Self::build(dict, &|value| Ok(value.clone()))
    }

    fn build(dict: &Dict, resolve: &dyn Fn(&Value) -> Result<Value>) -> Result<Self> {
        let get = |key: &str| -> Result<Value> {
            match dict.get(key) {
                Some(value) => resolve(value),
                None => Ok(Value::Null),
            }
        };

        let base_font = get("BaseFont")?.as_name().unwrap_or_default().to_string();
        let first_char = get("FirstChar")?.as_integer().unwrap_or(0);
        let widths: Vec<f64> = match get("Widths")? {
            Value::Array(items) => items
                .iter()
                .map(|item| resolve(item).map(|v| v.as_number().unwrap_or(0.0)))
                .collect::<Result<_>>()?,
            _ => Vec::new(),
        };
        let last_char = get("LastChar")?
            .as_integer()
            .unwrap_or_else(|| {
                let covered = i64::try_from(widths.len()).unwrap_or(i64::MAX);
                first_char.saturating_add(covered).saturating_sub(1)
            });

        let encoding = match get("Encoding")? {
            Value::Name(name) => match name.as_str() {
                "WinAnsiEncoding" => TextEncoding::WinAnsi,
                "MacRomanEncoding" => TextEncoding::MacRoman,
                "Identity-H" => Self::charmap_encoding(&base_font, get("ToUnicode")?),
                other => {
                    log::warn!("Font {} has unknown encoding /{}", base_font, other);
                    TextEncoding::Raw
                },
            },
            Value::Dict(enc) => {
                let differences = match enc.get("Differences") {
                    Some(value) => resolve(value)?,
                    None => Value::Null,
                };
                TextEncoding::Differences(differences_map(&differences))
            },
            Value::Null => Self::charmap_encoding(&base_font, get("ToUnicode")?),
            other => {
                log::warn!("Font {} has /Encoding of type {}", base_font, other.type_name());
                TextEncoding::Raw
            },
        };

        Ok(Self {
            base_font,
            first_char,
            last_char,
            widths,
            encoding,
        })
    }

    /// ToUnicode CMap when present and readable, else PDFDocEncoding.
    fn charmap_encoding(base_font: &str, to_unicode: Value) -> TextEncoding {
        if !matches!(to_unicode, Value::Stream { .. }) {
            return TextEncoding::PdfDoc;
        }
        match CMap::from_program(&to_unicode) {
            Ok(cmap) => TextEncoding::CMap(cmap),
            Err(e) => {
                log::warn!("Font {} has an unreadable ToUnicode CMap: {}", base_font, e);
                TextEncoding::Raw
            },
        }
    }

    /// `/BaseFont` as written, including any subset tag.
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    /// Base font with a subset tag such as `ABCDEF+` removed.
    pub fn name(&self) -> &str {
        match self.base_font.find('+') {
            Some(plus) => &self.base_font[plus + 1..],
            None => &self.base_font,
        }
    }

    /// `/FirstChar`.
    pub fn first_char(&self) -> i64 {
        self.first_char
    }

    /// `/LastChar`, or the last code covered by `/Widths` when absent.
    pub fn last_char(&self) -> i64 {
        self.last_char
    }

    /// `/Widths` in thousandths of text space units.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Width of `code`, 0 outside `/Widths`.
    pub fn width(&self, code: u32) -> f64 {
        i64::from(code)
            .checked_sub(self.first_char)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|index| self.widths.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// The code to text mapping.
    pub fn encoding(&self) -> &TextEncoding {
        &self.encoding
    }

    /// Split `raw` into codes with their text.
    pub fn decode(&self, raw: &[u8]) -> Vec<(u32, String)> {
        self.encoding.decode(raw)
    }
}

/// Codes remapped by a `/Differences` array: `[code /name /name code /name]`.
fn differences_map(differences: &Value) -> HashMap<u8, char> {
    let mut map = HashMap::new();
    let items = match differences.as_array() {
        Some(items) => items,
        None => return map,
    };

    let mut code: Option<i64> = None;
    for item in items {
        match item {
            Value::Integer(n) => code = Some(*n),
            Value::Name(name) => {
                if let Some(current) = code {
                    if let (Ok(byte), Some(ch)) = (u8::try_from(current), glyph_name_to_unicode(name)) {
                        map.insert(byte, ch);
                    }
                    code = Some(current.saturating_add(1));
                }
            },
            other => log::debug!("Ignoring {} in /Differences", other.type_name()),
        }
    }
    map
}

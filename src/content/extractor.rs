//! Text extraction from content streams.
//!
//! [`TextExtractor`] is the [`OperatorHandler`] run over a page's content
//! stream. It tracks the text state and emits one [`Glyph`] per character
//! code shown, positioned through the text rendering matrix
//! `Trm = [Tfs*Th 0 0 Tfs 0 Trise] x Tm x CTM`.

use super::graphics_state::{GraphicsStateStack, Matrix};
use crate::error::Result;
use crate::fonts::Font;
use crate::geometry::Rect;
use crate::interpreter::{OperatorHandler, Stack};
use crate::object::{Dict, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

/// One shown character code, in unrotated page space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    /// Font name without subset tag
    pub font: String,
    /// Effective font size (`Trm.a`)
    pub font_size: f64,
    /// Baseline start X (`Trm.e`)
    pub x: f64,
    /// Baseline Y (`Trm.f`)
    pub y: f64,
    /// Advance width on the page
    pub width: f64,
    /// Text of the code
    pub text: String,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Content {
    /// Glyphs in content stream order
    pub text: Vec<Glyph>,
    /// Rectangles from `re`, in user space
    pub rects: Vec<Rect>,
}

impl Content {
    /// Concatenated glyph text.
    pub fn plain_text(&self) -> String {
        self.text.iter().map(|g| g.text.as_str()).collect()
    }
}

/// Loads fonts by resource name; `Ok(None)` when the name is unknown.
type FontLoader<'a> = Box<dyn FnMut(&str) -> Result<Option<Font>> + 'a>;

/// Content stream handler collecting glyphs and rectangles.
pub struct TextExtractor<'a> {
    load_font: FontLoader<'a>,
    fonts: HashMap<String, Rc<Font>>,
    state: GraphicsStateStack,
    content: Content,
}

impl<'a> TextExtractor<'a> {
    /// Extractor that asks `load_font` for each font named by `Tf`.
    ///
    /// Each name is loaded at most once.
    pub fn new(load_font: impl FnMut(&str) -> Result<Option<Font>> + 'a) -> Self {
        Self {
            load_font: Box::new(load_font),
            fonts: HashMap::new(),
            state: GraphicsStateStack::new(),
            content: Content::default(),
        }
    }

    /// The collected content.
    pub fn finish(self) -> Content {
        self.content
    }

    fn font(&mut self, name: &str) -> Result<Rc<Font>> {
        if let Some(font) = self.fonts.get(name) {
            return Ok(Rc::clone(font));
        }
        let font = match (self.load_font)(name)? {
            Some(font) => font,
            None => {
                log::warn!("Font /{} not in page resources", name);
                Font::from_dict(&Dict::new())?
            },
        };
        let font = Rc::new(font);
        self.fonts.insert(name.to_string(), Rc::clone(&font));
        Ok(font)
    }

    fn show_text(&mut self, raw: &[u8]) {
        let gs = self.state.current_mut();
        let font = Rc::clone(&gs.font);

        for (code, text) in font.decode(raw) {
            let trm = gs.text_rendering_matrix();
            let w0 = font.width(code);
            let is_space = text == " ";

            if !is_space {
                self.content.text.push(Glyph {
                    font: font.name().to_string(),
                    font_size: trm.a,
                    x: trm.e,
                    y: trm.f,
                    width: w0 / 1000.0 * trm.a,
                    text,
                });
            }

            let mut tx = w0 / 1000.0 * gs.font_size + gs.char_space;
            if is_space {
                tx += gs.word_space;
            }
            gs.advance(tx * gs.horizontal_scaling);
        }
    }

    fn show_array(&mut self, items: &[Value]) {
        for item in items {
            match item {
                Value::String(raw) => self.show_text(raw),
                other => {
                    let gs = self.state.current_mut();
                    let adjust = other.as_number().unwrap_or(0.0);
                    gs.advance(-adjust / 1000.0 * gs.font_size * gs.horizontal_scaling);
                },
            }
        }
    }
}

impl OperatorHandler for TextExtractor<'_> {
    fn handle(&mut self, stack: &mut Stack, op: &str) -> Result<bool> {
        let args = stack.take_all();

        match op {
            "cm" => {
                if let Some([a, b, c, d, e, f]) = numbers(op, &args) {
                    let gs = self.state.current_mut();
                    gs.ctm = Matrix::new(a, b, c, d, e, f).multiply(&gs.ctm);
                }
            },
            "re" => {
                if let Some([x, y, w, h]) = numbers(op, &args) {
                    self.content.rects.push(Rect::new(x, y, w, h));
                }
            },
            "q" => self.state.save(),
            "Q" => self.state.restore(),
            "BT" => {
                let gs = self.state.current_mut();
                gs.text_matrix = Matrix::identity();
                gs.text_line_matrix = Matrix::identity();
            },
            "ET" => {},
            "T*" => self.state.current_mut().next_line(),
            "Tc" => {
                if let Some([tc]) = numbers(op, &args) {
                    self.state.current_mut().char_space = tc;
                }
            },
            "TD" => {
                if let Some([tx, ty]) = numbers(op, &args) {
                    let gs = self.state.current_mut();
                    gs.leading = -ty;
                    gs.move_text_line(tx, ty);
                }
            },
            "Td" => {
                if let Some([tx, ty]) = numbers(op, &args) {
                    self.state.current_mut().move_text_line(tx, ty);
                }
            },
            "Tf" => match args.as_slice() {
                [Value::Name(name), size] => {
                    let font = self.font(name)?;
                    let gs = self.state.current_mut();
                    gs.font = font;
                    gs.font_size = size.as_number().unwrap_or(0.0);
                },
                _ => log::warn!("Tf with operands {:?}, skipping", args),
            },
            "TL" => {
                if let Some([tl]) = numbers(op, &args) {
                    self.state.current_mut().leading = tl;
                }
            },
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = numbers(op, &args) {
                    let gs = self.state.current_mut();
                    gs.text_matrix = Matrix::new(a, b, c, d, e, f);
                    gs.text_line_matrix = gs.text_matrix;
                }
            },
            "Tr" => {
                if let Some([mode]) = numbers(op, &args) {
                    self.state.current_mut().render_mode = mode as i64;
                }
            },
            "Ts" => {
                if let Some([rise]) = numbers(op, &args) {
                    self.state.current_mut().text_rise = rise;
                }
            },
            "Tw" => {
                if let Some([tw]) = numbers(op, &args) {
                    self.state.current_mut().word_space = tw;
                }
            },
            "Tz" => {
                if let Some([scale]) = numbers(op, &args) {
                    self.state.current_mut().horizontal_scaling = scale / 100.0;
                }
            },
            "Tj" => match args.as_slice() {
                [Value::String(raw)] => self.show_text(raw),
                _ => log::warn!("Tj with operands {:?}, skipping", args),
            },
            "TJ" => match args.as_slice() {
                [Value::Array(items)] => self.show_array(items),
                _ => log::warn!("TJ with operands {:?}, skipping", args),
            },
            "'" => match args.as_slice() {
                [Value::String(raw)] => {
                    self.state.current_mut().next_line();
                    self.show_text(raw);
                },
                _ => log::warn!("' with operands {:?}, skipping", args),
            },
            "\"" => match args.as_slice() {
                [aw, ac, Value::String(raw)] => {
                    let gs = self.state.current_mut();
                    gs.word_space = aw.as_number().unwrap_or(0.0);
                    gs.char_space = ac.as_number().unwrap_or(0.0);
                    gs.next_line();
                    self.show_text(raw);
                },
                _ => log::warn!("\" with operands {:?}, skipping", args),
            },
            _ => {},
        }
        Ok(true)
    }
}

/// Exactly `N` numeric operands, or `None` (logged) for anything else.
fn numbers<const N: usize>(op: &str, args: &[Value]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    if args.len() == N {
        for (slot, arg) in out.iter_mut().zip(args) {
            match arg.as_number() {
                Some(n) => *slot = n,
                None => {
                    log::warn!("{} expects numbers, got {}", op, arg.type_name());
                    return None;
                },
            }
        }
        return Some(out);
    }
    log::warn!("{} expects {} operands, got {}", op, N, args.len());
    None
}

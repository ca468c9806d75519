//! Fonts and text encodings.
//!
//! Maps the bytes of shown strings to Unicode text and glyph widths.

pub mod cmap;
pub mod encoding;
mod font;
mod glyph_list;

pub use cmap::CMap;
pub use font::{Font, TextEncoding};

//! Content stream execution.
//!
//! Page content streams run through the [interpreter](crate::interpreter)
//! with a [`TextExtractor`] handling the text and path operators.

pub mod extractor;
pub mod graphics_state;

pub use extractor::{Content, Glyph, TextExtractor};
pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};

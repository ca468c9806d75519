// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::match_like_matches_macro)]

//! # pdftext
//!
//! PDF object reader and text extractor.
//!
//! ## Layers
//!
//! - **Objects**: tokenizer with one-token pushback, object reader, and
//!   cross-reference resolution (classic tables, xref streams, object streams)
//!   with a memoising, cycle-detecting resolver
//! - **Pages**: page tree walk with inherited attributes
//! - **Programs**: a small PostScript-style interpreter that runs content
//!   streams and ToUnicode CMaps
//! - **Text**: glyph records in page space, then reading-order text with
//!   word, line and hyphenation handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdftext::PdfDocument;
//! use pdftext::layout::TextAccumulator;
//!
//! # fn main() -> pdftext::Result<()> {
//! let doc = PdfDocument::open("paper.pdf")?;
//! let mut text = TextAccumulator::new();
//! for number in 1..=doc.page_count()? {
//!     if let Some(page) = doc.page(number)? {
//!         text.add_page(&page.content()?.text);
//!     }
//! }
//! println!("{}", text.collapsed());
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Core PDF parsing
pub mod document;
pub mod lexer;
pub mod object;
pub mod objstm;
pub mod parser;
/// Parser configuration options
pub mod parser_config;
pub mod xref;

// Stream decoders
pub mod decoders;

// Pages and programs
pub mod interpreter;
pub mod page;

// Text extraction
pub mod content;
pub mod fonts;
pub mod geometry;
pub mod layout;

// Document structure
pub mod outline;

// Re-exports
pub use content::{Content, Glyph};
pub use document::PdfDocument;
pub use error::{Error, Result};
pub use object::{Dict, ObjectRef, Value};
pub use outline::Outline;
pub use page::Page;
pub use parser_config::ParserOptions;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

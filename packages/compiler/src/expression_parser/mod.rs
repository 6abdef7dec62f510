//! Expression Parser Module
//!
//! Binding expressions are opaque code; only interpolation delimiters and
//! filter pipes are understood.

pub mod filter_parser;
pub mod text_parser;

pub use filter_parser::{parse_filters, Nesting, ScanState};
pub use text_parser::{parse_text, TextParseResult, TextToken};

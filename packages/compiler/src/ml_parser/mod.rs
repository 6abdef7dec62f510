//! ML (Markup Language) Parser Module
//!
//! Tokenizer and tree builder for HTML templates.

pub mod ast;
pub mod entities;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tags;
pub mod tokens;

pub use ast::*;
pub use lexer::{parse_html, tokenize, TokenHandler, TokenizeResult};
pub use parser::{parse, ParseResult};
pub use tags::*;
pub use tokens::*;

//! ML Parser Tokens
//!
//! Structural events emitted by the tokenizer.

use crate::parse_util::SourceRange;
use serde::Serialize;

/// Attribute record of a start tag. `value` is already entity decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// Offsets are only recorded when source ranges are requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
            start: None,
            end: None,
        }
    }

    pub fn range(&self) -> Option<SourceRange> {
        self.start.map(|start| SourceRange {
            start,
            end: self.end,
        })
    }
}

/// Token types for HTML parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenType {
    StartTag,
    EndTag,
    Text,
    Comment,
    DocType,
}

/// Token representation, `[start, end)` byte offsets into the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        unary: bool,
        start: usize,
        end: usize,
    },
    EndTag {
        name: String,
        start: usize,
        end: usize,
    },
    Text {
        text: String,
        start: usize,
        end: usize,
    },
    Comment {
        text: String,
        start: usize,
        end: usize,
    },
    DocType {
        text: String,
        start: usize,
        end: usize,
    },
}

impl Token {
    pub fn token_type(&self) -> TokenType {
        match self {
            Token::StartTag { .. } => TokenType::StartTag,
            Token::EndTag { .. } => TokenType::EndTag,
            Token::Text { .. } => TokenType::Text,
            Token::Comment { .. } => TokenType::Comment,
            Token::DocType { .. } => TokenType::DocType,
        }
    }

    pub fn range(&self) -> SourceRange {
        match self {
            Token::StartTag { start, end, .. }
            | Token::EndTag { start, end, .. }
            | Token::Text { start, end, .. }
            | Token::Comment { start, end, .. }
            | Token::DocType { start, end, .. } => SourceRange::new(*start, *end),
        }
    }
}

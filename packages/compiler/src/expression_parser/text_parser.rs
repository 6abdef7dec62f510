//! Text Parser
//!
//! Splits a text run on interpolation delimiters and builds the string
//! concatenation that renders it.

use super::filter_parser::parse_filters;
use crate::util::{json_string, Memo};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static DEFAULT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").unwrap());

static DELIMITER_RE_CACHE: Lazy<Memo<(String, String), Regex>> = Lazy::new(Memo::new);

/// Interpolation pattern for a custom delimiter pair, compiled once per pair.
///
/// Both delimiters must be non-empty; `CompilerOptions::delimiter_pair`
/// guarantees that for compiler input.
pub fn delimiter_regex(open: &str, close: &str) -> Regex {
    DELIMITER_RE_CACHE.get_or_insert_with((open.to_string(), close.to_string()), |(open, close)| {
        Regex::new(&format!(
            "(?s){}(.+?){}",
            regex::escape(open),
            regex::escape(close)
        ))
        .unwrap()
    })
}

/// Literal text or an interpolated expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextToken {
    Literal(String),
    Binding {
        #[serde(rename = "@binding")]
        binding: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextParseResult {
    pub expression: String,
    pub tokens: Vec<TextToken>,
}

/// Parse interpolations in `text`. Returns `None` when there are none.
pub fn parse_text(text: &str, delimiters: Option<(&str, &str)>) -> Option<TextParseResult> {
    let custom;
    let tag_re = match delimiters {
        Some((open, close)) => {
            custom = delimiter_regex(open, close);
            &custom
        }
        None => &*DEFAULT_TAG_RE,
    };
    if !tag_re.is_match(text) {
        return None;
    }

    let mut parts = Vec::new();
    let mut tokens = Vec::new();
    let mut last_index = 0;

    for caps in tag_re.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last_index {
            let literal = &text[last_index..whole.start()];
            parts.push(json_string(literal));
            tokens.push(TextToken::Literal(literal.to_string()));
        }
        let exp = parse_filters(inner.as_str().trim());
        parts.push(format!("_s({})", exp));
        tokens.push(TextToken::Binding { binding: exp });
        last_index = whole.end();
    }

    if last_index < text.len() {
        let literal = &text[last_index..];
        parts.push(json_string(literal));
        tokens.push(TextToken::Literal(literal.to_string()));
    }

    Some(TextParseResult {
        expression: parts.join("+"),
        tokens,
    })
}

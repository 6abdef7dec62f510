//! Compiler configuration
//!
//! Plain data is deserializable from JSON; the tag vocabulary predicates are
//! function pointers injected by a platform layer (see `CompilerOptions::web`).

use crate::error::{CompileError, Result};
use crate::ml_parser::html_tags;
use crate::parse_util::{CompileWarning, WarningSink};
use serde::Deserialize;
use std::fmt;

/// Predicate over a tag name.
pub type TagPredicate = fn(&str) -> bool;

/// Default predicate: nothing matches.
pub fn no(_tag: &str) -> bool {
    false
}

/// How whitespace-only text between elements is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceMode {
    #[default]
    Preserve,
    Condense,
}

#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Interpolation delimiters, `{{` / `}}` when unset
    pub delimiters: Option<(String, String)>,
    /// Extra comma separated node keys that do not disqualify a node from being static
    pub static_keys: String,
    pub optimize: bool,
    /// Apply the HTML implicit-close rules (`<p>` before block content, sibling auto-close)
    pub expect_html: bool,
    #[serde(alias = "comments")]
    pub should_keep_comments: bool,
    pub should_decode_newlines: bool,
    pub should_decode_newlines_for_href: bool,
    pub output_source_range: bool,
    pub preserve_whitespace: bool,
    pub whitespace: WhitespaceMode,

    #[serde(skip)]
    pub is_reserved_tag: TagPredicate,
    #[serde(skip)]
    pub is_unary_tag: TagPredicate,
    #[serde(skip)]
    pub can_be_left_open_tag: TagPredicate,
    #[serde(skip)]
    pub is_non_phrasing_tag: TagPredicate,
    #[serde(skip)]
    pub is_pre_tag: TagPredicate,
    /// Extra raw-text elements beyond script/style/textarea
    #[serde(skip)]
    pub is_raw_text_tag: TagPredicate,
    #[serde(skip)]
    pub warn: Option<WarningSink>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            delimiters: None,
            static_keys: String::new(),
            optimize: true,
            expect_html: false,
            should_keep_comments: false,
            should_decode_newlines: false,
            should_decode_newlines_for_href: false,
            output_source_range: false,
            preserve_whitespace: true,
            whitespace: WhitespaceMode::Preserve,
            is_reserved_tag: no,
            is_unary_tag: no,
            can_be_left_open_tag: no,
            is_non_phrasing_tag: no,
            is_pre_tag: no,
            is_raw_text_tag: no,
            warn: None,
        }
    }
}

impl CompilerOptions {
    /// Options for HTML templates: HTML/SVG vocabulary, HTML implicit-close
    /// rules and the static class/style keys.
    pub fn web() -> Self {
        CompilerOptions {
            expect_html: true,
            static_keys: "staticClass,staticStyle".to_string(),
            ..Self::default()
        }
        .with_web_platform()
    }

    /// Parse options from JSON. Fields that are absent keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(CompileError::from)
    }

    /// Install the HTML tag vocabulary predicates.
    pub fn with_web_platform(mut self) -> Self {
        self.is_reserved_tag = html_tags::is_reserved_tag;
        self.is_unary_tag = html_tags::is_unary_tag;
        self.can_be_left_open_tag = html_tags::can_be_left_open_tag;
        self.is_non_phrasing_tag = html_tags::is_non_phrasing_tag;
        self.is_pre_tag = html_tags::is_pre_tag;
        self
    }

    pub fn with_warning_sink(mut self, sink: WarningSink) -> Self {
        self.warn = Some(sink);
        self
    }

    /// The delimiter pair, validated. `None` means the default `{{ }}`.
    pub fn delimiter_pair(&self) -> Result<Option<(&str, &str)>> {
        match &self.delimiters {
            None => Ok(None),
            Some((open, close)) if open.is_empty() || close.is_empty() => {
                Err(CompileError::InvalidDelimiters {
                    open: open.clone(),
                    close: close.clone(),
                })
            }
            Some((open, close)) => Ok(Some((open.as_str(), close.as_str()))),
        }
    }

    pub(crate) fn emit_warning(&self, warning: &CompileWarning) {
        if let Some(sink) = &self.warn {
            sink(warning);
        }
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("delimiters", &self.delimiters)
            .field("static_keys", &self.static_keys)
            .field("optimize", &self.optimize)
            .field("expect_html", &self.expect_html)
            .field("should_keep_comments", &self.should_keep_comments)
            .field("should_decode_newlines", &self.should_decode_newlines)
            .field(
                "should_decode_newlines_for_href",
                &self.should_decode_newlines_for_href,
            )
            .field("output_source_range", &self.output_source_range)
            .field("preserve_whitespace", &self.preserve_whitespace)
            .field("whitespace", &self.whitespace)
            .field("warn", &self.warn.is_some())
            .finish_non_exhaustive()
    }
}

//! ML Parser Lexer
//!
//! Streaming HTML tokenizer. Scans the template once, left to right, and
//! reports structural events to a `TokenHandler` in source order. Malformed
//! markup never aborts the scan: it degrades to text and warnings.

use super::entities::decode_attr;
use super::tags::{get_content_type, ignore_first_lf, TagContentType};
use super::tokens::{Attribute, Token};
use crate::chars;
use crate::config::CompilerOptions;
use crate::parse_util::{CompileWarning, SourceRange, WarningKind};
use crate::util::Memo;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Name characters allowed after the first one, beyond ASCII
const UNICODE_NAME_RANGES: &str = r"\x{00B7}\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{037D}\x{037F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}";

static QNAME_CAPTURE: Lazy<String> = Lazy::new(|| {
    let ncname = format!(r"[a-zA-Z_][\-\.0-9_a-zA-Z{}]*", UNICODE_NAME_RANGES);
    format!(r"((?:{ncname}:)?{ncname})")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([^\s"'<>/=]+)(?:\s*(=)\s*(?:"([^"]*)"+|'([^']*)'+|([^\s"'=<>`]+)))?"#)
        .unwrap()
});
static DYNAMIC_ARG_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*((?:v-[\w-]+:|@|:|#)\[[^=]+?\][^\s"'<>/=]*)(?:\s*(=)\s*(?:"([^"]*)"+|'([^']*)'+|([^\s"'=<>`]+)))?"#,
    )
    .unwrap()
});
static START_TAG_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^<{}", *QNAME_CAPTURE)).unwrap());
static START_TAG_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(/?)>").unwrap());
static END_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^</{}[^>]*>", *QNAME_CAPTURE)).unwrap());
static DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^<!DOCTYPE [^>]+>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<!--").unwrap());
static CONDITIONAL_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<!\[").unwrap());

static COMMENT_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").unwrap());
static CDATA_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// Closing-tag patterns for raw-text elements, one per lower-cased tag
static RAW_TEXT_END: Lazy<Memo<String, Regex>> = Lazy::new(Memo::new);

fn raw_text_end_pattern(lower_tag: &str) -> Regex {
    RAW_TEXT_END.get_or_insert_with(lower_tag.to_string(), |tag| {
        Regex::new(&format!(r"(?is)^(.*?)(</{}[^>]*>)", regex::escape(tag))).unwrap()
    })
}

/// Receives tokenizer events in source order.
///
/// Every method has an empty default so handlers only implement what they need.
pub trait TokenHandler {
    fn start_tag(
        &mut self,
        _name: &str,
        _attrs: Vec<Attribute>,
        _unary: bool,
        _start: usize,
        _end: usize,
    ) {
    }

    fn end_tag(&mut self, _name: &str, _start: usize, _end: usize) {}

    fn text(&mut self, _text: &str, _start: usize, _end: usize) {}

    /// Only called when comments are kept
    fn comment(&mut self, _text: &str, _start: usize, _end: usize) {}

    fn doctype(&mut self, _text: &str, _start: usize, _end: usize) {}

    fn warn(&mut self, _warning: CompileWarning) {}
}

/// Tokenize `source`, reporting every event to `handler`.
pub fn parse_html<H: TokenHandler>(source: &str, options: &CompilerOptions, handler: &mut H) {
    let mut tokenizer = HtmlTokenizer {
        source,
        index: 0,
        stack: Vec::new(),
        options,
        handler,
    };
    tokenizer.tokenize();
}

/// Tokenization result
#[derive(Debug, Clone, Default)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub warnings: Vec<CompileWarning>,
}

/// Tokenize `source` into a flat list of tokens.
pub fn tokenize(source: &str, options: &CompilerOptions) -> TokenizeResult {
    let mut collector = TokenizeResult::default();
    parse_html(source, options, &mut collector);
    collector
}

impl TokenHandler for TokenizeResult {
    fn start_tag(&mut self, name: &str, attrs: Vec<Attribute>, unary: bool, start: usize, end: usize) {
        self.tokens.push(Token::StartTag {
            name: name.to_string(),
            attrs,
            unary,
            start,
            end,
        });
    }

    fn end_tag(&mut self, name: &str, start: usize, end: usize) {
        self.tokens.push(Token::EndTag {
            name: name.to_string(),
            start,
            end,
        });
    }

    fn text(&mut self, text: &str, start: usize, end: usize) {
        self.tokens.push(Token::Text {
            text: text.to_string(),
            start,
            end,
        });
    }

    fn comment(&mut self, text: &str, start: usize, end: usize) {
        self.tokens.push(Token::Comment {
            text: text.to_string(),
            start,
            end,
        });
    }

    fn doctype(&mut self, text: &str, start: usize, end: usize) {
        self.tokens.push(Token::DocType {
            text: text.to_string(),
            start,
            end,
        });
    }

    fn warn(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }
}

/// Open, non-unary element
#[derive(Debug, Clone)]
struct OpenTag {
    tag: String,
    lower_tag: String,
    start: usize,
    end: usize,
}

#[derive(Debug)]
struct AttrMatch {
    name: String,
    value: String,
    start: usize,
    end: usize,
}

#[derive(Debug)]
struct StartTagMatch {
    tag_name: String,
    attrs: Vec<AttrMatch>,
    unary_slash: bool,
    start: usize,
    end: usize,
}

struct HtmlTokenizer<'a, H: TokenHandler> {
    source: &'a str,
    index: usize,
    stack: Vec<OpenTag>,
    options: &'a CompilerOptions,
    handler: &'a mut H,
}

impl<'a, H: TokenHandler> HtmlTokenizer<'a, H> {
    fn tokenize(&mut self) {
        while self.index < self.source.len() {
            let last = self.index;

            match self.raw_text_tag() {
                Some((lower_tag, content_type)) => self.consume_raw_text(&lower_tag, content_type),
                None => self.consume_markup(),
            }

            // Nothing consumed: give up on the rest as text. Open elements
            // are reported by the final flush instead.
            if self.index == last {
                let rest = &self.source[self.index..];
                self.handler.text(rest, self.index, self.source.len());
                if self.stack.is_empty() {
                    self.warn(
                        WarningKind::MalformedTag,
                        format!("Mal-formatted tag at end of template: \"{}\"", rest),
                        SourceRange::at(self.source.len()),
                    );
                }
                self.index = self.source.len();
                break;
            }
        }

        // Clean up any remaining tags
        self.parse_end_tag(None, self.index, self.index);
    }

    fn advance(&mut self, n: usize) {
        self.index += n;
    }

    fn last_tag(&self) -> Option<&str> {
        self.stack.last().map(|open| open.tag.as_str())
    }

    fn raw_text_tag(&self) -> Option<(String, TagContentType)> {
        let open = self.stack.last()?;
        match get_content_type(&open.lower_tag, self.options.is_raw_text_tag) {
            TagContentType::ParsableData => None,
            content_type => Some((open.lower_tag.clone(), content_type)),
        }
    }

    fn warn(&mut self, kind: WarningKind, msg: String, range: SourceRange) {
        self.handler.warn(CompileWarning::new(kind, msg, Some(range)));
    }

    fn consume_markup(&mut self) {
        let source = self.source;
        let rest = &source[self.index..];

        if rest.starts_with(chars::LT) {
            if COMMENT.is_match(rest) {
                if let Some(comment_end) = rest[4..].find("-->").map(|pos| pos + 4) {
                    if self.options.should_keep_comments {
                        self.handler
                            .comment(&rest[4..comment_end], self.index, self.index + comment_end + 3);
                    }
                    self.advance(comment_end + 3);
                    return;
                }
            }

            // Downlevel-revealed conditional comments are dropped entirely
            if CONDITIONAL_COMMENT.is_match(rest) {
                if let Some(conditional_end) = rest.find("]>") {
                    self.advance(conditional_end + 2);
                    return;
                }
            }

            if let Some(doctype) = DOCTYPE.find(rest) {
                self.handler
                    .doctype(doctype.as_str(), self.index, self.index + doctype.end());
                self.advance(doctype.end());
                return;
            }

            if let Some(caps) = END_TAG.captures(rest) {
                let start = self.index;
                let len = caps.get(0).map_or(0, |m| m.end());
                let name = caps.get(1).map_or("", |m| m.as_str());
                self.advance(len);
                self.parse_end_tag(Some(name), start, self.index);
                return;
            }

            if let Some(start_tag) = parse_start_tag(rest, self.index) {
                let tag_name = start_tag.tag_name.clone();
                self.advance(start_tag.end - start_tag.start);
                self.handle_start_tag(start_tag);
                if ignore_first_lf(&tag_name) && source[self.index..].starts_with('\n') {
                    self.advance(1);
                }
                return;
            }
        }

        // A `<` that does not open valid markup is plain text, up to the
        // next position where real markup begins.
        let from = if rest.starts_with(chars::LT) { 1 } else { 0 };
        let text_end = scan_text_end(rest, from);
        let text = &rest[..text_end];
        let start = self.index;
        self.advance(text_end);
        self.handler.text(text, start, self.index);

        if text_end == rest.len() && text.starts_with(chars::LT) {
            self.warn(
                WarningKind::MalformedTag,
                format!("Mal-formatted tag at end of template: \"{}\"", text),
                SourceRange::new(start, self.index),
            );
        }
    }

    fn consume_raw_text(&mut self, lower_tag: &str, content_type: TagContentType) {
        let source = self.source;
        let rest = &source[self.index..];
        let pattern = raw_text_end_pattern(lower_tag);

        let Some(caps) = pattern.captures(rest) else {
            // No closing tag: close the element, the no-progress guard
            // takes the remaining input as text.
            self.parse_end_tag(Some(lower_tag), self.index, self.index);
            return;
        };
        let (Some(whole), Some(text), Some(end_tag)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            return;
        };

        let mut content: Cow<'_, str> = Cow::Borrowed(text.as_str());
        if content_type == TagContentType::RawText {
            let unwrapped = COMMENT_MARKERS.replace_all(&content, "$1").into_owned();
            content = Cow::Owned(CDATA_MARKERS.replace_all(&unwrapped, "$1").into_owned());
        }

        let mut content_start = self.index;
        if ignore_first_lf(lower_tag) && content.starts_with('\n') {
            content = Cow::Owned(content[1..].to_string());
            content_start += 1;
        }
        if !content.is_empty() {
            self.handler
                .text(&content, content_start, self.index + text.end());
        }

        let end_start = self.index + end_tag.start();
        self.advance(whole.end());
        self.parse_end_tag(Some(lower_tag), end_start, self.index);
    }

    fn handle_start_tag(&mut self, start_tag: StartTagMatch) {
        let tag_name = start_tag.tag_name;

        if self.options.expect_html {
            // A paragraph cannot contain block content
            if self.last_tag() == Some("p") && (self.options.is_non_phrasing_tag)(&tag_name) {
                trace!("<{}> implicitly closes <p>", tag_name);
                self.parse_end_tag(Some("p"), self.index, self.index);
            }
            if (self.options.can_be_left_open_tag)(&tag_name)
                && self.last_tag() == Some(tag_name.as_str())
            {
                trace!("<{}> implicitly closes its open sibling", tag_name);
                self.parse_end_tag(Some(&tag_name), self.index, self.index);
            }
        }

        let unary = (self.options.is_unary_tag)(&tag_name) || start_tag.unary_slash;

        let attrs: Vec<Attribute> = start_tag
            .attrs
            .into_iter()
            .map(|attr| {
                let decode_newlines = if tag_name == "a" && attr.name == "href" {
                    self.options.should_decode_newlines_for_href
                } else {
                    self.options.should_decode_newlines
                };
                let (start, end) = if self.options.output_source_range {
                    (Some(attr.start), Some(attr.end))
                } else {
                    (None, None)
                };
                Attribute {
                    value: decode_attr(&attr.value, decode_newlines),
                    name: attr.name,
                    start,
                    end,
                }
            })
            .collect();

        if !unary {
            self.stack.push(OpenTag {
                lower_tag: tag_name.to_lowercase(),
                tag: tag_name.clone(),
                start: start_tag.start,
                end: start_tag.end,
            });
        }

        self.handler
            .start_tag(&tag_name, attrs, unary, start_tag.start, start_tag.end);
    }

    /// Close the nearest open element named `tag_name` and everything opened
    /// after it. Without a name, close everything.
    fn parse_end_tag(&mut self, tag_name: Option<&str>, start: usize, end: usize) {
        let lower_tag = tag_name.map(str::to_lowercase);
        let pos = match &lower_tag {
            Some(lower) => self.stack.iter().rposition(|open| &open.lower_tag == lower),
            None => Some(0),
        };

        match pos {
            Some(pos) => {
                let closing: Vec<OpenTag> = self.stack.drain(pos..).rev().collect();
                let matched = closing.len().saturating_sub(1);
                for (i, open) in closing.into_iter().enumerate() {
                    if tag_name.is_none() {
                        self.warn(
                            WarningKind::UnclosedTag,
                            format!("tag <{}> has no matching end tag.", open.tag),
                            SourceRange::new(open.start, open.end),
                        );
                    } else if i < matched {
                        trace!(
                            "</{}> implicitly closes <{}>",
                            tag_name.unwrap_or_default(),
                            open.tag
                        );
                        self.warn(
                            WarningKind::UnmatchedEndTag,
                            format!("tag <{}> has no matching end tag.", open.tag),
                            SourceRange::new(open.start, open.end),
                        );
                    }
                    self.handler.end_tag(&open.tag, start, end);
                }
            }
            // Browsers render a stray </br> as <br>
            None if lower_tag.as_deref() == Some("br") => {
                let name = tag_name.unwrap_or("br");
                self.handler.start_tag(name, Vec::new(), true, start, end);
            }
            // ...and a stray </p> as an empty paragraph
            None if lower_tag.as_deref() == Some("p") => {
                let name = tag_name.unwrap_or("p");
                self.handler.start_tag(name, Vec::new(), false, start, end);
                self.handler.end_tag(name, start, end);
            }
            None => {}
        }
    }
}

/// Match a complete start tag at the beginning of `rest`. A tag whose
/// attributes cannot be parsed before the closing `>` does not match.
fn parse_start_tag(rest: &str, offset: usize) -> Option<StartTagMatch> {
    let open = START_TAG_OPEN.captures(rest)?;
    let tag_name = open.get(1)?.as_str().to_string();
    let mut cursor = open.get(0)?.end();
    let mut attrs = Vec::new();

    loop {
        let tail = &rest[cursor..];
        if let Some(close) = START_TAG_CLOSE.captures(tail) {
            let unary_slash = close.get(1).map_or(false, |m| !m.as_str().is_empty());
            cursor += close.get(0)?.end();
            return Some(StartTagMatch {
                tag_name,
                attrs,
                unary_slash,
                start: offset,
                end: offset + cursor,
            });
        }

        let attr = DYNAMIC_ARG_ATTRIBUTE
            .captures(tail)
            .or_else(|| ATTRIBUTE.captures(tail))?;
        let whole = attr.get(0)?.as_str();
        let leading_whitespace = whole.len() - whole.trim_start().len();
        let value = attr
            .get(3)
            .or_else(|| attr.get(4))
            .or_else(|| attr.get(5))
            .map_or("", |m| m.as_str());

        attrs.push(AttrMatch {
            name: attr.get(1)?.as_str().to_string(),
            value: value.to_string(),
            start: offset + cursor + leading_whitespace,
            end: offset + cursor + whole.len(),
        });
        cursor += whole.len();
    }
}

fn starts_markup(s: &str) -> bool {
    END_TAG.is_match(s)
        || START_TAG_OPEN.is_match(s)
        || COMMENT.is_match(s)
        || CONDITIONAL_COMMENT.is_match(s)
}

/// Offset of the first `<` at or after `from` that begins real markup, or
/// the length of `rest` when there is none.
fn scan_text_end(rest: &str, from: usize) -> usize {
    let mut cursor = from;
    while let Some(pos) = rest[cursor..].find(chars::LT) {
        let candidate = cursor + pos;
        if starts_markup(&rest[candidate..]) {
            return candidate;
        }
        cursor = candidate + 1;
    }
    rest.len()
}

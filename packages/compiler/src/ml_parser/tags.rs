//! ML Parser Tags
//!
//! The fixed HTML parsing quirks the tokenizer knows about. Everything
//! platform specific (void tags, reserved tags, block tags) is injected
//! through `CompilerOptions`.

use crate::config::TagPredicate;

/// Tag content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    /// Content up to the closing tag is emitted verbatim (script, style, textarea)
    PlainText,
    /// Content is not tokenized, but comment and CDATA markers are unwrapped
    RawText,
    ParsableData,
}

/// Elements whose content is never tokenized as markup
const PLAIN_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Elements that drop a newline directly following their start tag
const IGNORE_FIRST_LF_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Tags handled by the runtime itself rather than by the platform
const BUILT_IN_TAGS: &[&str] = &["slot", "component"];

pub fn is_plain_text_element(tag_name: &str) -> bool {
    PLAIN_TEXT_ELEMENTS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag_name))
}

pub fn ignore_first_lf(tag_name: &str) -> bool {
    IGNORE_FIRST_LF_ELEMENTS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag_name))
}

pub fn is_built_in_tag(tag_name: &str) -> bool {
    BUILT_IN_TAGS.contains(&tag_name)
}

/// Resolve how the content of `tag_name` is scanned.
///
/// `is_raw_text_tag` lets a platform declare additional raw elements on top
/// of the fixed plain-text set.
pub fn get_content_type(tag_name: &str, is_raw_text_tag: TagPredicate) -> TagContentType {
    if is_plain_text_element(tag_name) {
        TagContentType::PlainText
    } else if is_raw_text_tag(tag_name) {
        TagContentType::RawText
    } else {
        TagContentType::ParsableData
    }
}

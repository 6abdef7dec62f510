//! Character references decoded in attribute values and text

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENCODED_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:lt|gt|quot|amp|#39);").unwrap());
static ENCODED_ATTR_WITH_NEW_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:lt|gt|quot|amp|#39|#10|#9);").unwrap());

fn decode_entity(entity: &str) -> &'static str {
    match entity {
        "&lt;" => "<",
        "&gt;" => ">",
        "&quot;" => "\"",
        "&amp;" => "&",
        "&#10;" => "\n",
        "&#9;" => "\t",
        "&#39;" => "'",
        _ => "",
    }
}

/// Decode the fixed set of character references in an attribute value.
///
/// `&#10;` and `&#9;` are only decoded when `decode_newlines` is set, for
/// templates read back from `innerHTML` in browsers that encode them.
pub fn decode_attr(value: &str, decode_newlines: bool) -> String {
    let re = if decode_newlines {
        &*ENCODED_ATTR_WITH_NEW_LINES
    } else {
        &*ENCODED_ATTR
    };
    re.replace_all(value, |caps: &Captures| decode_entity(&caps[0]))
        .into_owned()
}

/// Decode character references in text content
pub fn decode_text(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    decode_attr(text, true)
}

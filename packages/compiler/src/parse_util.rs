//! Parse Utilities
//!
//! Source ranges and the recoverable warnings reported while compiling.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Byte range `[start, end)` into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        SourceRange { start, end: Some(end) }
    }

    pub fn at(start: usize) -> Self {
        SourceRange { start, end: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// An element was closed implicitly by the end tag of one of its ancestors.
    UnmatchedEndTag,
    /// An element was still open when the input ran out.
    UnclosedTag,
    /// Unparsable markup at the end of the template.
    MalformedTag,
    /// Root, sibling or directive placement problems found while building the tree.
    TemplateStructure,
    /// A tag with side effects (`<script>`, `<style>`) that is left out of the tree.
    ForbiddenTag,
}

/// A recoverable problem. Compilation always continues after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileWarning {
    pub kind: WarningKind,
    pub msg: String,
    pub range: Option<SourceRange>,
}

/// Caller supplied sink that receives every warning as it is produced.
pub type WarningSink = Arc<dyn Fn(&CompileWarning) + Send + Sync>;

impl CompileWarning {
    pub fn new(kind: WarningKind, msg: impl Into<String>, range: Option<SourceRange>) -> Self {
        CompileWarning {
            kind,
            msg: msg.into(),
            range,
        }
    }

    /// Render the message together with the source around the warning offset.
    pub fn contextual_message(&self, source: &str) -> String {
        match self.range {
            Some(range) => match get_context(source, range.start, 100, 3) {
                Some((before, after)) => {
                    format!("{} (\"{}[WARNING ->]{}\")", self.msg, before, after)
                }
                None => self.msg.clone(),
            },
            None => self.msg.clone(),
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(SourceRange { start, end: Some(end) }) => {
                write!(f, "{} @{}..{}", self.msg, start, end)
            }
            Some(SourceRange { start, end: None }) => write!(f, "{} @{}", self.msg, start),
            None => f.write_str(&self.msg),
        }
    }
}

/// Return the source around `offset`, up to `max_chars` or `max_lines` on each side.
fn get_context(
    content: &str,
    offset: usize,
    max_chars: usize,
    max_lines: usize,
) -> Option<(String, String)> {
    if content.is_empty() {
        return None;
    }
    let offset = floor_char_boundary(content, offset.min(content.len()));

    let before: String = {
        let mut chars = Vec::new();
        let mut lines = 0;
        for ch in content[..offset].chars().rev().take(max_chars) {
            if ch == '\n' {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            chars.push(ch);
        }
        chars.into_iter().rev().collect()
    };

    let after: String = {
        let mut out = String::new();
        let mut lines = 0;
        for ch in content[offset..].chars().take(max_chars) {
            if ch == '\n' {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            out.push(ch);
        }
        out
    };

    Some((before, after))
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

//! Filter Parser
//!
//! Rewrites a pipe filter chain (`value | capitalize | truncate(10)`) into
//! nested filter calls (`_f("truncate")(_f("capitalize")(value),10)`).
//! Everything else in the expression is passed through untouched.

use crate::chars;

/// Literal context of the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    TemplateLiteral,
    Regex,
}

impl ScanState {
    /// Next state after reading `ch`.
    ///
    /// `prev` is the character before `ch`, used for escapes. `regex_allowed`
    /// tells whether a `/` read in code starts a regular expression literal.
    pub fn next(self, ch: char, prev: Option<char>, regex_allowed: bool) -> ScanState {
        let escaped = prev == Some(chars::BACKSLASH);
        match self {
            ScanState::Code => match ch {
                chars::SQ => ScanState::SingleQuote,
                chars::DQ => ScanState::DoubleQuote,
                chars::BT => ScanState::TemplateLiteral,
                chars::SLASH if regex_allowed => ScanState::Regex,
                _ => ScanState::Code,
            },
            ScanState::SingleQuote if ch == chars::SQ && !escaped => ScanState::Code,
            ScanState::DoubleQuote if ch == chars::DQ && !escaped => ScanState::Code,
            ScanState::TemplateLiteral if ch == chars::BT && !escaped => ScanState::Code,
            ScanState::Regex if ch == chars::SLASH && !escaped => ScanState::Code,
            state => state,
        }
    }
}

/// Open `{`, `[` and `(` counts while scanning code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nesting {
    pub curly: i32,
    pub square: i32,
    pub paren: i32,
}

impl Nesting {
    pub fn track(&mut self, ch: char) {
        match ch {
            chars::LPAREN => self.paren += 1,
            chars::RPAREN => self.paren -= 1,
            chars::LBRACKET => self.square += 1,
            chars::RBRACKET => self.square -= 1,
            chars::LBRACE => self.curly += 1,
            chars::RBRACE => self.curly -= 1,
            _ => {}
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.curly == 0 && self.square == 0 && self.paren == 0
    }
}

/// Parse the filter chain of `exp` and return the rewritten expression.
pub fn parse_filters(exp: &str) -> String {
    let chars: Vec<(usize, char)> = exp.char_indices().collect();
    let mut state = ScanState::Code;
    let mut nesting = Nesting::default();
    let mut expression: Option<&str> = None;
    let mut filters: Vec<&str> = Vec::new();
    let mut last_filter_index = 0;
    let mut prev: Option<char> = None;

    for (k, &(offset, ch)) in chars.iter().enumerate() {
        let next = chars.get(k + 1).map(|&(_, c)| c);
        let is_separator = state == ScanState::Code
            && ch == chars::PIPE
            && next != Some(chars::PIPE)
            && prev != Some(chars::PIPE)
            && nesting.is_balanced();

        if is_separator {
            match expression {
                None => expression = Some(exp[..offset].trim()),
                Some(_) => filters.push(exp[last_filter_index..offset].trim()),
            }
            last_filter_index = offset + 1;
        } else {
            if state == ScanState::Code {
                nesting.track(ch);
            }
            let regex_allowed = ch == chars::SLASH && !preceded_by_operand(&chars[..k]);
            state = state.next(ch, prev, regex_allowed);
        }
        prev = Some(ch);
    }

    let mut result = match expression {
        None => exp.trim().to_string(),
        Some(expression) => {
            filters.push(exp[last_filter_index..].trim());
            expression.to_string()
        }
    };
    for filter in filters {
        result = wrap_filter(&result, filter);
    }
    result
}

/// Whether the nearest non-space character before the cursor ends an
/// operand, making a `/` a division.
fn preceded_by_operand(before: &[(usize, char)]) -> bool {
    before
        .iter()
        .rev()
        .map(|&(_, c)| c)
        .find(|&c| c != chars::SPACE)
        .map_or(false, chars::is_division_context)
}

fn wrap_filter(exp: &str, filter: &str) -> String {
    match filter.find(chars::LPAREN) {
        None => format!("_f(\"{}\")({})", filter, exp),
        Some(i) => {
            let name = &filter[..i];
            let args = &filter[i + 1..];
            if args == ")" {
                format!("_f(\"{}\")({})", name, exp)
            } else {
                format!("_f(\"{}\")({},{}", name, exp, args)
            }
        }
    }
}

/*
 * Character Codes
 */

//! Character constants used by the template scanners

// Special characters
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';

// Punctuation
pub const DQ: char = '"';
pub const DOLLAR: char = '$';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const PLUS: char = '+';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const LT: char = '<';

// Brackets
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const UNDERSCORE: char = '_';
pub const BT: char = '`';

// Braces
pub const LBRACE: char = '{';
pub const PIPE: char = '|';
pub const RBRACE: char = '}';

/// Check if character is whitespace as far as templates are concerned
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == LF || ch == CR || ch == '\x0C'
}

/// Check if character is a quote
pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == BT
}

/// Check if a character ends an operand, so that a following `/` is a
/// division operator rather than the start of a regular expression literal.
pub fn is_division_context(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, UNDERSCORE | RPAREN | PERIOD | PLUS | MINUS | DOLLAR | RBRACKET)
}

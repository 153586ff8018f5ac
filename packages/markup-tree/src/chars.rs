/*
 * Character Codes
 *
 * Characters the markup lexer dispatches on.
 */

//! Character constants and classification helpers used by the lexer

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const MINUS: char = '-';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';

// Brackets
pub const LBRACKET: char = '[';
pub const RBRACKET: char = ']';

pub const LOWER_X: char = 'x';
pub const UPPER_X: char = 'X';

/// Check if character is whitespace (TAB through SPACE, plus NBSP).
///
/// `EOF` is not whitespace, so whitespace-skipping loops stop at the end of input.
pub fn is_whitespace(ch: char) -> bool {
    (TAB..=SPACE).contains(&ch) || ch == NBSP
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if character is ASCII letter
pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Check if character is ASCII hex digit
pub fn is_ascii_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

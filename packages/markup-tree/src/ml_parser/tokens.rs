//! ML Parser Tokens
//!
//! The flat token stream the lexer hands to the tree builder.

use crate::parse_util::ParseSourceSpan;
use serde::Serialize;
use smallvec::SmallVec;

/// Token types for HTML/XML parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TokenType {
    TagOpenStart,
    TagOpenEnd,
    TagOpenEndVoid,
    TagClose,
    Text,
    EscapableRawText,
    RawText,
    CommentStart,
    CommentEnd,
    CdataStart,
    CdataEnd,
    AttrName,
    AttrValue,
    DocType,
    Eof,
}

impl TokenType {
    /// Text-like tokens carry their content as the single part.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            TokenType::Text | TokenType::RawText | TokenType::EscapableRawText
        )
    }
}

/// Token string parts: `[prefix, name]` for names, `[value]` for text and values.
pub type TokenParts = SmallVec<[String; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub token_type: TokenType,
    pub parts: TokenParts,
    pub source_span: ParseSourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, parts: TokenParts, source_span: ParseSourceSpan) -> Self {
        Token {
            token_type,
            parts,
            source_span,
        }
    }

    /// Part at `index`, or `""` when the lexer did not provide it.
    pub fn part(&self, index: usize) -> &str {
        self.parts.get(index).map(String::as_str).unwrap_or("")
    }

    /// `(prefix, local_name)` of a tag or attribute name token; an empty prefix is `None`.
    pub fn prefix_and_name(&self) -> (Option<&str>, &str) {
        let prefix = self.part(0);
        let prefix = if prefix.is_empty() { None } else { Some(prefix) };
        (prefix, self.part(1))
    }
}

//! ML Parser Lexer
//!
//! HTML tokenizer - converts source text into the flat token stream the tree
//! builder consumes. Every token sequence ends with exactly one `Eof` token.
//!
//! Failures inside a construct propagate as `Err(TokenError)` up to the main
//! loop, which records them and resumes at the current position. A start tag
//! that cannot be completed is rolled back and emitted as a literal `<`.

use super::html_tags::NAMED_ENTITIES;
use super::tags::{TagContentType, TagDefinitionResolver};
use super::tokens::{Token, TokenParts, TokenType};
use crate::chars;
use crate::parse_util::{ParseLocation, ParseSourceFile, ParseSourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use smallvec::smallvec;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Error recorded by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg} ({location})")]
pub struct TokenError {
    pub msg: String,
    /// Kind of token being built when the error occurred
    pub token_type: Option<TokenType>,
    pub location: ParseLocation,
}

/// Tokenization result
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<TokenError>,
}

/// Tokenization options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenizeOptions {
    /// Keep `\r\n` and `\r` in text and attribute values instead of normalizing to `\n`
    pub preserve_line_endings: bool,
}

/// Main tokenization function
pub fn tokenize(
    source: String,
    url: String,
    get_tag_definition: TagDefinitionResolver,
    options: TokenizeOptions,
) -> TokenizeResult {
    let file = Arc::new(ParseSourceFile::new(source, url));
    let mut tokenizer = Tokenizer::new(file, get_tag_definition, options);
    tokenizer.tokenize();

    TokenizeResult {
        tokens: merge_text_tokens(tokenizer.tokens),
        errors: tokenizer.errors,
    }
}

static CR_OR_CRLF_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
struct CursorState {
    peek: char,
    offset: usize,
    line: usize,
    column: usize,
}

struct Tokenizer {
    file: Arc<ParseSourceFile>,
    get_tag_definition: TagDefinitionResolver,
    state: CursorState,
    preserve_line_endings: bool,
    current_token_start: Option<CursorState>,
    current_token_type: Option<TokenType>,
    tokens: Vec<Token>,
    errors: Vec<TokenError>,
}

impl Tokenizer {
    fn new(
        file: Arc<ParseSourceFile>,
        get_tag_definition: TagDefinitionResolver,
        options: TokenizeOptions,
    ) -> Self {
        let mut tokenizer = Tokenizer {
            file,
            get_tag_definition,
            state: CursorState {
                peek: chars::EOF,
                offset: 0,
                line: 0,
                column: 0,
            },
            preserve_line_endings: options.preserve_line_endings,
            current_token_start: None,
            current_token_type: None,
            tokens: Vec::new(),
            errors: Vec::new(),
        };
        tokenizer.update_peek();
        tokenizer
    }

    fn tokenize(&mut self) {
        while self.state.peek != chars::EOF {
            let start = self.state;
            let result = if self.attempt_char_code(chars::LT) {
                if self.attempt_char_code(chars::BANG) {
                    if self.attempt_char_code(chars::LBRACKET) {
                        self.consume_cdata(start)
                    } else if self.attempt_char_code(chars::MINUS) {
                        self.consume_comment(start)
                    } else {
                        self.consume_doc_type(start)
                    }
                } else if self.attempt_char_code(chars::SLASH) {
                    self.consume_tag_close(start)
                } else {
                    self.consume_tag_open(start)
                }
            } else {
                self.consume_text()
            };

            if let Err(error) = result {
                self.record_error(error);
            }
        }

        self.begin_token(TokenType::Eof, None);
        self.end_token(smallvec![], None);
    }

    fn record_error(&mut self, error: TokenError) {
        debug!(location = %error.location, "{}", error.msg);
        self.errors.push(error);
    }

    // Cursor movement

    fn update_peek(&mut self) {
        self.state.peek = self.file.content[self.state.offset..]
            .chars()
            .next()
            .unwrap_or(chars::EOF);
    }

    /// Move past the current character; a no-op at the end of input.
    fn bump(&mut self) {
        if self.state.offset >= self.file.content.len() {
            return;
        }
        let ch = self.state.peek;
        self.state.offset += ch.len_utf8();
        if ch == chars::LF {
            self.state.line += 1;
            self.state.column = 0;
        } else {
            self.state.column += 1;
        }
        self.update_peek();
    }

    /// Move past the current character; running off the end of input is an error.
    fn advance(&mut self) -> Result<(), TokenError> {
        if self.state.peek == chars::EOF {
            return Err(self.unexpected_character());
        }
        self.bump();
        Ok(())
    }

    fn attempt_char_code(&mut self, char_code: char) -> bool {
        if self.state.peek == char_code {
            self.bump();
            true
        } else {
            false
        }
    }

    fn require_char_code(&mut self, char_code: char) -> Result<(), TokenError> {
        if self.attempt_char_code(char_code) {
            Ok(())
        } else {
            Err(self.unexpected_character())
        }
    }

    fn attempt_str(&mut self, s: &str) -> bool {
        let saved = self.state;
        for ch in s.chars() {
            if !self.attempt_char_code(ch) {
                self.state = saved;
                return false;
            }
        }
        true
    }

    fn attempt_str_case_insensitive(&mut self, s: &str) -> bool {
        let saved = self.state;
        for ch in s.chars() {
            if !self.state.peek.eq_ignore_ascii_case(&ch) {
                self.state = saved;
                return false;
            }
            self.bump();
        }
        true
    }

    fn require_str(&mut self, s: &str) -> Result<(), TokenError> {
        if self.attempt_str(s) {
            Ok(())
        } else {
            Err(self.unexpected_character())
        }
    }

    fn skip_whitespace(&mut self) {
        while chars::is_whitespace(self.state.peek) {
            self.bump();
        }
    }

    fn attempt_until_fn(&mut self, predicate: fn(char) -> bool) -> Result<(), TokenError> {
        while !predicate(self.state.peek) {
            self.advance()?;
        }
        Ok(())
    }

    fn require_until_fn(&mut self, predicate: fn(char) -> bool, len: usize) -> Result<(), TokenError> {
        let start = self.state.offset;
        self.attempt_until_fn(predicate)?;
        if self.state.offset - start < len {
            return Err(self.unexpected_character());
        }
        Ok(())
    }

    fn attempt_until_char(&mut self, char_code: char) -> Result<(), TokenError> {
        while self.state.peek != char_code {
            self.advance()?;
        }
        Ok(())
    }

    fn read_char(&mut self, decode_entities: bool, buf: &mut String) -> Result<(), TokenError> {
        if decode_entities && self.state.peek == chars::AMPERSAND {
            self.decode_entity(buf)
        } else {
            let ch = self.state.peek;
            self.advance()?;
            buf.push(ch);
            Ok(())
        }
    }

    // Token management methods

    fn begin_token(&mut self, token_type: TokenType, start: Option<CursorState>) {
        self.current_token_type = Some(token_type);
        self.current_token_start = Some(start.unwrap_or(self.state));
    }

    fn end_token(&mut self, parts: TokenParts, end: Option<CursorState>) {
        let start = self.current_token_start.take().unwrap_or(self.state);
        let token_type = self.current_token_type.take().unwrap_or(TokenType::Eof);
        let end = end.unwrap_or(self.state);
        let source_span = ParseSourceSpan::new(self.location(start), self.location(end));
        self.tokens.push(Token::new(token_type, parts, source_span));
    }

    fn location(&self, state: CursorState) -> ParseLocation {
        ParseLocation::new(self.file.clone(), state.offset, state.line, state.column)
    }

    fn create_error(&self, msg: String, state: CursorState) -> TokenError {
        TokenError {
            msg,
            token_type: self.current_token_type,
            location: self.location(state),
        }
    }

    fn unexpected_character(&self) -> TokenError {
        self.create_error(unexpected_character_error_msg(self.state.peek), self.state)
    }

    fn process_carriage_returns(&self, content: String) -> String {
        if self.preserve_line_endings {
            return content;
        }
        CR_OR_CRLF_REGEXP.replace_all(&content, "\n").into_owned()
    }

    // Constructs

    fn consume_text(&mut self) -> Result<(), TokenError> {
        self.begin_token(TokenType::Text, None);
        let mut value = String::new();
        loop {
            let char_start = self.state;
            if let Err(error) = self.read_char(true, &mut value) {
                // Keep the undecodable reference verbatim and carry on.
                self.record_error(error);
                value.push_str(&self.file.content[char_start.offset..self.state.offset]);
            }
            if is_text_end(self.state.peek) {
                break;
            }
        }
        let value = self.process_carriage_returns(value);
        self.end_token(smallvec![value], None);
        Ok(())
    }

    fn decode_entity(&mut self, buf: &mut String) -> Result<(), TokenError> {
        let start = self.state;
        self.bump();
        if self.attempt_char_code(chars::HASH) {
            let is_hex =
                self.attempt_char_code(chars::LOWER_X) || self.attempt_char_code(chars::UPPER_X);
            let number_start = self.state.offset;
            self.attempt_until_fn(is_digit_entity_end)?;
            if self.state.peek != chars::SEMICOLON {
                return Err(self.unexpected_character());
            }
            let digits = &self.file.content[number_start..self.state.offset];
            let decoded = u32::from_str_radix(digits, if is_hex { 16 } else { 10 })
                .ok()
                .and_then(char::from_u32);
            self.bump();
            match decoded {
                Some(ch) => {
                    buf.push(ch);
                    Ok(())
                }
                None => {
                    let entity = &self.file.content[start.offset + 1..self.state.offset - 1];
                    Err(self.create_error(unknown_entity_error_msg(entity), start))
                }
            }
        } else {
            let saved = self.state;
            self.attempt_until_fn(is_named_entity_end)?;
            if self.state.peek != chars::SEMICOLON {
                self.state = saved;
                buf.push(chars::AMPERSAND);
                return Ok(());
            }
            let name = &self.file.content[start.offset + 1..self.state.offset];
            match NAMED_ENTITIES.get(name) {
                Some(decoded) => {
                    buf.push_str(decoded);
                    self.bump();
                    Ok(())
                }
                None => {
                    let error = self.create_error(unknown_entity_error_msg(name), start);
                    self.bump();
                    Err(error)
                }
            }
        }
    }

    fn consume_cdata(&mut self, start: CursorState) -> Result<(), TokenError> {
        self.begin_token(TokenType::CdataStart, Some(start));
        self.require_str("CDATA[")?;
        self.end_token(smallvec![], None);

        let end = self.consume_raw_text(false, chars::RBRACKET, |t| t.attempt_str("]>"))?;

        self.begin_token(TokenType::CdataEnd, Some(end));
        self.end_token(smallvec![], None);
        Ok(())
    }

    fn consume_comment(&mut self, start: CursorState) -> Result<(), TokenError> {
        self.begin_token(TokenType::CommentStart, Some(start));
        self.require_char_code(chars::MINUS)?;
        self.end_token(smallvec![], None);

        let end = self.consume_raw_text(false, chars::MINUS, |t| t.attempt_str("->"))?;

        self.begin_token(TokenType::CommentEnd, Some(end));
        self.end_token(smallvec![], None);
        Ok(())
    }

    fn consume_doc_type(&mut self, start: CursorState) -> Result<(), TokenError> {
        self.begin_token(TokenType::DocType, Some(start));
        self.attempt_until_char(chars::GT)?;
        self.bump();
        let content = self.file.content[start.offset + 2..self.state.offset - 1].to_string();
        self.end_token(smallvec![content], None);
        Ok(())
    }

    /// Consume text up to a terminator starting with `first_char_of_end` and
    /// completed by `attempt_end_rest`. Returns the position where the
    /// terminator starts.
    fn consume_raw_text<F>(
        &mut self,
        decode_entities: bool,
        first_char_of_end: char,
        mut attempt_end_rest: F,
    ) -> Result<CursorState, TokenError>
    where
        F: FnMut(&mut Self) -> bool,
    {
        let token_type = if decode_entities {
            TokenType::EscapableRawText
        } else {
            TokenType::RawText
        };
        self.begin_token(token_type, None);
        let mut value = String::new();
        let tag_close_start = loop {
            let tag_close_start = self.state;
            if self.attempt_char_code(first_char_of_end) && attempt_end_rest(self) {
                break tag_close_start;
            }
            if self.state.offset > tag_close_start.offset {
                value.push_str(&self.file.content[tag_close_start.offset..self.state.offset]);
            }
            while self.state.peek != first_char_of_end {
                self.read_char(decode_entities, &mut value)?;
            }
        };
        let value = self.process_carriage_returns(value);
        self.end_token(smallvec![value], Some(tag_close_start));
        Ok(tag_close_start)
    }

    fn consume_tag_open(&mut self, start: CursorState) -> Result<(), TokenError> {
        let saved_state = self.state;
        let saved_token_count = self.tokens.len();

        let (tag_name, is_void) = match self.consume_tag_open_parts(start) {
            Ok(open) => open,
            Err(error) => {
                trace!(offset = start.offset, "{}; emitting '<' as text", error.msg);
                // When the start tag is invalid, assume we want a "<"
                self.state = saved_state;
                self.tokens.truncate(saved_token_count);
                self.begin_token(TokenType::Text, Some(start));
                self.end_token(smallvec!["<".to_string()], None);
                return Ok(());
            }
        };

        if is_void {
            return Ok(());
        }
        match (self.get_tag_definition)(&tag_name.to_lowercase()).content_type() {
            TagContentType::RawText => self.consume_raw_text_with_tag_close(tag_name, false),
            TagContentType::EscapableRawText => self.consume_raw_text_with_tag_close(tag_name, true),
            TagContentType::ParsableData => Ok(()),
        }
    }

    /// Tag name (with prefix, as written) and void-ness of a start tag.
    fn consume_tag_open_parts(&mut self, start: CursorState) -> Result<(String, bool), TokenError> {
        if !chars::is_ascii_letter(self.state.peek) {
            return Err(self.unexpected_character());
        }
        let name_start = self.state.offset;
        self.begin_token(TokenType::TagOpenStart, Some(start));
        let parts = self.consume_prefix_and_name()?;
        self.end_token(parts, None);
        let tag_name = self.file.content[name_start..self.state.offset].to_string();

        self.skip_whitespace();
        while self.state.peek != chars::SLASH && self.state.peek != chars::GT {
            self.consume_attribute_name()?;
            self.skip_whitespace();
            if self.attempt_char_code(chars::EQ) {
                self.skip_whitespace();
                self.consume_attribute_value()?;
            }
            self.skip_whitespace();
        }

        let is_void = self.consume_tag_open_end(&tag_name)?;
        Ok((tag_name, is_void))
    }

    fn consume_tag_open_end(&mut self, tag_name: &str) -> Result<bool, TokenError> {
        let start = self.state;
        let self_closing = self.attempt_char_code(chars::SLASH);
        let is_void = self_closing || (self.get_tag_definition)(&tag_name.to_lowercase()).is_void();
        let token_type = if is_void {
            TokenType::TagOpenEndVoid
        } else {
            TokenType::TagOpenEnd
        };
        self.begin_token(token_type, Some(start));
        self.require_char_code(chars::GT)?;
        self.end_token(smallvec![], None);
        Ok(is_void)
    }

    fn consume_raw_text_with_tag_close(
        &mut self,
        tag_name: String,
        decode_entities: bool,
    ) -> Result<(), TokenError> {
        let end = self.consume_raw_text(decode_entities, chars::LT, |t| {
            if !t.attempt_char_code(chars::SLASH) {
                return false;
            }
            t.skip_whitespace();
            if !t.attempt_str_case_insensitive(&tag_name) {
                return false;
            }
            t.skip_whitespace();
            t.attempt_char_code(chars::GT)
        })?;
        self.begin_token(TokenType::TagClose, Some(end));
        self.end_token(smallvec![String::new(), tag_name], None);
        Ok(())
    }

    fn consume_tag_close(&mut self, start: CursorState) -> Result<(), TokenError> {
        self.begin_token(TokenType::TagClose, Some(start));
        self.skip_whitespace();
        let parts = self.consume_prefix_and_name()?;
        self.skip_whitespace();
        self.require_char_code(chars::GT)?;
        self.end_token(parts, None);
        Ok(())
    }

    fn consume_attribute_name(&mut self) -> Result<(), TokenError> {
        self.begin_token(TokenType::AttrName, None);
        let parts = self.consume_prefix_and_name()?;
        self.end_token(parts, None);
        Ok(())
    }

    fn consume_attribute_value(&mut self) -> Result<(), TokenError> {
        self.begin_token(TokenType::AttrValue, None);
        let value = if self.state.peek == chars::SQ || self.state.peek == chars::DQ {
            let quote_char = self.state.peek;
            self.bump();
            let mut value = String::new();
            while self.state.peek != quote_char {
                self.read_char(true, &mut value)?;
            }
            self.bump();
            value
        } else {
            let value_start = self.state.offset;
            self.require_until_fn(is_name_end, 1)?;
            self.file.content[value_start..self.state.offset].to_string()
        };
        let value = self.process_carriage_returns(value);
        self.end_token(smallvec![value], None);
        Ok(())
    }

    fn consume_prefix_and_name(&mut self) -> Result<TokenParts, TokenError> {
        let name_or_prefix_start = self.state.offset;
        while self.state.peek != chars::COLON && !is_prefix_end(self.state.peek) {
            self.advance()?;
        }
        let mut prefix = String::new();
        let name_start = if self.state.peek == chars::COLON {
            self.bump();
            prefix = self.file.content[name_or_prefix_start..self.state.offset - 1].to_string();
            self.state.offset
        } else {
            name_or_prefix_start
        };
        let min_len = if self.state.offset == name_start { 1 } else { 0 };
        self.require_until_fn(is_name_end, min_len)?;
        let name = self.file.content[name_start..self.state.offset].to_string();
        Ok(smallvec![prefix, name])
    }
}

fn merge_text_tokens(src_tokens: Vec<Token>) -> Vec<Token> {
    let mut dst_tokens: Vec<Token> = Vec::with_capacity(src_tokens.len());
    for token in src_tokens {
        match dst_tokens.last_mut() {
            Some(last)
                if last.token_type == TokenType::Text && token.token_type == TokenType::Text =>
            {
                let Token {
                    parts, source_span, ..
                } = token;
                if let Some(text) = parts.into_iter().next() {
                    match last.parts.first_mut() {
                        Some(existing) => existing.push_str(&text),
                        None => last.parts.push(text),
                    }
                }
                last.source_span.end = source_span.end;
            }
            _ => dst_tokens.push(token),
        }
    }
    dst_tokens
}

fn unexpected_character_error_msg(char_code: char) -> String {
    let ch = if char_code == chars::EOF {
        "EOF".to_string()
    } else {
        char_code.to_string()
    };
    format!("Unexpected character \"{}\"", ch)
}

fn unknown_entity_error_msg(entity_src: &str) -> String {
    format!(
        "Unknown entity \"{}\" - use the \"&#<decimal>;\" or  \"&#x<hex>;\" syntax",
        entity_src
    )
}

fn is_name_end(code: char) -> bool {
    chars::is_whitespace(code)
        || code == chars::GT
        || code == chars::SLASH
        || code == chars::SQ
        || code == chars::DQ
        || code == chars::EQ
}

fn is_prefix_end(code: char) -> bool {
    !code.is_ascii_alphanumeric()
}

fn is_digit_entity_end(code: char) -> bool {
    code == chars::SEMICOLON || code == chars::EOF || !chars::is_ascii_hex_digit(code)
}

fn is_named_entity_end(code: char) -> bool {
    code == chars::SEMICOLON || code == chars::EOF || !code.is_ascii_alphanumeric()
}

fn is_text_end(code: char) -> bool {
    code == chars::LT || code == chars::EOF
}

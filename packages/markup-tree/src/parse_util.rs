//! Parse Utilities
//!
//! Source files, locations and spans carried through tokens, nodes and errors.

use crate::chars;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseLocation {
    #[serde(skip)]
    pub file: Arc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Arc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Return the source around the location
    /// Up to `max_chars` or `max_lines` on each side of the location
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() {
            return None;
        }
        let offset = self.offset.min(content.len());
        if !content.is_char_boundary(offset) {
            return None;
        }

        // Move backward
        let mut start_offset = offset;
        let mut ctx_chars = 0;
        let mut ctx_lines = 0;
        for (idx, ch) in content[..offset].char_indices().rev() {
            if ctx_chars >= max_chars {
                break;
            }
            start_offset = idx;
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        // Move forward
        let mut end_offset = offset;
        ctx_chars = 0;
        ctx_lines = 0;
        for (idx, ch) in content[offset..].char_indices() {
            if ctx_chars >= max_chars {
                break;
            }
            end_offset = offset + idx + ch.len_utf8();
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        Some((
            content[start_offset..offset].to_string(),
            content[offset..end_offset].to_string(),
        ))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    /// Source text covered by the span, empty if the offsets do not slice the file.
    pub fn text(&self) -> &str {
        self.start
            .file
            .content
            .get(self.start.offset..self.end.offset)
            .unwrap_or("")
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

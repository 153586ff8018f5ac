//! HTML Parser
//!
//! `Parser` bound to the bundled HTML tag table.

use super::html_tags::html_tag_rules;
use super::lexer::TokenizeOptions;
use super::parser::{ParseTreeResult, Parser};
use rayon::prelude::*;

/// HTML parser (generic Parser with HTML tag definitions)
pub struct HtmlParser {
    parser: Parser,
}

impl HtmlParser {
    /// Create new HTML parser with default HTML tag definitions
    pub fn new() -> Self {
        HtmlParser {
            parser: Parser::new(html_tag_rules),
        }
    }

    /// Parse HTML template source
    ///
    /// # Arguments
    /// * `source` - HTML template string
    /// * `url` - Source file URL/path (for error reporting)
    /// * `options` - Tokenization options (optional)
    pub fn parse(
        &self,
        source: &str,
        url: &str,
        options: Option<TokenizeOptions>,
    ) -> ParseTreeResult {
        self.parser.parse(source, url, options)
    }

    /// Parse independent `(source, url)` inputs in parallel.
    ///
    /// Results are returned in input order.
    pub fn parse_all(&self, inputs: &[(String, String)]) -> Vec<ParseTreeResult> {
        inputs
            .par_iter()
            .map(|(source, url)| self.parse(source, url, None))
            .collect()
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

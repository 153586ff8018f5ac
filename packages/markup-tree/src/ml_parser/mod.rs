//! ML (Markup Language) Parser Module
//!
//! Tokenizes HTML-like markup and builds an element/attribute/text tree,
//! recording malformed input as errors instead of aborting.

pub mod ast;
pub mod html_parser;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tags;
pub mod tokens;

pub use ast::*;
pub use html_parser::HtmlParser;
pub use html_tags::{get_html_tag_definition, html_tag_rules, HtmlTagDefinition};
pub use lexer::{tokenize, TokenError, TokenizeOptions, TokenizeResult};
pub use parser::{ParseError, ParseTreeResult, Parser, TreeBuilder, TreeError, TreeErrorKind};
pub use tags::*;
pub use tokens::*;

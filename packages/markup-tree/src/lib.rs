#![deny(clippy::all)]

//! Markup Tree
//!
//! Error-tolerant HTML-like markup parser: a tokenizer plus a tree builder
//! that applies per-tag structural rules (auto-closing, implied parents,
//! void elements, namespace inheritance) and records mismatched end tags
//! instead of aborting.

pub mod chars;
pub mod ml_parser;
pub mod parse_util;

pub use ml_parser::{HtmlParser, ParseError, ParseTreeResult, Parser};

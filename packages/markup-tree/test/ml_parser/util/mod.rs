#![allow(dead_code)]

/**
 * ML Parser Test Utilities
 *
 * Helper functions shared by the lexer, parser and tree builder tests
 */
use markup_tree::ml_parser::ast::*;
use markup_tree::ml_parser::html_tags::html_tag_rules;
use markup_tree::ml_parser::lexer::{tokenize, TokenizeOptions, TokenizeResult};
use markup_tree::ml_parser::parser::{ParseError, ParseTreeResult};
use markup_tree::ml_parser::tokens::{Token, TokenParts, TokenType};
use markup_tree::parse_util::{ParseLocation, ParseSourceFile, ParseSourceSpan};
use std::sync::Arc;

/// Humanize DOM parse result
pub fn humanize_dom(
    parse_result: &ParseTreeResult,
    add_source_span: bool,
) -> Result<Vec<Vec<String>>, String> {
    if !parse_result.errors.is_empty() {
        let error_string = parse_result
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(format!("Unexpected parse errors:\n{}", error_string));
    }

    Ok(humanize_nodes(&parse_result.root_nodes, add_source_span))
}

/// Humanize DOM with source spans
pub fn humanize_dom_source_spans(
    parse_result: &ParseTreeResult,
) -> Result<Vec<Vec<String>>, String> {
    humanize_dom(parse_result, true)
}

/// Humanize AST nodes
pub fn humanize_nodes(nodes: &[Node], add_source_span: bool) -> Vec<Vec<String>> {
    let mut humanizer = Humanizer::new(add_source_span);
    visit_all(&mut humanizer, nodes);
    humanizer.result
}

/// Humanize line and column from ParseLocation
pub fn humanize_line_column(location: &ParseLocation) -> String {
    format!("{}:{}", location.line, location.col)
}

/// `[element name, message, line:col]` for tree errors, `[message, line:col]` for lexer errors
pub fn humanize_errors(errors: &[ParseError]) -> Vec<Vec<String>> {
    errors
        .iter()
        .map(|e| match e {
            ParseError::Tree(tree) => vec![
                tree.element_name.clone(),
                tree.msg.clone(),
                humanize_line_column(&tree.location),
            ],
            ParseError::Token(token) => {
                vec![token.msg.clone(), humanize_line_column(&token.location)]
            }
        })
        .collect()
}

struct Humanizer {
    result: Vec<Vec<String>>,
    el_depth: usize,
    include_source_span: bool,
}

impl Humanizer {
    fn new(include_source_span: bool) -> Self {
        Humanizer {
            result: Vec::new(),
            el_depth: 0,
            include_source_span,
        }
    }

    fn push(&mut self, mut res: Vec<String>, span: &ParseSourceSpan) {
        if self.include_source_span {
            res.push(span.to_string());
        }
        self.result.push(res);
    }
}

impl Visitor for Humanizer {
    fn visit_element(&mut self, element: &Element) {
        let res = vec![
            "Element".to_string(),
            element.name.clone(),
            self.el_depth.to_string(),
        ];
        self.push(res, &element.source_span);
        self.el_depth += 1;

        for attr in &element.attrs {
            self.visit_attribute(attr);
        }
        visit_all(self, &element.children);

        self.el_depth -= 1;
    }

    fn visit_attribute(&mut self, attribute: &Attribute) {
        let res = vec![
            "Attribute".to_string(),
            attribute.name.clone(),
            attribute.value.clone(),
        ];
        self.push(res, &attribute.source_span);
    }

    fn visit_text(&mut self, text: &Text) {
        let res = vec![
            "Text".to_string(),
            text.value.clone(),
            self.el_depth.to_string(),
        ];
        self.push(res, &text.source_span);
    }
}

/// Tokenize ignoring errors (helper)
pub fn tokenize_ignoring_errors(input: &str, options: TokenizeOptions) -> TokenizeResult {
    tokenize(
        input.to_string(),
        "someUrl".to_string(),
        html_tag_rules,
        options,
    )
}

/// Tokenize without errors (panics if errors found)
pub fn tokenize_without_errors(input: &str, options: TokenizeOptions) -> TokenizeResult {
    let result = tokenize_ignoring_errors(input, options);

    if !result.errors.is_empty() {
        let error_string = result
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        panic!("Unexpected parse errors:\n{}", error_string);
    }

    result
}

/// Humanize token parts
pub fn humanize_parts(tokens: &[Token]) -> Vec<Vec<String>> {
    tokens
        .iter()
        .map(|token| {
            let mut parts = vec![to_screaming_snake_case(token.token_type)];
            parts.extend(token.parts.iter().cloned());
            parts
        })
        .collect()
}

fn to_screaming_snake_case(t: TokenType) -> String {
    let s = format!("{:?}", t);
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.push(c.to_ascii_uppercase());
    }
    result
}

/// Tokenize and humanize parts
pub fn tokenize_and_humanize_parts(input: &str, options: TokenizeOptions) -> Vec<Vec<String>> {
    let result = tokenize_without_errors(input, options);
    humanize_parts(&result.tokens)
}

/// Tokenize and humanize parts ignoring errors
pub fn tokenize_and_humanize_parts_ignoring_errors(
    input: &str,
    options: TokenizeOptions,
) -> Vec<Vec<String>> {
    let result = tokenize_ignoring_errors(input, options);
    humanize_parts(&result.tokens)
}

/// Tokenize and humanize source spans
pub fn tokenize_and_humanize_source_spans(
    input: &str,
    options: TokenizeOptions,
) -> Vec<Vec<String>> {
    let result = tokenize_without_errors(input, options);
    result
        .tokens
        .iter()
        .map(|token| {
            vec![
                to_screaming_snake_case(token.token_type),
                token.source_span.to_string(),
            ]
        })
        .collect()
}

/// Tokenize and humanize line/column
pub fn tokenize_and_humanize_line_column(
    input: &str,
    options: TokenizeOptions,
) -> Vec<Vec<String>> {
    let result = tokenize_without_errors(input, options);
    result
        .tokens
        .iter()
        .map(|token| {
            vec![
                to_screaming_snake_case(token.token_type),
                humanize_line_column(&token.source_span.start),
            ]
        })
        .collect()
}

/// Tokenize and humanize errors
pub fn tokenize_and_humanize_errors(input: &str, options: TokenizeOptions) -> Vec<Vec<String>> {
    tokenize_ignoring_errors(input, options)
        .errors
        .iter()
        .map(|e| vec![e.msg.clone(), humanize_line_column(&e.location)])
        .collect()
}

/// Builds hand-written token streams for tree builder tests.
///
/// Every token gets a distinct offset so spans and error locations can be
/// asserted; the column equals the offset.
pub struct TokenStream {
    file: Arc<ParseSourceFile>,
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        TokenStream {
            file: Arc::new(ParseSourceFile::new(String::new(), "tokens".to_string())),
            tokens: Vec::new(),
        }
    }

    fn push(mut self, token_type: TokenType, parts: &[&str]) -> Self {
        let offset = self.tokens.len();
        let span = ParseSourceSpan::new(
            ParseLocation::new(self.file.clone(), offset, 0, offset),
            ParseLocation::new(self.file.clone(), offset + 1, 0, offset + 1),
        );
        let parts: TokenParts = parts.iter().map(|p| p.to_string()).collect();
        self.tokens.push(Token::new(token_type, parts, span));
        self
    }

    pub fn open(self, prefix: &str, name: &str) -> Self {
        self.push(TokenType::TagOpenStart, &[prefix, name])
    }

    pub fn open_end(self) -> Self {
        self.push(TokenType::TagOpenEnd, &[])
    }

    pub fn open_end_void(self) -> Self {
        self.push(TokenType::TagOpenEndVoid, &[])
    }

    pub fn close(self, prefix: &str, name: &str) -> Self {
        self.push(TokenType::TagClose, &[prefix, name])
    }

    pub fn attr(self, prefix: &str, name: &str) -> Self {
        self.push(TokenType::AttrName, &[prefix, name])
    }

    pub fn value(self, value: &str) -> Self {
        self.push(TokenType::AttrValue, &[value])
    }

    pub fn text(self, value: &str) -> Self {
        self.push(TokenType::Text, &[value])
    }

    pub fn raw(self, token_type: TokenType, parts: &[&str]) -> Self {
        self.push(token_type, parts)
    }

    pub fn eof(self) -> Self {
        self.push(TokenType::Eof, &[])
    }

    pub fn build(self) -> Vec<Token> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_line_column() {
        let file = Arc::new(ParseSourceFile::new("test".to_string(), "test.html".to_string()));
        let location = ParseLocation::new(file, 0, 2, 5);

        assert_eq!(humanize_line_column(&location), "2:5");
    }
}

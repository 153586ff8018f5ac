//! ML Parser
//!
//! Tree builder - converts the token stream into element/attribute/text nodes.
//!
//! The builder keeps an open-element stack of handles into an arena of
//! partially built nodes. Closing an element only truncates the stack; nodes
//! stay attached where they were first added. The arena is turned into an
//! owned tree once the whole token stream has been consumed.

use super::ast::{Attribute, Element, Node, Text};
use super::lexer::{tokenize, TokenError, TokenizeOptions};
use super::tags::{element_name, TagDefinition, TagDefinitionResolver};
use super::tokens::{Token, TokenType};
use crate::parse_util::{ParseLocation, ParseSourceSpan};
use thiserror::Error;
use tracing::{debug, trace};

/// Kinds of errors recorded while building the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeErrorKind {
    UnexpectedClosingTag,
}

impl TreeErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            TreeErrorKind::UnexpectedClosingTag => "Unexpected closing tag",
        }
    }
}

/// Tree building error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg} \"{element_name}\" ({location})")]
pub struct TreeError {
    pub kind: TreeErrorKind,
    pub msg: String,
    pub element_name: String,
    pub location: ParseLocation,
}

impl TreeError {
    pub fn create(kind: TreeErrorKind, element_name: String, location: ParseLocation) -> Self {
        TreeError {
            kind,
            msg: kind.message().to_string(),
            element_name,
            location,
        }
    }
}

/// Error reported by a parse, from either the lexer or the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ParseError {
    pub fn location(&self) -> &ParseLocation {
        match self {
            ParseError::Token(e) => &e.location,
            ParseError::Tree(e) => &e.location,
        }
    }

    pub fn msg(&self) -> &str {
        match self {
            ParseError::Token(e) => &e.msg,
            ParseError::Tree(e) => &e.msg,
        }
    }

    /// Message with the surrounding source and an `[ERROR ->]` marker at the location.
    pub fn contextual_message(&self) -> String {
        match self.location().get_context(100, 3) {
            Some((before, after)) => format!(
                "{} (\"{}[ERROR ->]{}\"): {}",
                self.msg(),
                before,
                after,
                self.location()
            ),
            None => self.msg().to_string(),
        }
    }
}

/// Parse tree result
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }
}

/// Main parser class
pub struct Parser {
    pub get_tag_definition: TagDefinitionResolver,
}

impl Parser {
    pub fn new(get_tag_definition: TagDefinitionResolver) -> Self {
        Parser { get_tag_definition }
    }

    /// Tokenize and build the tree. Lexer errors come first in the result,
    /// followed by tree errors, each in the order they were found.
    pub fn parse(
        &self,
        source: &str,
        url: &str,
        options: Option<TokenizeOptions>,
    ) -> ParseTreeResult {
        let tokenize_result = tokenize(
            source.to_string(),
            url.to_string(),
            self.get_tag_definition,
            options.unwrap_or_default(),
        );
        let token_count = tokenize_result.tokens.len();

        let tree = TreeBuilder::new(tokenize_result.tokens, self.get_tag_definition).build();

        let mut errors: Vec<ParseError> = tokenize_result
            .errors
            .into_iter()
            .map(ParseError::from)
            .collect();
        errors.extend(tree.errors);

        trace!(
            url,
            tokens = token_count,
            roots = tree.root_nodes.len(),
            errors = errors.len(),
            "parsed template"
        );
        ParseTreeResult::new(tree.root_nodes, errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug)]
enum BuildNode {
    Text(Text),
    /// `element.children` stays empty until the tree is materialized.
    Element {
        element: Element,
        children: Vec<NodeId>,
    },
}

/// Single-pass tree builder over an immutable token sequence
///
/// Nodes are allocated in the arena after their parent, which lets the final
/// tree be assembled bottom-up in one reverse sweep.
pub struct TreeBuilder {
    tokens: Vec<Token>,
    get_tag_definition: TagDefinitionResolver,
    index: usize,
    nodes: Vec<BuildNode>,
    root_nodes: Vec<NodeId>,
    element_stack: Vec<NodeId>,
    errors: Vec<TreeError>,
}

impl TreeBuilder {
    pub fn new(tokens: Vec<Token>, get_tag_definition: TagDefinitionResolver) -> Self {
        TreeBuilder {
            tokens,
            get_tag_definition,
            index: 0,
            nodes: Vec::new(),
            root_nodes: Vec::new(),
            element_stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Consume every token up to `Eof` (or the end of the sequence).
    pub fn build(mut self) -> ParseTreeResult {
        while let Some(token) = self.advance_unless_eof() {
            match token.token_type {
                TokenType::TagOpenStart => self.consume_start_tag(token),
                TokenType::TagClose => self.consume_end_tag(token),
                TokenType::CdataStart => self.consume_cdata(),
                TokenType::CommentStart => self.consume_comment(),
                TokenType::Text | TokenType::RawText | TokenType::EscapableRawText => {
                    self.consume_text(token)
                }
                // Skip all other tokens...
                _ => {}
            }
        }
        self.into_result()
    }

    fn peek_type(&self) -> Option<TokenType> {
        self.tokens.get(self.index).map(|token| token.token_type)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek_type() == Some(token_type) {
            self.advance()
        } else {
            None
        }
    }

    fn advance_unless_eof(&mut self) -> Option<Token> {
        match self.peek_type() {
            None | Some(TokenType::Eof) => None,
            Some(_) => self.advance(),
        }
    }

    fn consume_cdata(&mut self) {
        if self.peek_type().is_some_and(TokenType::is_text) {
            if let Some(text) = self.advance() {
                self.consume_text(text);
            }
        }
        self.advance_if(TokenType::CdataEnd);
    }

    fn consume_comment(&mut self) {
        self.advance_if(TokenType::RawText);
        self.advance_if(TokenType::CommentEnd);
    }

    fn consume_text(&mut self, token: Token) {
        let Token {
            parts, source_span, ..
        } = token;
        let value = parts.into_iter().next().unwrap_or_default();
        let id = self.alloc(BuildNode::Text(Text::new(value, source_span)));
        self.add_to_parent(id);
    }

    fn consume_start_tag(&mut self, start_tag: Token) {
        let mut attrs = Vec::new();
        while let Some(attr_name) = self.advance_if(TokenType::AttrName) {
            attrs.push(self.consume_attr(&attr_name));
        }

        let (prefix, name) = start_tag.prefix_and_name();
        let full_name = element_name(
            prefix,
            name,
            self.current_parent_name(),
            self.get_tag_definition,
        );

        let self_closing = if self.advance_if(TokenType::TagOpenEndVoid).is_some() {
            true
        } else {
            // A missing open-end marker is tolerated: the next token ends the span.
            self.advance_if(TokenType::TagOpenEnd);
            false
        };

        let end = self.current_span_end(&start_tag);
        let source_span = ParseSourceSpan::new(start_tag.source_span.start.clone(), end);
        self.push_element(Element::new(full_name.clone(), attrs, Vec::new(), source_span));
        if self_closing {
            self.pop_element(&full_name);
        }
    }

    fn consume_attr(&mut self, attr_name: &Token) -> Attribute {
        let (prefix, name) = attr_name.prefix_and_name();
        let full_name = element_name(prefix, name, None, self.get_tag_definition);
        let (value, end) = match self.advance_if(TokenType::AttrValue) {
            Some(value_token) => (value_token.part(0).to_string(), value_token.source_span.end),
            None => (String::new(), attr_name.source_span.end.clone()),
        };
        let source_span = ParseSourceSpan::new(attr_name.source_span.start.clone(), end);
        Attribute::new(full_name, value, source_span)
    }

    fn consume_end_tag(&mut self, end_tag: Token) {
        let (prefix, name) = end_tag.prefix_and_name();
        let full_name = element_name(
            prefix,
            name,
            self.current_parent_name(),
            self.get_tag_definition,
        );

        if !self.pop_element(&full_name) {
            debug!(
                element = %full_name,
                location = %end_tag.source_span.start,
                "unexpected closing tag"
            );
            self.errors.push(TreeError::create(
                TreeErrorKind::UnexpectedClosingTag,
                full_name,
                end_tag.source_span.start,
            ));
        }
    }

    /// Start of the lookahead token, or the end of the last consumed one.
    fn current_span_end(&self, start_tag: &Token) -> ParseLocation {
        if let Some(peek) = self.tokens.get(self.index) {
            return peek.source_span.start.clone();
        }
        self.index
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .unwrap_or(start_tag)
            .source_span
            .end
            .clone()
    }

    fn push_element(&mut self, element: Element) {
        let mut stack_len = self.element_stack.len();
        while stack_len > 0 {
            let open_name = self.element_name_of(self.element_stack[stack_len - 1]);
            if !self.get_tag_definition(open_name).is_closed_by_child(&element.name) {
                break;
            }
            stack_len -= 1;
        }
        if stack_len < self.element_stack.len() {
            trace!(
                closed = self.element_stack.len() - stack_len,
                by = %element.name,
                "implicitly closing open elements"
            );
            self.element_stack.truncate(stack_len);
        }

        let tag_def = self.get_tag_definition(&element.name);
        let wrapper_name = tag_def
            .required_parent()
            .filter(|_| tag_def.require_extra_parent(self.current_parent_name()))
            .map(str::to_string);

        match wrapper_name {
            Some(wrapper_name) => {
                debug!(
                    element = %element.name,
                    parent = %wrapper_name,
                    "inserting required parent"
                );
                let wrapper = Element::new(
                    wrapper_name,
                    Vec::new(),
                    Vec::new(),
                    element.source_span.clone(),
                );
                let wrapper_id = self.alloc_element(wrapper);
                let element_id = self.alloc_element(element);
                if let Some(BuildNode::Element { children, .. }) = self.nodes.get_mut(wrapper_id.0) {
                    children.push(element_id);
                }
                self.add_to_parent(wrapper_id);
                self.element_stack.push(wrapper_id);
                self.element_stack.push(element_id);
            }
            None => {
                let element_id = self.alloc_element(element);
                self.add_to_parent(element_id);
                self.element_stack.push(element_id);
            }
        }
    }

    /// Close the nearest open element named `full_name`, along with any
    /// elements above it that may be closed by their parent.
    fn pop_element(&mut self, full_name: &str) -> bool {
        for stack_index in (0..self.element_stack.len()).rev() {
            let open_name = self.element_name_of(self.element_stack[stack_index]);
            if open_name == full_name {
                trace!(
                    element = %full_name,
                    closed = self.element_stack.len() - stack_index,
                    "closing element"
                );
                self.element_stack.truncate(stack_index);
                return true;
            }
            if !self.get_tag_definition(open_name).closed_by_parent() {
                return false;
            }
        }
        false
    }

    fn get_tag_definition(&self, tag_name: &str) -> &'static dyn TagDefinition {
        (self.get_tag_definition)(tag_name)
    }

    fn current_parent_name(&self) -> Option<&str> {
        self.element_stack
            .last()
            .map(|&parent| self.element_name_of(parent))
    }

    fn element_name_of(&self, id: NodeId) -> &str {
        match self.nodes.get(id.0) {
            Some(BuildNode::Element { element, .. }) => &element.name,
            _ => "",
        }
    }

    fn alloc(&mut self, node: BuildNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn alloc_element(&mut self, element: Element) -> NodeId {
        self.alloc(BuildNode::Element {
            element,
            children: Vec::new(),
        })
    }

    fn add_to_parent(&mut self, id: NodeId) {
        match self.element_stack.last() {
            Some(&parent) => {
                if let Some(BuildNode::Element { children, .. }) = self.nodes.get_mut(parent.0) {
                    children.push(id);
                }
            }
            None => self.root_nodes.push(id),
        }
    }

    fn into_result(self) -> ParseTreeResult {
        let TreeBuilder {
            nodes,
            root_nodes,
            errors,
            ..
        } = self;

        let mut built: Vec<Option<Node>> = Vec::with_capacity(nodes.len());
        built.resize_with(nodes.len(), || None);
        for (index, node) in nodes.into_iter().enumerate().rev() {
            let node = match node {
                BuildNode::Text(text) => Node::Text(text),
                BuildNode::Element {
                    mut element,
                    children,
                } => {
                    element.children = take_nodes(&mut built, children);
                    Node::Element(element)
                }
            };
            built[index] = Some(node);
        }

        ParseTreeResult::new(
            take_nodes(&mut built, root_nodes),
            errors.into_iter().map(ParseError::from).collect(),
        )
    }
}

fn take_nodes(built: &mut [Option<Node>], ids: Vec<NodeId>) -> Vec<Node> {
    ids.into_iter()
        .filter_map(|id| built.get_mut(id.0).and_then(Option::take))
        .collect()
}

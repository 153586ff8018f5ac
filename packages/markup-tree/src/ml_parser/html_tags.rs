//! HTML Tag Definitions
//!
//! The HTML knowledge base consulted by the lexer (content types, void tags)
//! and the tree builder (auto-closing, implied parents, namespaces).

use super::tags::{TagContentType, TagDefinition};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// HTML tag definition with specific parsing rules
#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub closed_by_children: HashSet<String>,
    pub required_parents: HashSet<String>,
    pub parent_to_add: Option<String>,
    pub content_type: TagContentType,
    pub closed_by_parent: bool,
    pub implicit_namespace_prefix: Option<String>,
    pub is_void: bool,
}

impl HtmlTagDefinition {
    pub fn new() -> Self {
        HtmlTagDefinition {
            closed_by_children: HashSet::new(),
            required_parents: HashSet::new(),
            parent_to_add: None,
            content_type: TagContentType::ParsableData,
            closed_by_parent: false,
            implicit_namespace_prefix: None,
            is_void: false,
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self.closed_by_parent = self.closed_by_parent || is_void;
        self
    }

    pub fn with_closed_by_children(mut self, children: &[&str]) -> Self {
        self.closed_by_children
            .extend(children.iter().map(|child| child.to_lowercase()));
        self
    }

    pub fn with_closed_by_parent(mut self, closed_by_parent: bool) -> Self {
        self.closed_by_parent = closed_by_parent || self.is_void;
        self
    }

    /// The first listed parent is the one synthesized when none is present.
    pub fn with_required_parents(mut self, parents: &[&str]) -> Self {
        self.parent_to_add = parents.first().map(|p| p.to_string());
        self.required_parents
            .extend(parents.iter().map(|parent| parent.to_lowercase()));
        self
    }

    pub fn with_implicit_namespace(mut self, prefix: &str) -> Self {
        self.implicit_namespace_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_content_type(mut self, content_type: TagContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

impl TagDefinition for HtmlTagDefinition {
    fn closed_by_parent(&self) -> bool {
        self.closed_by_parent
    }

    fn implicit_namespace_prefix(&self) -> Option<&str> {
        self.implicit_namespace_prefix.as_deref()
    }

    fn is_void(&self) -> bool {
        self.is_void
    }

    fn is_closed_by_child(&self, name: &str) -> bool {
        self.is_void || self.closed_by_children.contains(&name.to_lowercase())
    }

    fn require_extra_parent(&self, current_parent: Option<&str>) -> bool {
        if self.required_parents.is_empty() {
            return false;
        }
        match current_parent {
            None => true,
            Some(parent) => {
                let parent = parent.to_lowercase();
                !self.required_parents.contains(&parent) && parent != "template"
            }
        }
    }

    fn required_parent(&self) -> Option<&str> {
        self.parent_to_add.as_deref()
    }

    fn content_type(&self) -> TagContentType {
        self.content_type
    }
}

impl Default for HtmlTagDefinition {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag definitions registry
static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    // Void elements
    for name in [
        "base", "meta", "area", "embed", "link", "img", "input", "param", "hr", "br", "source",
        "track", "wbr",
    ] {
        defs.insert(name, HtmlTagDefinition::new().with_void(true));
    }
    defs.insert(
        "col",
        HtmlTagDefinition::new()
            .with_required_parents(&["colgroup"])
            .with_void(true),
    );

    // <p> tag - closed by many block elements
    defs.insert(
        "p",
        HtmlTagDefinition::new()
            .with_closed_by_children(&[
                "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer",
                "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main",
                "nav", "ol", "p", "pre", "section", "table", "ul",
            ])
            .with_closed_by_parent(true),
    );

    // Table elements
    defs.insert(
        "thead",
        HtmlTagDefinition::new().with_closed_by_children(&["tbody", "tfoot"]),
    );
    defs.insert(
        "tbody",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["tbody", "tfoot"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "tfoot",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["tbody"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "tr",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["tr"])
            .with_required_parents(&["tbody", "tfoot", "thead"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "td",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["td", "th"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "th",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["td", "th"])
            .with_closed_by_parent(true),
    );

    // Foreign content
    defs.insert("svg", HtmlTagDefinition::new().with_implicit_namespace("svg"));
    defs.insert("math", HtmlTagDefinition::new().with_implicit_namespace("math"));

    // List elements
    defs.insert(
        "li",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["li"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "dt",
        HtmlTagDefinition::new().with_closed_by_children(&["dt", "dd"]),
    );
    defs.insert(
        "dd",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["dt", "dd"])
            .with_closed_by_parent(true),
    );

    // Ruby annotation elements
    defs.insert(
        "rb",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["rb", "rt", "rtc", "rp"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "rt",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["rb", "rt", "rtc", "rp"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "rtc",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["rb", "rtc", "rp"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "rp",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["rb", "rt", "rtc", "rp"])
            .with_closed_by_parent(true),
    );

    // Select elements
    defs.insert(
        "optgroup",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["optgroup"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "option",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["option", "optgroup"])
            .with_closed_by_parent(true),
    );

    // Raw text content
    defs.insert(
        "style",
        HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
    );
    defs.insert(
        "script",
        HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
    );
    defs.insert(
        "title",
        HtmlTagDefinition::new().with_content_type(TagContentType::EscapableRawText),
    );
    defs.insert(
        "textarea",
        HtmlTagDefinition::new().with_content_type(TagContentType::EscapableRawText),
    );

    defs
});

/// Definition for names the registry does not list.
static DEFAULT_TAG_DEFINITION: Lazy<HtmlTagDefinition> =
    Lazy::new(|| HtmlTagDefinition::new().with_closed_by_parent(true));

/// Named character references understood by the lexer.
pub static NAMED_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{00A0}"),
        ("iexcl", "\u{00A1}"),
        ("cent", "\u{00A2}"),
        ("pound", "\u{00A3}"),
        ("curren", "\u{00A4}"),
        ("yen", "\u{00A5}"),
        ("brvbar", "\u{00A6}"),
        ("sect", "\u{00A7}"),
        ("uml", "\u{00A8}"),
        ("copy", "\u{00A9}"),
        ("ordf", "\u{00AA}"),
        ("laquo", "\u{00AB}"),
        ("not", "\u{00AC}"),
        ("shy", "\u{00AD}"),
        ("reg", "\u{00AE}"),
        ("macr", "\u{00AF}"),
        ("deg", "\u{00B0}"),
        ("plusmn", "\u{00B1}"),
        ("sup2", "\u{00B2}"),
        ("sup3", "\u{00B3}"),
        ("acute", "\u{00B4}"),
        ("micro", "\u{00B5}"),
        ("para", "\u{00B6}"),
        ("middot", "\u{00B7}"),
        ("cedil", "\u{00B8}"),
        ("sup1", "\u{00B9}"),
        ("ordm", "\u{00BA}"),
        ("raquo", "\u{00BB}"),
        ("frac14", "\u{00BC}"),
        ("frac12", "\u{00BD}"),
        ("frac34", "\u{00BE}"),
        ("iquest", "\u{00BF}"),
        ("Agrave", "\u{00C0}"),
        ("Aacute", "\u{00C1}"),
        ("Auml", "\u{00C4}"),
        ("Ccedil", "\u{00C7}"),
        ("Eacute", "\u{00C9}"),
        ("Ntilde", "\u{00D1}"),
        ("Ouml", "\u{00D6}"),
        ("times", "\u{00D7}"),
        ("Uuml", "\u{00DC}"),
        ("szlig", "\u{00DF}"),
        ("agrave", "\u{00E0}"),
        ("aacute", "\u{00E1}"),
        ("auml", "\u{00E4}"),
        ("ccedil", "\u{00E7}"),
        ("egrave", "\u{00E8}"),
        ("eacute", "\u{00E9}"),
        ("ntilde", "\u{00F1}"),
        ("ouml", "\u{00F6}"),
        ("divide", "\u{00F7}"),
        ("uuml", "\u{00FC}"),
        ("ndash", "\u{2013}"),
        ("mdash", "\u{2014}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("bull", "\u{2022}"),
        ("hellip", "\u{2026}"),
        ("euro", "\u{20AC}"),
        ("trade", "\u{2122}"),
        ("larr", "\u{2190}"),
        ("uarr", "\u{2191}"),
        ("rarr", "\u{2192}"),
        ("darr", "\u{2193}"),
        ("harr", "\u{2194}"),
        ("ne", "\u{2260}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("infin", "\u{221E}"),
        ("hearts", "\u{2665}"),
    ]
    .into_iter()
    .collect()
});

/// Get HTML tag definition for a given tag name
pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name)
        .or_else(|| TAG_DEFINITIONS.get(tag_name.to_lowercase().as_str()))
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}

/// [`get_html_tag_definition`] as a [`TagDefinitionResolver`](super::tags::TagDefinitionResolver).
pub fn html_tag_rules(tag_name: &str) -> &'static dyn TagDefinition {
    get_html_tag_definition(tag_name)
}

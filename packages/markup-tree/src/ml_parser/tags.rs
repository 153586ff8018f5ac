//! ML Parser Tags
//!
//! Per-tag structural rules and the qualified-name helpers built on them.
//!
//! Qualified names encode a namespace as `@prefix:local` (e.g. `@svg:circle`).

use once_cell::sync::Lazy;
use regex::Regex;

/// Tag content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    EscapableRawText,
    ParsableData,
}

/// Tag definition interface
///
/// Lookups must be total: unknown names resolve to a default definition, so the
/// tree builder never fails to find rules for an element.
pub trait TagDefinition: Sync {
    /// May this element be closed implicitly when an ancestor closes?
    fn closed_by_parent(&self) -> bool;
    fn implicit_namespace_prefix(&self) -> Option<&str>;
    fn is_void(&self) -> bool;
    /// Does opening `name` force this element closed?
    fn is_closed_by_child(&self, name: &str) -> bool;
    /// Does this element need a synthetic wrapper given its current parent?
    fn require_extra_parent(&self, current_parent: Option<&str>) -> bool;
    /// Name of the wrapper inserted when `require_extra_parent` holds.
    fn required_parent(&self) -> Option<&str>;
    fn content_type(&self) -> TagContentType;
}

/// Resolves tag rules by (qualified or local) name.
pub type TagDefinitionResolver = fn(&str) -> &'static dyn TagDefinition;

static NS_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@([^:]+):").expect("valid regex"));

/// Split namespace and name from element name
///
/// Format: `@namespace:name`
/// Returns: (namespace, name) or (None, name)
pub fn split_ns_name(element_name: &str) -> (Option<&str>, &str) {
    match NS_PREFIX_RE.captures(element_name) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            let prefix = caps.get(1).map(|m| m.as_str());
            (prefix, &element_name[whole..])
        }
        None => (None, element_name),
    }
}

/// Get namespace prefix from full name
pub fn get_ns_prefix(full_name: &str) -> Option<&str> {
    split_ns_name(full_name).0
}

/// Merge namespace prefix and local name
pub fn merge_ns_and_name(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("@{}:{}", p, local_name),
        _ => local_name.to_string(),
    }
}

/// Resolve the qualified name of an element or attribute.
///
/// An explicit prefix wins, then the tag's implicit namespace, then the
/// namespace of `parent` (attributes always pass no parent).
pub fn element_name(
    prefix: Option<&str>,
    local_name: &str,
    parent: Option<&str>,
    get_tag_definition: TagDefinitionResolver,
) -> String {
    let prefix = prefix
        .filter(|p| !p.is_empty())
        .or_else(|| get_tag_definition(local_name).implicit_namespace_prefix())
        .or_else(|| parent.and_then(get_ns_prefix));
    merge_ns_and_name(prefix, local_name)
}

//! Small roxmltree helpers shared by the backup and Moodle XML readers.

use crate::error::{Error, Result};
use roxmltree::Node;

/// First child element named `tag`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && c.has_tag_name(tag))
}

/// All child elements named `tag`, in document order.
pub fn children<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.is_element() && c.has_tag_name(tag))
}

/// Follow a path of child element names, e.g. `["name", "text"]`.
pub fn descend<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    path.iter().try_fold(node, |n, tag| child(n, tag))
}

/// Text of the element at `path`, or `""` when it is missing or empty.
pub fn text_at<'a>(node: Node<'a, '_>, path: &[&str]) -> &'a str {
    descend(node, path).and_then(|n| n.text()).unwrap_or("")
}

/// Parse a decimal value such as `1.0000000`. Missing elements yield `None`.
pub fn parse_decimal(raw: Option<&str>, what: &str, origin: &str) -> Result<Option<f64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::import(origin, format!("{} is not a number: {:?}", what, s))),
    }
}

/// Answers count as correct when they award any credit.
pub fn is_credit(fraction: Option<f64>) -> bool {
    fraction.is_some_and(|f| f > 0.0)
}

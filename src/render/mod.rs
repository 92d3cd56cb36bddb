//! Render trees and their HTML serialization.
//!
//! A [`Node`] is the unit templates and pages render to. Trees are built
//! with the chainable constructors and serialized with [`Node::to_html`];
//! serialization is deterministic, so composing the same tree twice yields
//! byte-identical markup.
//!
//! ```ignore
//! let tree = Node::elem("div")
//!     .attr("id", "app")
//!     .child(Node::text("loading..."));
//! assert_eq!(tree.to_html(), r#"<div id="app">loading...</div>"#);
//! ```

pub mod escape;

use escape::escape;

/// Elements serialized without children or a closing tag.
const VOID_ELEMENTS: [&str; 9] = [
    "area", "br", "col", "hr", "img", "input", "link", "meta", "source",
];

/// Elements whose text children are emitted without entity escaping.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// An HTML render tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A tag with attributes and children.
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    /// Text content, entity-escaped on serialization.
    Text(String),
    /// Pre-rendered markup, emitted verbatim.
    Raw(String),
    /// A sequence of nodes with no wrapping tag.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create an empty element.
    pub fn elem(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Create a raw markup node. The content bypasses escaping.
    pub fn raw(markup: impl Into<String>) -> Self {
        Node::Raw(markup.into())
    }

    /// Create a fragment.
    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(children.into_iter().collect())
    }

    /// Add an attribute. No-op on non-element nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element { ref mut attrs, .. } = self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Append a child. No-op on text and raw nodes.
    pub fn child(mut self, node: Node) -> Self {
        match self {
            Node::Element {
                ref mut children, ..
            }
            | Node::Fragment(ref mut children) => children.push(node),
            _ => {}
        }
        self
    }

    /// Append children. No-op on text and raw nodes.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        match self {
            Node::Element {
                ref mut children, ..
            }
            | Node::Fragment(ref mut children) => children.extend(nodes),
            _ => {}
        }
        self
    }

    /// Serialize the tree to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            Node::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                let raw_children = is_raw_text_element(tag);
                for child in children {
                    child.write_html(out, raw_children);
                }

                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Node::Text(content) => {
                if raw_text {
                    out.push_str(content);
                } else {
                    out.push_str(&escape(content));
                }
            }
            Node::Raw(markup) => out.push_str(markup),
            Node::Fragment(children) => {
                for child in children {
                    child.write_html(out, raw_text);
                }
            }
        }
    }
}

/// Check whether a tag is a void element (no closing tag).
#[inline]
fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Check whether a tag holds raw text (script/style).
#[inline]
fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

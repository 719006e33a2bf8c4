//! Owned XML element tree: parsing, extraction, canonical serialization.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Errors from XML parsing and tree construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// Input is not well-formed XML.
    #[error("malformed XML: {reason}")]
    Malformed {
        /// Parser diagnostic.
        reason: String,
    },

    /// Input parsed but holds no root element.
    #[error("document has no root element")]
    NoRoot,

    /// Trailing content after the root element closed.
    #[error("content after root element")]
    TrailingContent,
}

/// A node in the tree: an element or a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element.
    Element(XmlElement),
    /// Text content (entity-decoded, whitespace-trimmed).
    Text(String),
}

/// An element: name, attributes in document order, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name as written (prefix included if any).
    pub name: String,
    /// Attributes as (name, decoded value) pairs.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder-style: add a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style: add a text-only child element (`<name>text</name>`).
    pub fn with_leaf(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut leaf = XmlElement::new(name);
        leaf.children.push(XmlNode::Text(text.into()));
        self.with_child(leaf)
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child element by name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|n| match n {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Concatenated text content of this element's direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Depth-first search for the first descendant element with `name`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for node in &self.children {
            if let XmlNode::Element(e) = node {
                if e.name == name {
                    return Some(e);
                }
                if let Some(found) = e.find(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn write_canonical(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        let mut attrs = self.attributes.clone();
        attrs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in &attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, out, true);
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_canonical(out),
                XmlNode::Text(t) => escape_into(t, out, false),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn escape_into(value: &str, out: &mut String, in_attr: bool) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// A parsed XML document rooted at a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    /// The root element.
    pub root: XmlElement,
}

impl XmlTree {
    /// Parse a complete document.
    ///
    /// # Errors
    ///
    /// [`XmlError::Malformed`] for any well-formedness violation
    /// (mismatched tags, bad entities, unterminated markup),
    /// [`XmlError::NoRoot`] for empty input, and
    /// [`XmlError::TrailingContent`] when markup follows the root.
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.trim_text(true);
        config.expand_empty_elements = true;
        config.check_end_names = true;

        let mut root: Option<XmlElement> = None;
        // Stack of open elements; the root closes last.
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                reason: e.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(XmlError::TrailingContent);
                    }
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    let mut element = XmlElement::new(name);
                    for attr in start.attributes() {
                        let attr = attr.map_err(|e| XmlError::Malformed {
                            reason: e.to_string(),
                        })?;
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        let value = attr
                            .unescape_value()
                            .map_err(|e| XmlError::Malformed {
                                reason: e.to_string(),
                            })?
                            .into_owned();
                        element.attributes.push((key, value));
                    }
                    stack.push(element);
                }
                Event::End(_) => {
                    // check_end_names guarantees the name matches.
                    let closed = stack.pop().ok_or_else(|| XmlError::Malformed {
                        reason: "unexpected closing tag".into(),
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(closed)),
                        None => root = Some(closed),
                    }
                }
                Event::Text(text) => {
                    let decoded = text
                        .unescape()
                        .map_err(|e| XmlError::Malformed {
                            reason: e.to_string(),
                        })?
                        .into_owned();
                    if decoded.is_empty() {
                        continue;
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(decoded)),
                        None => {
                            return Err(XmlError::Malformed {
                                reason: "text outside root element".into(),
                            })
                        }
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                // Declarations, comments and PIs carry no signed content.
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Empty(_) => unreachable!("expand_empty_elements is set"),
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Malformed {
                reason: format!("unclosed element <{}>", open.name),
            });
        }
        root.map(|root| Self { root }).ok_or(XmlError::NoRoot)
    }

    /// Root element name.
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    /// `xmlns` namespace declared on the root, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.root.attr("xmlns")
    }

    /// `version` attribute on the root, if any.
    pub fn version_attr(&self) -> Option<&str> {
        self.root.attr("version")
    }

    /// Text of the first descendant leaf element named `name`.
    pub fn leaf_text(&self, name: &str) -> Option<String> {
        if self.root.name == name {
            return Some(self.root.text());
        }
        self.root.find(name).map(|e| e.text())
    }

    /// Whether the root has a direct child section named `name`.
    pub fn has_section(&self, name: &str) -> bool {
        self.root.child(name).is_some()
    }

    /// Deterministic canonical serialization: no XML declaration,
    /// attributes sorted lexicographically, text trimmed at parse time,
    /// empty elements written as start/end pairs.
    pub fn canonicalize(&self) -> String {
        let mut out = String::new();
        self.root.write_canonical(&mut out);
        out
    }
}

/// Wrap `fragment` and `sibling` in a new container element so the
/// sibling sits immediately after the fragment's root. Used to place a
/// signature block next to the element it signs.
pub fn wrap_with_sibling(
    container_name: &str,
    fragment: XmlElement,
    sibling: XmlElement,
) -> XmlElement {
    XmlElement::new(container_name)
        .with_child(fragment)
        .with_child(sibling)
}

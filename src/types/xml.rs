//! Arena-backed XML element tree for container parts
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Removing a
//! node detaches it from its parent; the id stays valid (and unreachable
//! from the root), so detections collected before a removal can still be
//! looked up afterwards.
//!
//! Names are kept exactly as written (`prefix:local`) so serialization
//! round-trips, while every element and attribute also carries its resolved
//! namespace URI for lookups.

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::XmlError;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace (`r:id`, `r:embed`, ...)
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Package relationships namespace (`.rels` parts)
pub const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
/// DrawingML main namespace (theme parts)
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Stable identity of a node inside one [`XmlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Qualified name as written in the source, plus its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QualifiedName {
    fn split(raw: &str) -> (Option<String>, String) {
        match raw.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, raw.to_string()),
        }
    }

    /// Name as it appears in markup
    pub fn raw(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local)),
            None => Cow::Borrowed(&self.local),
        }
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QualifiedName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// A parsed XML document
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Whitespace, comments and processing instructions before the root element
    prolog: Vec<NodeId>,
    /// XML declaration content as written, without the `<?` `?>` delimiters
    declaration: Option<String>,
}

impl XmlTree {
    /// Parses a complete XML document
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let source = std::str::from_utf8(bytes).map_err(|_| XmlError::Encoding)?;

        let mut reader = Reader::from_str(source);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        // Namespace scopes: one frame per open element
        let mut scopes: Vec<Vec<(Option<String>, String)>> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut prolog = Vec::new();
        let mut declaration = None;

        loop {
            match reader.read_event()? {
                Event::Decl(decl) => {
                    declaration = Some(String::from_utf8_lossy(&decl).into_owned());
                }
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(XmlError::TrailingContent);
                    }
                    let (element, frame) = Self::element_from(&start, &scopes)?;
                    scopes.push(frame);
                    let id = Self::push_node(&mut nodes, &stack, NodeKind::Element(element));
                    if stack.is_empty() {
                        root = Some(id);
                    }
                    stack.push(id);
                }
                Event::Empty(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(XmlError::TrailingContent);
                    }
                    let (element, frame) = Self::element_from(&start, &scopes)?;
                    scopes.push(frame);
                    let id = Self::push_node(&mut nodes, &stack, NodeKind::Element(element));
                    scopes.pop();
                    if stack.is_empty() {
                        root = Some(id);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    scopes.pop();
                }
                Event::Text(text) => {
                    let value = text.unescape()?.into_owned();
                    if stack.is_empty() {
                        if !value.trim().is_empty() {
                            return Err(XmlError::TrailingContent);
                        }
                        if root.is_none() {
                            let id = Self::push_node(&mut nodes, &stack, NodeKind::Text(value));
                            prolog.push(id);
                        }
                        continue;
                    }
                    Self::push_node(&mut nodes, &stack, NodeKind::Text(value));
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if stack.is_empty() {
                        return Err(XmlError::TrailingContent);
                    }
                    Self::push_node(&mut nodes, &stack, NodeKind::CData(value));
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(&comment).into_owned();
                    let id = Self::push_node(&mut nodes, &stack, NodeKind::Comment(value));
                    if stack.is_empty() && root.is_none() {
                        prolog.push(id);
                    }
                }
                Event::PI(pi) => {
                    let value = String::from_utf8_lossy(&pi).into_owned();
                    let id =
                        Self::push_node(&mut nodes, &stack, NodeKind::ProcessingInstruction(value));
                    if stack.is_empty() && root.is_none() {
                        prolog.push(id);
                    }
                }
                Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            let name = match &nodes[open.0].kind {
                NodeKind::Element(element) => element.name.raw().into_owned(),
                _ => String::new(),
            };
            return Err(XmlError::Unclosed(name));
        }

        let root = root.ok_or(XmlError::MissingRoot)?;
        Ok(Self {
            nodes,
            root,
            prolog,
            declaration,
        })
    }

    fn push_node(nodes: &mut Vec<Node>, stack: &[NodeId], kind: NodeKind) -> NodeId {
        let id = NodeId(nodes.len());
        let parent = stack.last().copied();
        nodes.push(Node { kind, parent });
        if let Some(parent) = parent {
            if let NodeKind::Element(element) = &mut nodes[parent.0].kind {
                element.children.push(id);
            }
        }
        id
    }

    fn element_from(
        start: &BytesStart<'_>,
        scopes: &[Vec<(Option<String>, String)>],
    ) -> Result<(Element, Vec<(Option<String>, String)>), XmlError> {
        let raw_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut frame = Vec::new();
        let mut raw_attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            if key == "xmlns" {
                frame.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.push((Some(prefix.to_string()), value.clone()));
            }
            raw_attributes.push((key, value));
        }

        let lookup = |prefix: Option<&str>| -> Option<String> {
            if prefix == Some("xml") {
                return Some(XML_NS.to_string());
            }
            frame
                .iter()
                .chain(scopes.iter().rev().flatten())
                .find(|(declared, _)| declared.as_deref() == prefix)
                .map(|(_, uri)| uri.clone())
                .filter(|uri| !uri.is_empty())
        };

        let (prefix, local) = QualifiedName::split(&raw_name);
        let namespace = lookup(prefix.as_deref());
        let name = QualifiedName {
            prefix,
            local,
            namespace,
        };

        let attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| {
                let (prefix, local) = QualifiedName::split(&key);
                // Unprefixed attributes are in no namespace
                let namespace = match prefix.as_deref() {
                    Some("xmlns") | None => None,
                    Some(p) => lookup(Some(p)),
                };
                Attribute {
                    name: QualifiedName {
                        prefix,
                        local,
                        namespace,
                    },
                    value,
                }
            })
            .collect();

        Ok((
            Element {
                name,
                attributes,
                children: Vec::new(),
            },
            frame,
        ))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// True when the node is still reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Child elements only, skipping text and comments
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.element(*child).is_some())
    }

    pub fn is_element(&self, id: NodeId, namespace: &str, local: &str) -> bool {
        self.element(id).map_or(false, |e| e.name.is(namespace, local))
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.local.as_str())
    }

    /// First child element with the given name
    pub fn find_child(&self, id: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|child| self.is_element(*child, namespace, local))
    }

    /// Namespaced attribute value
    pub fn attr(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Unprefixed attribute value (`.rels` entries, theme font scripts)
    pub fn attr_plain(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Pre-order elements of the whole document with the given name
    pub fn elements_named<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(self.root)
            .filter(move |id| self.is_element(*id, namespace, local))
    }

    /// Nearest ancestor element with the given name
    pub fn ancestor_named(&self, id: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.is_element(node, namespace, local) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Concatenated text of every `w:t` under `id`
    pub fn text_of(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            if self.is_element(node, W_NS, "t") {
                text.push_str(&self.direct_text(node));
            }
        }
        text
    }

    /// Text and CDATA directly inside an element
    pub fn direct_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|child| match self.kind(*child) {
                NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Removes every attribute matching the predicate, returning how many went
    pub fn remove_attributes<F>(&mut self, id: NodeId, mut predicate: F) -> usize
    where
        F: FnMut(&Attribute) -> bool,
    {
        match self.element_mut(id) {
            Some(element) => {
                let before = element.attributes.len();
                element.attributes.retain(|a| !predicate(a));
                before - element.attributes.len()
            }
            None => 0,
        }
    }

    /// Detaches a node from its parent. Returns false for the root or an
    /// already detached node.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent else {
            return false;
        };
        if let Some(element) = self.element_mut(parent) {
            element.children.retain(|child| *child != id);
        }
        self.nodes[id.0].parent = None;
        true
    }

    /// Detaches a node without losing the text around it.
    ///
    /// The text that followed the node is appended to the text that preceded
    /// it (the previous sibling's tail, or the parent's leading text), so
    /// whitespace and punctuation between elements survive the removal.
    pub fn remove_merging_text(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent else {
            return false;
        };
        let Some(position) = self
            .element(parent)
            .and_then(|e| e.children.iter().position(|child| *child == id))
        else {
            return false;
        };

        self.detach(id);

        let children = self.children(parent).to_vec();
        if position == 0 || position >= children.len() {
            return true;
        }
        let (before, after) = (children[position - 1], children[position]);
        let trailing = match &self.nodes[after.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => return true,
        };
        if let NodeKind::Text(leading) = &mut self.nodes[before.0].kind {
            leading.push_str(&trailing);
            self.detach(after);
        }
        true
    }

    /// Serializes the document back to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        if let Some(declaration) = &self.declaration {
            out.push_str("<?");
            out.push_str(declaration);
            out.push_str("?>");
        }
        for id in &self.prolog {
            self.write_node(*id, &mut out);
        }
        self.write_node(self.root, &mut out);
        out.into_bytes()
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => {
                let name = element.name.raw();
                out.push('<');
                out.push_str(&name);
                for attr in &element.attributes {
                    out.push(' ');
                    out.push_str(&attr.name.raw());
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeKind::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
        }
    }
}

/// Escapes an attribute value, keeping line breaks and tabs as character
/// references so they survive attribute-value normalization
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

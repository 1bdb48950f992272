//! Raw record tree
//!
//! Parses harvested XML into an owned, namespace-resolved element tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{AppError, AppResult};

/// OAI-PMH namespace, used to locate `record` elements when splitting responses
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// An XML element with its resolved namespace and leading text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Namespace URI the element name is bound to, if any
    pub namespace: Option<String>,
    /// Element name without prefix
    pub local_name: String,
    /// Text before the first child element, comment or processing instruction, `None` when empty
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
    /// Pre-order index within the parsed document
    pub(crate) position: usize,
}

impl XmlNode {
    fn open(namespace: Option<String>, local_name: String, position: usize) -> Self {
        Self {
            namespace,
            local_name,
            text: None,
            children: Vec::new(),
            position,
        }
    }

    /// Whether this element has the given namespace URI and local name
    pub fn is(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == namespace
    }

    /// All descendants (excluding self) in document order
    pub fn descendants(&self) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&XmlNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// An element still being parsed
struct OpenElement {
    node: XmlNode,
    /// Set once a child, comment or processing instruction ends the leading text
    text_closed: bool,
}

impl OpenElement {
    fn new(node: XmlNode) -> Self {
        Self {
            node,
            text_closed: false,
        }
    }

    // Text after the first child is tail text and is not part of `text`
    fn push_text(&mut self, text: &str) {
        if self.text_closed || !self.node.children.is_empty() || text.is_empty() {
            return;
        }
        match self.node.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => self.node.text = Some(text.to_string()),
        }
    }
}

/// One parsed metadata record (or a whole harvest response)
///
/// Immutable once parsed; transformers only borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    root: XmlNode,
}

impl RawRecord {
    /// Parse XML text into a record tree
    pub fn parse(xml: &str) -> AppResult<Self> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<OpenElement> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut position = 0usize;

        loop {
            match reader.read_resolved_event()? {
                (ns, Event::Start(e)) => {
                    let node = XmlNode::open(resolve_namespace(ns)?, local_name(&e), position);
                    position += 1;
                    stack.push(OpenElement::new(node));
                }
                (ns, Event::Empty(e)) => {
                    let node = XmlNode::open(resolve_namespace(ns)?, local_name(&e), position);
                    position += 1;
                    attach(&mut stack, &mut root, node)?;
                }
                (_, Event::End(_)) => {
                    let open = stack
                        .pop()
                        .ok_or_else(|| AppError::MalformedXml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, open.node)?;
                }
                (_, Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&e.unescape()?);
                    }
                }
                (_, Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                (_, Event::Comment(_)) | (_, Event::PI(_)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text_closed = true;
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(AppError::MalformedXml(format!(
                "unclosed element <{}>",
                open.node.local_name
            )));
        }

        let root = root.ok_or_else(|| AppError::MalformedXml("document has no root element".to_string()))?;
        tracing::debug!("Parsed XML tree rooted at <{}>", root.local_name);

        Ok(Self { root })
    }

    /// Wrap an already-built element as a record
    pub fn from_node(root: XmlNode) -> Self {
        Self { root }
    }

    /// The context element queries are evaluated against
    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// Split an OAI-PMH response into its `oai:record` elements
    ///
    /// A document that is itself a bare record (or has no `oai:record`
    /// elements at all) is returned as the only record.
    pub fn records(&self) -> Vec<RawRecord> {
        if self.root.is(Some(OAI_NAMESPACE), "record") {
            return vec![self.clone()];
        }

        let records: Vec<RawRecord> = self
            .root
            .descendants()
            .into_iter()
            .filter(|node| node.is(Some(OAI_NAMESPACE), "record"))
            .map(|node| RawRecord::from_node(node.clone()))
            .collect();

        if records.is_empty() {
            vec![self.clone()]
        } else {
            records
        }
    }
}

fn resolve_namespace(ns: ResolveResult<'_>) -> AppResult<Option<String>> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(AppError::MalformedXml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attach(stack: &mut [OpenElement], root: &mut Option<XmlNode>, node: XmlNode) -> AppResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.node.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(AppError::MalformedXml("multiple root elements".to_string()));
    }
    *root = Some(node);
    Ok(())
}

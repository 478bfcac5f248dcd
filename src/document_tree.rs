use std::borrow::Cow;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use crate::errors::DocumentError;
use crate::segment_engine::LineCollector;

// @module: WordprocessingML tree parsing, serialization and traversal

// @const: Text run pattern for raw (non-container) XML input
static TEXT_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").unwrap()
});

/// Paragraph container tag
pub const PARAGRAPH_TAG: &str = "w:p";
/// Table container tag
pub const TABLE_TAG: &str = "w:tbl";
/// Table row tag
pub const TABLE_ROW_TAG: &str = "w:tr";
/// Table cell tag
pub const TABLE_CELL_TAG: &str = "w:tc";

/// Literal text runs: the only nodes the replacement engine mutates
const LITERAL_TEXT_TAG: &str = "w:t";

/// All text-bearing leaves that contribute to a paragraph's projection
const TEXT_TAGS: [&str; 3] = ["w:t", "w:delText", "w:instrText"];
const TAB_TAG: &str = "w:tab";
const BREAK_TAGS: [&str; 2] = ["w:br", "w:cr"];

/// What a node inside a paragraph contributes to the logical string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunNodeKind {
    /// Literal, deleted or field-instruction text: contributes its content
    TextLeaf,
    /// Tab marker: contributes a single tab character
    TabMarker,
    /// Line or paragraph break: contributes a single newline
    BreakMarker,
    /// Anything else: contributes whatever its children contribute
    Container,
}

/// Classify a paragraph-level node by its qualified tag name
pub fn classify_run_node(name: &str) -> RunNodeKind {
    if TEXT_TAGS.contains(&name) {
        RunNodeKind::TextLeaf
    } else if name == TAB_TAG {
        RunNodeKind::TabMarker
    } else if BREAK_TAGS.contains(&name) {
        RunNodeKind::BreakMarker
    } else {
        RunNodeKind::Container
    }
}

/// One node of the parsed XML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An XML element with its attributes and children, preserved for round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    // @field: Qualified tag name, e.g. "w:t"
    pub name: String,

    // @field: Attributes in document order (decoded values)
    pub attributes: Vec<(String, String)>,

    // @field: Child nodes in document order
    pub children: Vec<XmlNode>,

    // @field: Whether the source element was self-closing
    pub self_closing: bool,
}

impl Element {
    /// Create an empty element with the given qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Check the qualified tag name
    pub fn is(&self, tag: &str) -> bool {
        self.name == tag
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given qualified name
    pub fn find_child(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.is(tag))
    }

    /// Mutable access to the first child element with the given name
    pub fn find_child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) if element.is(tag) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text content of this element and its descendants
    pub fn text_value(&self) -> String {
        let mut out = String::new();
        self.append_text_value(&mut out);
        out
    }

    fn append_text_value(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                XmlNode::Element(element) => element.append_text_value(out),
                _ => {}
            }
        }
    }

    /// Replace this element's content with a single text node. Attributes
    /// are left untouched.
    pub fn set_text(&mut self, value: &str) {
        self.children.clear();
        if !value.is_empty() {
            self.children.push(XmlNode::Text(value.to_string()));
            self.self_closing = false;
        }
    }
}

/// The XML declaration of a parsed part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        XmlDeclaration {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: Some("yes".to_string()),
        }
    }
}

/// A parsed XML part: declaration plus the top-level node sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a part's XML text into an owned node tree
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);

        let mut declaration = None;
        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        fn attach(stack: &mut [Element], nodes: &mut Vec<XmlNode>, node: XmlNode) {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else {
                nodes.push(node);
            }
        }

        loop {
            match reader.read_event() {
                Err(e) => return Err(DocumentError::Xml(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Decl(decl)) => {
                    declaration = Some(parse_declaration(&decl));
                }
                Ok(Event::Start(start)) => {
                    stack.push(element_from_start(&start, false)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start, true)?;
                    attach(&mut stack, &mut nodes, XmlNode::Element(element));
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DocumentError::Xml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut nodes, XmlNode::Element(element));
                }
                Ok(Event::Text(text)) => {
                    let decoded = text
                        .unescape()
                        .map_err(|e| DocumentError::Xml(e.to_string()))?
                        .into_owned();
                    attach(&mut stack, &mut nodes, XmlNode::Text(decoded));
                }
                Ok(Event::CData(cdata)) => {
                    let content = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                    attach(&mut stack, &mut nodes, XmlNode::CData(content));
                }
                Ok(Event::Comment(comment)) => {
                    let content = String::from_utf8_lossy(comment.as_ref()).into_owned();
                    attach(&mut stack, &mut nodes, XmlNode::Comment(content));
                }
                Ok(Event::PI(pi)) => {
                    let content = String::from_utf8_lossy(pi.as_ref()).into_owned();
                    attach(&mut stack, &mut nodes, XmlNode::ProcessingInstruction(content));
                }
                Ok(Event::DocType(doctype)) => {
                    let content = String::from_utf8_lossy(doctype.as_ref()).into_owned();
                    attach(&mut stack, &mut nodes, XmlNode::DocType(content));
                }
            }
        }

        if !stack.is_empty() {
            return Err(DocumentError::Xml("unclosed element at end of input".to_string()));
        }

        Ok(XmlDocument { declaration, nodes })
    }

    /// First top-level element: the document root
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Mutable access to the document root
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Make sure a declaration is written even when the source had none
    pub fn ensure_declaration(&mut self) {
        if self.declaration.is_none() {
            self.declaration = Some(XmlDeclaration::default());
        }
    }

    /// Serialize the tree back to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());

        if let Some(declaration) = &self.declaration {
            let decl = BytesDecl::new(
                &declaration.version,
                declaration.encoding.as_deref(),
                declaration.standalone.as_deref(),
            );
            writer
                .write_event(Event::Decl(decl))
                .map_err(|e| DocumentError::Xml(e.to_string()))?;
        }

        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }

        Ok(writer.into_inner())
    }
}

fn parse_declaration(decl: &BytesDecl) -> XmlDeclaration {
    let version = decl
        .version()
        .map(|v| String::from_utf8_lossy(&v).into_owned())
        .unwrap_or_else(|_| "1.0".to_string());
    let encoding = decl
        .encoding()
        .and_then(|e| e.ok())
        .map(|e| String::from_utf8_lossy(&e).into_owned());
    let standalone = decl
        .standalone()
        .and_then(|s| s.ok())
        .map(|s| String::from_utf8_lossy(&s).into_owned());

    XmlDeclaration {
        version,
        encoding,
        standalone,
    }
}

fn element_from_start(start: &BytesStart, self_closing: bool) -> Result<Element, DocumentError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DocumentError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| DocumentError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing,
    })
}

fn xml_error<E: std::fmt::Display>(error: E) -> DocumentError {
    DocumentError::Xml(error.to_string())
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), DocumentError> {
    match node {
        XmlNode::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            if element.self_closing && element.children.is_empty() {
                writer.write_event(Event::Empty(start)).map_err(xml_error)?;
            } else {
                writer.write_event(Event::Start(start)).map_err(xml_error)?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(element.name.as_str())))
                    .map_err(xml_error)?;
            }
        }
        XmlNode::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
        }
        XmlNode::CData(content) => {
            writer
                .write_event(Event::CData(BytesCData::new(content.as_str())))
                .map_err(xml_error)?;
        }
        XmlNode::Comment(content) => {
            writer
                .write_event(Event::Comment(BytesText::from_escaped(content.as_str())))
                .map_err(xml_error)?;
        }
        XmlNode::ProcessingInstruction(content) => {
            writer
                .write_event(Event::PI(BytesPI::new(content.as_str())))
                .map_err(xml_error)?;
        }
        XmlNode::DocType(content) => {
            writer
                .write_event(Event::DocType(BytesText::from_escaped(content.as_str())))
                .map_err(xml_error)?;
        }
    }

    Ok(())
}

/// Locate the `w:body` anchor under the document root. Its absence is a
/// fatal structural error for the whole document.
pub fn document_body(document: &XmlDocument) -> Result<&Element, DocumentError> {
    document
        .root()
        .ok_or(DocumentError::MissingAnchor("document root"))?
        .find_child("w:body")
        .ok_or(DocumentError::MissingAnchor("w:body"))
}

/// Mutable counterpart of [`document_body`]
pub fn document_body_mut(document: &mut XmlDocument) -> Result<&mut Element, DocumentError> {
    document
        .root_mut()
        .ok_or(DocumentError::MissingAnchor("document root"))?
        .find_child_mut("w:body")
        .ok_or(DocumentError::MissingAnchor("w:body"))
}

/// Project one paragraph into its logical string: text leaves contribute
/// their content, tab markers a tab, break markers a newline, containers
/// whatever their children contribute.
pub fn paragraph_logical_text(paragraph: &Element) -> String {
    let mut text = String::new();
    append_run_text(paragraph, &mut text);
    text
}

fn append_run_text(element: &Element, out: &mut String) {
    for child in element.child_elements() {
        match classify_run_node(&child.name) {
            RunNodeKind::TextLeaf => out.push_str(&child.text_value()),
            RunNodeKind::TabMarker => out.push('\t'),
            RunNodeKind::BreakMarker => out.push('\n'),
            RunNodeKind::Container => append_run_text(child, out),
        }
    }
}

/// Walk a container in document order and collect the normalized lines of
/// every paragraph, descending through tables and generic containers
pub fn collect_container_lines(container: &Element, collector: &mut LineCollector) {
    for child in container.child_elements() {
        if child.is(PARAGRAPH_TAG) {
            collector.push_paragraph(&paragraph_logical_text(child));
        } else if child.is(TABLE_TAG) {
            collect_table_lines(child, collector);
        } else {
            collect_container_lines(child, collector);
        }
    }
}

fn collect_table_lines(table: &Element, collector: &mut LineCollector) {
    for row in table.child_elements().filter(|element| element.is(TABLE_ROW_TAG)) {
        for cell in row.child_elements().filter(|element| element.is(TABLE_CELL_TAG)) {
            collect_container_lines(cell, collector);
        }
    }
}

/// Collect every paragraph under a container, in document order. Traversal
/// stops at each paragraph: nested paragraphs (text boxes) are handled as
/// part of their outer paragraph's run sequence, never twice.
pub fn collect_paragraphs_mut<'a>(element: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for child in element.children.iter_mut() {
        if let XmlNode::Element(child_element) = child {
            if child_element.is(PARAGRAPH_TAG) {
                out.push(child_element);
            } else {
                collect_paragraphs_mut(child_element, out);
            }
        }
    }
}

/// Collect the literal text runs (`w:t`) of one paragraph, in document
/// order. Deleted and field-instruction text is projected for export but
/// never rewritten.
pub fn collect_literal_text_mut<'a>(element: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for child in element.children.iter_mut() {
        if let XmlNode::Element(child_element) = child {
            if child_element.is(LITERAL_TEXT_TAG) {
                out.push(child_element);
            } else {
                collect_literal_text_mut(child_element, out);
            }
        }
    }
}

/// Scan a raw (non-container) WordprocessingML file for text runs without
/// building a tree, collecting their decoded contents
pub fn collect_raw_text_runs(xml: &str, collector: &mut LineCollector) {
    for capture in TEXT_RUN_REGEX.captures_iter(xml) {
        let inner = capture.get(1).map(|m| m.as_str()).unwrap_or("");
        if inner.trim_start().starts_with('<') {
            continue;
        }

        let decoded: Cow<str> = quick_xml::escape::unescape(inner).unwrap_or(Cow::Borrowed(inner));
        collector.push_line(&decoded);
    }
}

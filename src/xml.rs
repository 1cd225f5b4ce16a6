//! Low-level XML tree used to build OAI-PMH responses.
//!
//! Responses are assembled as an owned [`XmlElement`] tree. Every higher level
//! component appends to a caller-supplied parent through the two builder helpers,
//! [`create_element_with_children`] and [`append_new_element`], so element order
//! is always the order in which callers supply it.
//!
//! The tree is serialized with `quick-xml`, which takes care of escaping text and
//! attribute values. Characters XML 1.0 cannot carry at all (most C0 controls)
//! are refused at serialization time; [`strip_invalid_chars`] removes them from
//! untrusted text beforehand. Tag names are not validated here: callers must
//! supply protocol-legal names.
//!
//! # Examples
//!
//! ```
//! use oai_records::xml::{append_new_element, create_element_with_children, XmlElement};
//!
//! let mut root = XmlElement::new("ListRecords");
//! let header = create_element_with_children(
//!     &mut root,
//!     "header",
//!     [("identifier", "oai:example.org:1"), ("datestamp", "2020-01-02T03:04:05Z")],
//! );
//! append_new_element(header, "setSpec", "books");
//!
//! let xml = root.to_xml_string().unwrap();
//! assert!(xml.starts_with("<ListRecords><header><identifier>"));
//! ```

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{OaiError, Result};

/// A node inside an element: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Text content (stored unescaped)
    Text(String),
}

/// An XML element with ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a leaf element holding `text`. Empty text yields a childless element.
    #[must_use]
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = XmlElement::new(name);
        element.append_text(text);
        element
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Element name, including any namespace prefix (`oai_dc:dc`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing the value of an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// All child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Append an element after the existing children and return it for further mutation.
    pub fn append_child(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(XmlNode::Element(child));
        match self.children.last_mut() {
            Some(XmlNode::Element(element)) => element,
            _ => unreachable!("last child was just pushed as an element"),
        }
    }

    /// Append a text node. Empty strings are ignored.
    pub fn append_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// Iterate child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|element| element.name == name)
    }

    /// All direct child elements named `name`, in order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.child_elements().filter(move |element| element.name == name)
    }

    /// Concatenated text of the direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// True when the element has no children at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Serialize the element (without XML declaration) to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the destination fails.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::new(writer);
        write_element(&mut writer, self)
    }

    /// Serialize the element to a compact string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }

    /// Serialize the element with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_xml_string_pretty(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }

    /// Serialize as a standalone document with a UTF-8 XML declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_document_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }

    /// Parse an XML fragment with a single root element back into a tree.
    ///
    /// Text is kept exactly as written, surrounding whitespace included, except
    /// that whitespace-only text nodes (indentation) are dropped. Declarations,
    /// comments and processing instructions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Xml`] for malformed input, mismatched tags, more than one
    /// root element, or no root element at all.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OaiError::Xml("Unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::Text(text) => {
                    let text = text.unescape()?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    if let Some(current) = stack.last_mut() {
                        current.append_text(text.into_owned());
                    }
                },
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.append_text(String::from_utf8_lossy(&data).into_owned());
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if let Some(open) = stack.last() {
            return Err(OaiError::Xml(format!("Unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| OaiError::Xml("Document has no root element".to_string()))
    }
}

/// Create `tag` under `parent` and append one text leaf per `(name, value)` pair in
/// the order given. Returns the new element so callers can keep appending
/// (e.g. repeated `setSpec` leaves).
pub fn create_element_with_children<'a, I, K, V>(
    parent: &'a mut XmlElement,
    tag: &str,
    children: I,
) -> &'a mut XmlElement
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut element = XmlElement::new(tag);
    for (name, value) in children {
        element.append_child(XmlElement::with_text(name, value));
    }
    parent.append_child(element)
}

/// True if `c` may appear in an XML 1.0 document (the `Char` production).
#[must_use]
pub const fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Remove characters XML 1.0 cannot represent. Borrows when nothing is removed.
#[must_use]
pub fn strip_invalid_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

/// Append a single leaf element holding `text` under `parent`.
pub fn append_new_element<'a>(
    parent: &'a mut XmlElement,
    tag: &str,
    text: impl Into<String>,
) -> &'a mut XmlElement {
    parent.append_child(XmlElement::with_text(tag, text))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        check_chars(&element.name, value)?;
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(nested) => write_element(writer, nested)?,
            XmlNode::Text(text) => {
                check_chars(&element.name, text)?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
            },
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn check_chars(element: &str, text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(OaiError::Xml(format!(
            "<{element}> contains U+{:04X}, which XML 1.0 does not allow",
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.append_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(OaiError::Xml("Multiple root elements".to_string()));
    }
    *root = Some(element);
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| OaiError::Xml(format!("Invalid UTF-8 in XML name: {e}")))
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| OaiError::Xml(format!("Invalid UTF-8 output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_with_children_preserves_order() {
        let mut root = XmlElement::new("root");
        let header = create_element_with_children(
            &mut root,
            "header",
            vec![("identifier", "oai:a.b:1"), ("datestamp", "2020-01-01")],
        );
        append_new_element(header, "setSpec", "s1");

        let names: Vec<&str> = root
            .child("header")
            .unwrap()
            .child_elements()
            .map(XmlElement::name)
            .collect();
        assert_eq!(names, vec!["identifier", "datestamp", "setSpec"]);
    }

    #[test]
    fn test_append_does_not_reorder_existing_siblings() {
        let mut root = XmlElement::new("root");
        append_new_element(&mut root, "first", "1");
        append_new_element(&mut root, "second", "2");
        create_element_with_children(&mut root, "third", Vec::<(&str, &str)>::new());

        let names: Vec<&str> = root.child_elements().map(XmlElement::name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_serialization_compact() {
        let mut root = XmlElement::new("a").with_attribute("x", "1");
        append_new_element(&mut root, "b", "text");
        root.append_child(XmlElement::new("c"));

        assert_eq!(
            root.to_xml_string().unwrap(),
            r#"<a x="1"><b>text</b><c/></a>"#
        );
    }

    #[test]
    fn test_text_and_attribute_escaping() {
        let mut root = XmlElement::new("a").with_attribute("q", "say \"hi\" & <go>");
        append_new_element(&mut root, "b", "Tom & Jerry <cartoon>");
        let xml = root.to_xml_string().unwrap();

        assert!(xml.contains("Tom &amp; Jerry &lt;cartoon&gt;"));
        assert!(xml.contains("&quot;hi&quot;"));
        assert!(!xml.contains("<cartoon>"));
    }

    #[test]
    fn test_document_string_has_declaration() {
        let root = XmlElement::with_text("a", "b");
        let xml = root.to_document_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.ends_with("<a>b</a>"));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = XmlElement::new("a");
        element.set_attribute("k", "1");
        element.set_attribute("k", "2");
        assert_eq!(element.attribute("k"), Some("2"));
        assert_eq!(element.attributes().count(), 1);
    }

    #[test]
    fn test_empty_text_is_not_stored() {
        let element = XmlElement::with_text("a", "");
        assert!(element.is_empty());
        assert_eq!(element.to_xml_string().unwrap(), "<a/>");
    }

    #[test]
    fn test_parse_serialized_tree() {
        let mut root = XmlElement::new("record");
        let header = create_element_with_children(
            &mut root,
            "header",
            [("identifier", "oai:x.org:5 & 6")],
        );
        append_new_element(header, "setSpec", "a:b");

        let parsed = XmlElement::parse(&root.to_xml_string_pretty().unwrap()).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(matches!(
            XmlElement::parse("<a><b></a>"),
            Err(OaiError::Xml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_multiple_roots() {
        assert!(matches!(
            XmlElement::parse("<a/><b/>"),
            Err(OaiError::Xml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(XmlElement::parse(""), Err(OaiError::Xml(_))));
    }

    #[test]
    fn test_control_characters_refused_on_write() {
        let element = XmlElement::with_text("dc:title", "a\u{1}b");
        assert!(matches!(element.to_xml_string(), Err(OaiError::Xml(_))));

        let mut nested = XmlElement::new("metadata");
        nested.append_child(XmlElement::new("x").with_attribute("note", "bell\u{7}"));
        assert!(matches!(nested.to_document_string(), Err(OaiError::Xml(_))));
    }

    #[test]
    fn test_allowed_whitespace_controls_written() {
        let element = XmlElement::with_text("a", "line\tone\nline two");
        assert_eq!(
            element.to_xml_string().unwrap(),
            "<a>line\tone\nline two</a>"
        );
    }

    #[test]
    fn test_strip_invalid_chars() {
        assert!(matches!(strip_invalid_chars("plain"), Cow::Borrowed("plain")));
        assert_eq!(strip_invalid_chars("a\u{1}b\u{B}c\u{1F}"), "abc");
        assert_eq!(strip_invalid_chars("tab\tkept"), "tab\tkept");
        assert_eq!(strip_invalid_chars("\u{FFFE}emoji \u{1F40B}"), "emoji \u{1F40B}");
        assert!(!is_xml_char('\u{0}'));
        assert!(is_xml_char('\u{D}'));
    }

    #[test]
    fn test_parse_keeps_surrounding_whitespace() {
        let element = XmlElement::with_text("a", "  padded  ");
        let parsed = XmlElement::parse(&element.to_xml_string().unwrap()).unwrap();
        assert_eq!(parsed.text(), "  padded  ");

        let pretty = "<a>\n  <b> x </b>\n  <c/>\n</a>";
        let parsed = XmlElement::parse(pretty).unwrap();
        assert_eq!(parsed.children().len(), 2);
        assert_eq!(parsed.child("b").unwrap().text(), " x ");
    }

    #[test]
    fn test_find_all_and_text() {
        let root = XmlElement::parse("<h><s>one</s><i>x</i><s>two</s></h>").unwrap();
        let specs: Vec<String> = root.find_all("s").map(XmlElement::text).collect();
        assert_eq!(specs, vec!["one", "two"]);
    }
}

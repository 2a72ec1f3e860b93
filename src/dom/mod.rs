//! Generic element tree for GUI description documents
//!
//! The merge engine only needs tag names, ordered attributes, ordered child
//! elements and the text of `<text>`-like leaves, so that is all this keeps.
//! Comments and processing instructions are dropped while reading.

mod reader;
mod writer;

pub use reader::parse_document;
pub use writer::to_xml_string;

use thiserror::Error;

/// Errors raised while reading or writing GUI documents
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Document has no root element")]
    MissingRoot,
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// One element of a GUI document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the document
    pub tag: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Child elements in document order
    pub children: Vec<Element>,

    /// Concatenated character data directly inside this element
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Case-insensitive tag comparison
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Lowercased tag name, the form all tag lists are kept in
    pub fn tag_lower(&self) -> String {
        self.tag.to_ascii_lowercase()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, or the empty string when absent
    pub fn attr_or_empty(&self, name: &str) -> &str {
        self.attribute(name).unwrap_or("")
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// First child with the given tag (case-insensitive)
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(tag))
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.is(tag))
    }

    /// First child with the given tag and `name` attribute
    pub fn element_named(&self, tag: &str, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.is(tag) && c.attr_or_empty("name") == name)
    }

    /// Text of the first `<text>` child, falling back to the `name` attribute
    pub fn caption(&self) -> &str {
        match self.child("text") {
            Some(text) if !text.text.is_empty() => &text.text,
            _ => self.attr_or_empty("name"),
        }
    }

    /// Depth-first count of this element and all descendants
    pub fn descendant_count(&self) -> usize {
        1 + self.children.iter().map(Element::descendant_count).sum::<usize>()
    }
}

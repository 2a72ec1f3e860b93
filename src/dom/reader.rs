// Document reader
//
// Builds an Element tree from XML text with quick-xml.

use super::{DocumentError, Element};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

/// Parse XML text and return its root element
pub fn parse_document(contents: &str) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_str(contents);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                stack.push(element_from_start(e)?);
            }
            Event::Empty(ref e) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Malformed("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(ref c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::Eof => break,
            // comments, declarations, doctype, processing instructions
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocumentError::Malformed(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.tag.as_str()).unwrap_or_default()
        )));
    }

    let root = root.ok_or(DocumentError::MissingRoot)?;
    trace!(
        "Parsed document <{}> with {} elements",
        root.tag,
        root.descendant_count()
    );
    Ok(root)
}

fn element_from_start(start: &BytesStart) -> Result<Element, DocumentError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).to_string());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // a second top-level element is ignored, the first one is the document
        None if root.is_none() => *root = Some(element),
        None => {}
    }
}

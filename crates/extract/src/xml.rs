//! Minimal owned XML element tree.
//!
//! Descriptors are tiny, so the whole document is read into memory as a tree
//! of [`Element`]s and queried by direct-child name, the same way the game
//! itself reads them.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}
impl Element {
    /// Parses a complete XML document and returns its root element.
    ///
    /// Comments, processing instructions and the XML declaration are ignored.
    /// Mismatched or unclosed tags, undefined entities, a missing root or
    /// content after the root are all reported as
    /// [`MalformedDocument`](ErrorKind::MalformedDocument).
    #[instrument(level = "trace", skip(xml), fields(xml_size = xml.len()))]
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let position = reader.buffer_position();
                    return Err(err).or_raise(|| ErrorKind::MalformedDocument(format!("invalid XML near byte {position}")));
                },
            };
            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        exn::bail!(ErrorKind::MalformedDocument("content after root element".to_string()));
                    }
                    stack.push(Self::open(&start)?);
                },
                Event::Empty(start) => {
                    let element = Self::open(&start)?;
                    Self::close(&mut stack, &mut root, element)?;
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_raise(|| ErrorKind::MalformedDocument("unexpected closing tag".to_string()))?;
                    Self::close(&mut stack, &mut root, element)?;
                },
                Event::Text(text) => {
                    let text = text.unescape().or_raise(|| ErrorKind::MalformedDocument("invalid text".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.text.push_str(&text),
                        None if text.trim().is_empty() => {},
                        None => exn::bail!(ErrorKind::MalformedDocument("text outside root element".to_string())),
                    }
                },
                Event::CData(cdata) => {
                    let text = cdata.decode().or_raise(|| ErrorKind::MalformedDocument("invalid CDATA".to_string()))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&text);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }
        if let Some(open) = stack.last() {
            exn::bail!(ErrorKind::MalformedDocument(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_raise(|| ErrorKind::MalformedDocument("no root element".to_string()))
    }

    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute =
                attribute.or_raise(|| ErrorKind::MalformedDocument("invalid attribute".to_string()))?;
            let value = attribute
                .unescape_value()
                .or_raise(|| ErrorKind::MalformedDocument("invalid attribute value".to_string()))?;
            attributes.push((String::from_utf8_lossy(attribute.key.as_ref()).into_owned(), value.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Self::default()
        })
    }

    fn close(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => exn::bail!(ErrorKind::MalformedDocument("content after root element".to_string())),
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All text directly inside this element, excluding its children's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every direct child with the given name, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

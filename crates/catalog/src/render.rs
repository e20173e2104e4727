//! The catalog document.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <ModRepo>
//!   <ModVersion ModID="foo" Version="1.0.0" Name="Foo" Author="Bar" Url="..." Digest="sha256:...">
//!     <Branch Value="stable" />
//!   </ModVersion>
//! </ModRepo>
//! ```

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use modrepo_extract::models::MetadataRecord;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::borrow::Cow;
use tracing::instrument;

const ROOT: &str = "ModRepo";
const ENTRY: &str = "ModVersion";
const BRANCH: &str = "Branch";
const BRANCH_VALUE: &str = "Value";
const INDENT: usize = 2;

/// Render `records`, in the order given, as the catalog document.
///
/// The output matches catalogs written by Python's ElementTree byte for byte:
/// empty elements close with ` />`, and attribute values escape `&`, `<`, `>`
/// and `"` as entities and tab and line breaks as character references.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn render(records: &[MetadataRecord]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .or_raise(|| ErrorKind::Serialize)?;
    if records.is_empty() {
        writer.write_event(empty(BytesStart::new(ROOT))?).or_raise(|| ErrorKind::Serialize)?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(ROOT))).or_raise(|| ErrorKind::Serialize)?;
        for record in records {
            write_record(&mut writer, record)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT))).or_raise(|| ErrorKind::Serialize)?;
    }
    let mut document = writer.into_inner();
    document.push(b'\n');
    String::from_utf8(document).or_raise(|| ErrorKind::Serialize)
}

fn write_record(writer: &mut Writer<Vec<u8>>, record: &MetadataRecord) -> Result<()> {
    let fields = [
        ("ModID", record.id()),
        ("Version", record.version()),
        ("Name", record.name()),
        ("Author", record.author()),
        ("Url", record.url()),
        ("Digest", record.digest()),
    ];
    let mut element = BytesStart::new(ENTRY);
    for (key, value) in fields {
        push_attribute(&mut element, key, value);
    }
    if record.branches().is_empty() {
        return writer.write_event(empty(element)?).or_raise(|| ErrorKind::Serialize);
    }
    writer.write_event(Event::Start(element)).or_raise(|| ErrorKind::Serialize)?;
    for branch in record.branches() {
        let mut child = BytesStart::new(BRANCH);
        push_attribute(&mut child, BRANCH_VALUE, branch);
        writer.write_event(empty(child)?).or_raise(|| ErrorKind::Serialize)?;
    }
    writer.write_event(Event::End(BytesEnd::new(ENTRY))).or_raise(|| ErrorKind::Serialize)
}

/// An empty element closed ElementTree style, with a space before `/>`.
fn empty(element: BytesStart<'_>) -> Result<Event<'static>> {
    let name_len = element.name().as_ref().len();
    let mut content = String::from_utf8(element.to_vec()).or_raise(|| ErrorKind::Serialize)?;
    content.push(' ');
    Ok(Event::Empty(BytesStart::from_content(content, name_len)))
}

fn push_attribute(element: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape_attribute(value);
    // The byte-pair conversion writes the value verbatim; escaping is ours.
    element.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
}

fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#09;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

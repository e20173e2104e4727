//! Descriptor (`About/About.xml`) parsing.

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::Descriptor;
use crate::xml::Element;
use exn::{OptionExt, ResultExt};
use std::path::Path;
use tracing::instrument;

/// Anything a descriptor can be read from, resolved into an [`Element`] once
/// before the actual field extraction happens.
#[derive(Debug)]
pub enum DescriptorSource<'a> {
    /// Raw XML text, e.g. read out of an archive.
    Text(&'a str),
    /// An already-parsed document root.
    Document(&'a Element),
    /// A descriptor file on disk.
    File(&'a Path),
}
impl<'a> From<&'a str> for DescriptorSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}
impl<'a> From<&'a Element> for DescriptorSource<'a> {
    fn from(element: &'a Element) -> Self {
        Self::Document(element)
    }
}
impl<'a> From<&'a Path> for DescriptorSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::File(path)
    }
}

/// Parses a descriptor into its fields.
///
/// # Errors
///
/// - [`MalformedDocument`](ErrorKind::MalformedDocument) if the text is not XML.
/// - [`MissingField`](ErrorKind::MissingField) naming the first absent (or
///   blank) element out of `ModID`, `Version`, `Name` and `Author`.
/// - [`Io`](ErrorKind::Io) if a descriptor file could not be read.
#[instrument(skip(source), fields(mod_id))]
pub fn parse<'a>(source: impl Into<DescriptorSource<'a>>) -> Result<Descriptor> {
    let descriptor = match source.into() {
        DescriptorSource::Text(text) => from_element(&Element::parse(text)?),
        DescriptorSource::Document(root) => from_element(root),
        DescriptorSource::File(path) => {
            let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Io)?;
            from_element(&Element::parse(&text)?)
        },
    }?;
    tracing::Span::current().record("mod_id", descriptor.id());
    Ok(descriptor)
}

fn from_element(root: &Element) -> Result<Descriptor> {
    Ok(Descriptor::new(
        required(root, consts::MOD_ID)?,
        required(root, consts::VERSION)?,
        required(root, consts::NAME)?,
        required(root, consts::AUTHOR)?,
    )?
    .with_tags(tags(root))
    .with_dependencies(dependencies(root))
    .with_branches(branches(root)))
}

fn required<'a>(root: &'a Element, field: &'static str) -> Result<&'a str> {
    root.child(field)
        .map(|el| el.text().trim())
        .filter(|text| !text.is_empty())
        .ok_or_raise(|| ErrorKind::MissingField(field))
}

/// `<Tags><Tag>…</Tag></Tags>`, first `Tags` container only.
fn tags(root: &Element) -> Vec<&str> {
    root.child(consts::TAGS)
        .map(|tags| tags.children(consts::TAG).map(|tag| tag.text()).collect())
        .unwrap_or_default()
}

/// `<DependsOn ModID="…"/>`, or `WorkshopHandle` when `ModID` is absent or empty.
fn dependencies(root: &Element) -> Vec<&str> {
    root.children(consts::DEPENDS_ON)
        .map(|dependency| {
            dependency
                .attribute(consts::MOD_ID)
                .filter(|id| !id.is_empty())
                .or_else(|| dependency.attribute(consts::WORKSHOP_HANDLE))
                .unwrap_or_default()
        })
        .collect()
}

fn branches(root: &Element) -> Vec<&str> {
    root.children(consts::BRANCH).map(|branch| branch.text()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FULL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ModMetaData>
    <ModID>  foo  </ModID>
    <Version>1.2.0</Version>
    <Name>Foo &amp; Friends</Name>
    <Author>Bar</Author>
    <Tags>
        <Tag>QoL</Tag>
        <Tag>   </Tag>
        <Tag>UI</Tag>
    </Tags>
    <DependsOn ModID="core" />
    <DependsOn WorkshopHandle="12345" />
    <DependsOn ModID="" WorkshopHandle="fallback" />
    <DependsOn />
    <Branch>stable</Branch>
    <Branch> beta </Branch>
    <Branch>stable</Branch>
</ModMetaData>
"#;

    #[test]
    fn test_parse_full_descriptor() {
        let descriptor = parse(FULL).unwrap();
        assert_eq!(descriptor.id(), "foo");
        assert_eq!(descriptor.version(), "1.2.0");
        assert_eq!(descriptor.name(), "Foo & Friends");
        assert_eq!(descriptor.author(), "Bar");
        assert_eq!(descriptor.tags(), &["QoL".to_string(), "UI".to_string()]);
        assert_eq!(descriptor.depends_on(), &["core".to_string(), "12345".to_string(), "fallback".to_string()]);
        assert_eq!(descriptor.branches().iter().collect::<Vec<_>>(), vec!["beta", "stable"]);
    }

    #[test]
    fn test_parse_minimal_descriptor() {
        let xml = "<M><ModID>a</ModID><Version>1</Version><Name>A</Name><Author>B</Author></M>";
        let descriptor = parse(xml).unwrap();
        assert!(descriptor.tags().is_empty());
        assert!(descriptor.depends_on().is_empty());
        assert!(descriptor.branches().is_empty());
    }

    #[rstest]
    #[case("<M><Version>1</Version><Name>A</Name><Author>B</Author></M>", "ModID")]
    #[case("<M><ModID>a</ModID><Name>A</Name><Author>B</Author></M>", "Version")]
    #[case("<M><ModID>a</ModID><Version>1</Version><Author>B</Author></M>", "Name")]
    #[case("<M><ModID>a</ModID><Version>1</Version><Name>A</Name></M>", "Author")]
    #[case("<M><ModID>a</ModID><Version> </Version><Name>A</Name><Author>B</Author></M>", "Version")]
    #[case("<M><ModID/><Version>1</Version><Name>A</Name><Author>B</Author></M>", "ModID")]
    fn test_parse_missing_field(#[case] xml: &str, #[case] field: &'static str) {
        let err = parse(xml).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField(field));
    }

    #[test]
    fn test_nested_fields_are_not_required_fields() {
        let xml = "<M><Meta><ModID>a</ModID></Meta><Version>1</Version><Name>A</Name><Author>B</Author></M>";
        let err = parse(xml).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("ModID"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse("<M><ModID>a</ModID>").unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedDocument(_)));
    }

    #[test]
    fn test_parse_from_document() {
        let root = Element::parse(FULL).unwrap();
        assert_eq!(parse(&root).unwrap(), parse(FULL).unwrap());
    }

    #[test]
    fn test_parse_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("About.xml");
        std::fs::write(&path, FULL).unwrap();
        let descriptor = parse(path.as_path()).unwrap();
        assert_eq!(descriptor.id(), "foo");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse(Path::new("/definitely/not/here/About.xml")).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }
}

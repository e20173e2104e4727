//! Everything that can be learned about a mod from its archive alone.
//!
//! - [`VersionKey`](models::VersionKey): the ad hoc, total ordering used to
//!   sort mod versions (see [`compare`]).
//! - [`ArchiveInspector`]: finds `About/About.xml` inside a zip archive.
//! - [`parse`]: turns descriptor XML into a [`Descriptor`](models::Descriptor).
//! - [`digest`]: the `sha256:` content digest recorded for every archive.

mod archive;
mod compare;
mod consts;
mod digest;
pub mod error;
pub mod models;
mod parse;
mod xml;

use tracing::instrument;

pub use crate::archive::{ArchiveInspector, inspect};
pub use crate::consts::{DESCRIPTOR_PATH, DIGEST_PREFIX};
pub use crate::digest::digest;
use crate::error::Result;
use crate::models::MetadataRecord;
pub use crate::parse::{DescriptorSource, parse};
pub use crate::xml::Element;

/// What an archive turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// The archive carries a valid descriptor.
    Mod(MetadataRecord),
    /// The archive is a valid zip file without a descriptor.
    NotAMod,
}

/// Easy, top-level entrypoint for turning raw archive bytes into a
/// [`MetadataRecord`].
///
/// The digest is computed from `bytes` (never taken from the caller), and
/// `url` is recorded as the archive's source.
///
/// # Errors
///
/// Fails if the bytes are not a zip archive, or the descriptor is present but
/// malformed or missing required fields. An archive without a descriptor, or
/// with an empty one, is not an error: it is [`Inspection::NotAMod`].
#[instrument(skip(bytes), fields(archive_size = bytes.as_ref().len()))]
pub fn extract(bytes: impl AsRef<[u8]>, url: &str) -> Result<Inspection> {
    let bytes = bytes.as_ref();
    let Some(text) = inspect(bytes)?.filter(|text| !text.is_empty()) else {
        return Ok(Inspection::NotAMod);
    };
    let descriptor = parse(text.as_str())?;
    Ok(Inspection::Mod(MetadataRecord::new(descriptor, url, digest(bytes))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip;
    use crate::error::ErrorKind;

    const ABOUT: &str = "<ModMetaData><ModID>foo</ModID><Version>1.0.0</Version>\
        <Name>Foo</Name><Author>Bar</Author><Branch>stable</Branch></ModMetaData>";

    #[test]
    fn test_extract_mod() {
        let bytes = zip(&[("About/About.xml", ABOUT)]);
        let Inspection::Mod(record) = extract(&bytes, "https://example.com/Mod-1.0.0.zip").unwrap() else {
            panic!("expected a mod");
        };
        assert_eq!(record.id(), "foo");
        assert_eq!(record.version(), "1.0.0");
        assert_eq!(record.url(), "https://example.com/Mod-1.0.0.zip");
        assert_eq!(record.digest(), digest(&bytes));
        assert!(record.branches().contains("stable"));
    }

    #[test]
    fn test_extract_not_a_mod() {
        let bytes = zip(&[("readme.txt", "hello")]);
        assert_eq!(extract(&bytes, "https://example.com/x.zip").unwrap(), Inspection::NotAMod);
    }

    #[test]
    fn test_extract_empty_descriptor_is_not_a_mod() {
        let bytes = zip(&[("About/About.xml", "")]);
        assert_eq!(extract(&bytes, "https://example.com/x.zip").unwrap(), Inspection::NotAMod);
    }

    #[test]
    fn test_extract_invalid_descriptor() {
        let bytes = zip(&[("About/About.xml", "<ModMetaData><ModID>foo</ModID></ModMetaData>")]);
        let err = extract(&bytes, "https://example.com/x.zip").unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("Version"));
    }
}

//! Locating the descriptor inside a mod archive.

use crate::consts::{DESCRIPTOR_PATH, MAX_DESCRIPTOR_SIZE};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Cursor, Read, Seek};
use tracing::instrument;
use zip::ZipArchive;

/// Read-only view over a zip archive that knows where mods keep their
/// descriptor.
///
/// The descriptor normally sits at exactly [`DESCRIPTOR_PATH`], but plenty of
/// authors zip the mod's parent folder instead, so any entry ending in
/// `/About/About.xml` is accepted as a fallback. The canonical path always
/// wins; among fallbacks the shallowest (then alphabetically first) wins so
/// the choice is deterministic.
pub struct ArchiveInspector<R> {
    archive: ZipArchive<R>,
}
impl<'a> ArchiveInspector<Cursor<&'a [u8]>> {
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Self::new(Cursor::new(bytes))
    }
}
impl<R: Read + Seek> ArchiveInspector<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).or_raise(|| ErrorKind::InvalidArchive)?;
        Ok(Self { archive })
    }

    /// Name of the entry that holds the descriptor, if any.
    pub fn descriptor_path(&self) -> Option<String> {
        let suffix = format!("/{DESCRIPTOR_PATH}");
        let mut fallback: Option<&str> = None;
        for name in self.archive.file_names() {
            let normalized = name.replace('\\', "/");
            if normalized == DESCRIPTOR_PATH {
                return Some(name.to_string());
            }
            if normalized.ends_with(&suffix) {
                fallback = match fallback {
                    Some(current) if (current.len(), current) <= (name.len(), name) => Some(current),
                    _ => Some(name),
                };
            }
        }
        fallback.map(str::to_string)
    }

    /// Returns the decoded descriptor text, or `None` if the archive holds no
    /// descriptor. Invalid UTF-8 is replaced rather than rejected; whether the
    /// text is a *valid* descriptor is for the parser to decide.
    ///
    /// A descriptor larger than [`MAX_DESCRIPTOR_SIZE`], whether declared or
    /// actual, is an [`InvalidArchive`](ErrorKind::InvalidArchive).
    #[instrument(level = "debug", skip(self), fields(entries = self.archive.len()))]
    pub fn descriptor(&mut self) -> Result<Option<String>> {
        let Some(path) = self.descriptor_path() else {
            return Ok(None);
        };
        let entry = self.archive.by_name(&path).or_raise(|| ErrorKind::InvalidArchive)?;
        if entry.size() > MAX_DESCRIPTOR_SIZE {
            tracing::debug!(path = %path, declared = entry.size(), "Descriptor is too large");
            exn::bail!(ErrorKind::InvalidArchive);
        }
        let mut bytes = Vec::new();
        entry.take(MAX_DESCRIPTOR_SIZE + 1).read_to_end(&mut bytes).or_raise(|| ErrorKind::InvalidArchive)?;
        if bytes.len() as u64 > MAX_DESCRIPTOR_SIZE {
            exn::bail!(ErrorKind::InvalidArchive);
        }
        let text = String::from_utf8_lossy(&bytes);
        Ok(Some(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()))
    }
}

/// Convenience wrapper: open `bytes` as a zip archive and pull out the
/// descriptor text, if present.
pub fn inspect(bytes: &[u8]) -> Result<Option<String>> {
    ArchiveInspector::from_bytes(bytes)?.descriptor()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Builds an in-memory zip archive. Entries ending in `/` become directories.
    pub(crate) fn zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    /// A stored ZIP64 descriptor entry whose central directory header
    /// declares an uncompressed size of `size` bytes.
    fn declaring_size(size: u64) -> Vec<u8> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored).large_file(true);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(DESCRIPTOR_PATH, options).unwrap();
        writer.write_all(b"<ModMetaData/>").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        let header = bytes.windows(4).position(|window| window == b"PK\x01\x02").unwrap();
        let field = header + 24;
        if bytes[field..field + 4] != [0xff; 4] {
            let size = u32::try_from(size).unwrap_or(u32::MAX - 1);
            bytes[field..field + 4].copy_from_slice(&size.to_le_bytes());
            return bytes;
        }
        let name_len = usize::from(u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]));
        let extra_len = usize::from(u16::from_le_bytes([bytes[header + 30], bytes[header + 31]]));
        let mut offset = header + 46 + name_len;
        let end = offset + extra_len;
        while offset + 4 <= end {
            let id = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
            let len = usize::from(u16::from_le_bytes([bytes[offset + 2], bytes[offset + 3]]));
            if id == 0x0001 {
                // Uncompressed size comes first in the ZIP64 extra field.
                bytes[offset + 4..offset + 12].copy_from_slice(&size.to_le_bytes());
                return bytes;
            }
            offset += 4 + len;
        }
        panic!("central directory header has no ZIP64 extra field");
    }

    #[test]
    fn test_huge_declared_size_is_invalid() {
        let err = inspect(&declaring_size(u64::MAX - 1)).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidArchive);
    }

    #[test]
    fn test_oversized_descriptor_is_invalid() {
        let padding = " ".repeat(usize::try_from(MAX_DESCRIPTOR_SIZE).unwrap());
        let about = format!("<ModMetaData>{padding}</ModMetaData>");
        let bytes = zip(&[("About/About.xml", about.as_str())]);
        let err = inspect(&bytes).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidArchive);
    }

    #[test]
    fn test_canonical_path() {
        let bytes = zip(&[("About/", ""), ("About/About.xml", "<canonical/>"), ("Textures/a.png", "png")]);
        assert_eq!(inspect(&bytes).unwrap().as_deref(), Some("<canonical/>"));
    }

    #[test]
    fn test_canonical_path_preferred_over_nested() {
        let bytes = zip(&[("MyMod/About/About.xml", "<nested/>"), ("About/About.xml", "<canonical/>")]);
        assert_eq!(inspect(&bytes).unwrap().as_deref(), Some("<canonical/>"));
    }

    #[test]
    fn test_nested_path_fallback() {
        let bytes = zip(&[("deeper/MyMod/About/About.xml", "<deep/>"), ("MyMod/About/About.xml", "<shallow/>")]);
        let inspector = ArchiveInspector::from_bytes(&bytes).unwrap();
        assert_eq!(inspector.descriptor_path().as_deref(), Some("MyMod/About/About.xml"));
        assert_eq!(inspect(&bytes).unwrap().as_deref(), Some("<shallow/>"));
    }

    #[test]
    fn test_similar_names_are_not_descriptors() {
        let bytes = zip(&[("NotAbout/About.xml", "<no/>"), ("About/About.xml.bak", "<no/>")]);
        assert_eq!(inspect(&bytes).unwrap(), None);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let bytes = zip(&[("About/About.xml", "\u{feff}<bom/>")]);
        assert_eq!(inspect(&bytes).unwrap().as_deref(), Some("<bom/>"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = inspect(b"definitely not a zip file").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidArchive);
    }
}

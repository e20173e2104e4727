use super::{Descriptor, VersionKey};
use std::collections::BTreeSet;

/// One catalog entry: a [`Descriptor`] plus where its archive came from and
/// the digest of the archive bytes. This is the primary entity in the system.
///
/// The [`VersionKey`] is derived from the descriptor's version when the record
/// is constructed and cannot be set independently, so the two never drift.
/// Records are immutable; a rebuild produces a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    descriptor: Descriptor,
    version_key: VersionKey,
    url: String,
    digest: String,
}
impl AsRef<MetadataRecord> for MetadataRecord {
    fn as_ref(&self) -> &MetadataRecord {
        self
    }
}
impl MetadataRecord {
    pub fn new(descriptor: Descriptor, url: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            version_key: VersionKey::parse(descriptor.version()),
            descriptor,
            url: url.into(),
            digest: digest.into(),
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn version_key(&self) -> &VersionKey {
        &self.version_key
    }

    /// Where the archive was retrieved from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Content digest of the archive bytes, e.g. `sha256:…`.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn id(&self) -> &str {
        self.descriptor.id()
    }

    pub fn version(&self) -> &str {
        self.descriptor.version()
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn author(&self) -> &str {
        self.descriptor.author()
    }

    pub fn tags(&self) -> &[String] {
        self.descriptor.tags()
    }

    pub fn depends_on(&self) -> &[String] {
        self.descriptor.depends_on()
    }

    pub fn branches(&self) -> &BTreeSet<String> {
        self.descriptor.branches()
    }
}

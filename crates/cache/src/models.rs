//! On-disk representation of cache entries.
//!
//! The persisted format predates this crate: a JSON object keyed by digest
//! whose values are either `false` (archive inspected, not a mod) or the
//! record's full field set. Field names and their alphabetical order are
//! part of that format.

use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use modrepo_extract::models::{Descriptor, MetadataRecord};
use serde::{Deserialize, Serialize};

/// Serialized form of a single cache value.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum EntryProxy {
    /// Always `false` when written; `true` is never produced and is rejected on load.
    Marker(bool),
    Record(RecordProxy),
}

// Fields are declared alphabetically so serialization emits sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordProxy {
    author: String,
    #[serde(default)]
    branch: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    digest: String,
    id: String,
    name: String,
    #[serde(default)]
    tag: Vec<String>,
    url: String,
    version: String,
}
impl From<&MetadataRecord> for RecordProxy {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            author: record.author().to_string(),
            branch: record.branches().iter().cloned().collect(),
            depends_on: record.depends_on().to_vec(),
            digest: record.digest().to_string(),
            id: record.id().to_string(),
            name: record.name().to_string(),
            tag: record.tags().to_vec(),
            url: record.url().to_string(),
            version: record.version().to_string(),
        }
    }
}
impl TryFrom<RecordProxy> for MetadataRecord {
    type Error = Error;
    fn try_from(proxy: RecordProxy) -> Result<Self, Self::Error> {
        let descriptor = Descriptor::new(proxy.id, proxy.version, proxy.name, proxy.author)
            .or_raise(|| ErrorKind::InvalidData("record"))?
            .with_tags(proxy.tag)
            .with_dependencies(proxy.depends_on)
            .with_branches(proxy.branch);
        Ok(MetadataRecord::new(descriptor, proxy.url, proxy.digest))
    }
}

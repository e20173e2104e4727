//! The in-memory artifact cache and its persisted JSON form.

use crate::error::{ErrorKind, Result};
use crate::models::{EntryProxy, RecordProxy};
use exn::ResultExt;
use modrepo_extract::models::MetadataRecord;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::instrument;

const INDENT: &[u8] = b"    ";

/// What is known about one archive digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// The archive carries a valid descriptor.
    Mod(MetadataRecord),
    /// The archive was inspected and carries no valid descriptor; never fetch
    /// it again.
    NotAMod,
}

/// Result of [`ArtifactCache::lookup`].
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Hit(&'a MetadataRecord),
    NegativeHit,
    Miss,
}

/// Content-addressed store: archive digest → [`Entry`].
///
/// Keys are the digests *declared* by the release host, which is what makes
/// the cache usable before anything is downloaded. Entries are kept in key
/// order so the persisted form is stable across runs.
///
/// # Lifecycle
///
/// 1. [`load`](Self::load) at the start of a run (missing or corrupt files
///    degrade to an empty cache),
/// 2. [`lookup`](Self::lookup) / [`store`](Self::store) while resolving assets,
/// 3. [`gc`](Self::gc) exactly once, after every asset has been resolved,
/// 4. [`to_json`](Self::to_json) to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCache {
    entries: BTreeMap<String, Entry>,
}
impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.entries.contains_key(digest)
    }

    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn lookup(&self, digest: &str) -> Lookup<'_> {
        match self.entries.get(digest) {
            Some(Entry::Mod(record)) => Lookup::Hit(record),
            Some(Entry::NotAMod) => Lookup::NegativeHit,
            None => Lookup::Miss,
        }
    }

    /// Insert or overwrite the entry for `digest`.
    pub fn store(&mut self, digest: impl Into<String>, entry: Entry) {
        self.entries.insert(digest.into(), entry);
    }

    /// Drop every entry whose digest is not in `live`, returning how many
    /// were removed.
    ///
    /// Must only be called once all of a run's assets have been resolved,
    /// otherwise an artifact that simply hasn't been reached yet is evicted.
    #[instrument(level = "debug", skip_all, fields(live = live.len(), before = self.entries.len()))]
    pub fn gc(&mut self, live: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|digest, _| live.contains(digest));
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, "Collected cache entries for artifacts no longer published");
        }
        removed
    }

    /// Parse the persisted JSON form.
    ///
    /// The document as a whole must be a JSON object. Individual values that
    /// are neither `false` nor a valid record are dropped with a warning,
    /// so one bad entry only costs a re-download.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Value> =
            serde_json::from_str(json).or_raise(|| ErrorKind::InvalidData("cache document"))?;
        let mut entries = BTreeMap::new();
        for (digest, value) in raw {
            match Self::entry_from_value(value) {
                Ok(entry) => {
                    entries.insert(digest, entry);
                },
                Err(err) => tracing::warn!(digest = %digest, error = ?err, "Dropping unreadable cache entry"),
            }
        }
        Ok(Self { entries })
    }

    fn entry_from_value(value: Value) -> Result<Entry> {
        match serde_json::from_value::<EntryProxy>(value).or_raise(|| ErrorKind::InvalidData("cache entry"))? {
            EntryProxy::Marker(false) => Ok(Entry::NotAMod),
            EntryProxy::Marker(true) => exn::bail!(ErrorKind::InvalidData("positive marker without a record")),
            EntryProxy::Record(proxy) => Ok(Entry::Mod(MetadataRecord::try_from(proxy)?)),
        }
    }

    /// Serialize to the persisted JSON form: keys sorted, four-space indent,
    /// non-ASCII escaped as `\uXXXX`, no trailing newline. This is what
    /// Python's `json.dumps(indent=4, sort_keys=True)` writes, so existing
    /// cache files round-trip without a diff.
    pub fn to_json(&self) -> Result<String> {
        let proxies: BTreeMap<&str, EntryProxy> = self
            .entries
            .iter()
            .map(|(digest, entry)| {
                let proxy = match entry {
                    Entry::Mod(record) => EntryProxy::Record(RecordProxy::from(record)),
                    Entry::NotAMod => EntryProxy::Marker(false),
                };
                (digest.as_str(), proxy)
            })
            .collect();
        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        proxies.serialize(&mut serializer).or_raise(|| ErrorKind::InvalidData("serialization"))?;
        let json = String::from_utf8(buffer).or_raise(|| ErrorKind::InvalidData("serialization"))?;
        Ok(escape_non_ascii(&json))
    }

    /// Read a cache file, tolerating its absence.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err).or_raise(|| ErrorKind::Io(path.to_path_buf())),
        }
    }

    /// Like [`read`](Self::read), but an unreadable or corrupt cache is
    /// treated as empty: losing the cache only makes the run slower.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::read(path.as_ref()) {
            Ok(cache) => {
                tracing::info!(entries = cache.len(), "Loaded artifact cache");
                cache
            },
            Err(err) => {
                tracing::warn!(error = ?err, "Artifact cache is unusable; starting with an empty cache");
                Self::new()
            },
        }
    }
}

/// Non-ASCII only ever occurs inside JSON strings, where a `\uXXXX` escape
/// (UTF-16 surrogate pairs above the BMP) is equivalent to the raw character.
fn escape_non_ascii(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            escaped.push_str(&format!("\\u{unit:04x}"));
        }
    }
    escaped
}

//! Version/Record Comparison

use crate::models::{MetadataRecord, Number, Part, Section, VersionKey};
use std::cmp::Ordering;

impl Ord for Number {
    /// Numeric comparison. Digits are stored without leading zeros, so a
    /// longer digit string is always the larger number.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}
impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Part {
    /// `(prefix, number, suffix)`, in that order. Strings are already
    /// case-folded, so this is a plain code-point comparison.
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix
            .cmp(&other.prefix)
            .then_with(|| self.number.cmp(&other.number))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}
impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Section {
    /// Part-by-part; a section that is a strict prefix of the other sorts first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}
impl PartialOrd for Section {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    /// Section-by-section; fewer sections sort first when otherwise equal.
    ///
    /// This has to stay exactly as-is: existing catalogs were produced with
    /// this ordering and consumers pick "latest" based on it.
    fn cmp(&self, other: &Self) -> Ordering {
        self.sections.cmp(&other.sections)
    }
}
impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl MetadataRecord {
    /// Catalog order: `(id, version key, branches)` ascending.
    ///
    /// Branch sets compare as their sorted sequences. Records that tie here
    /// (for example `v1.0` and `1.0` of the same mod) are left to the caller's
    /// stable sort.
    pub fn catalog_cmp(&self, other: &Self) -> Ordering {
        self.id()
            .cmp(other.id())
            .then_with(|| self.version_key().cmp(other.version_key()))
            .then_with(|| self.branches().cmp(other.branches()))
    }
}

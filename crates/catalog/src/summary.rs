use crate::build::Resolution;
use derive_more::Display;

/// Counters describing one catalog build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display(
    "{releases} releases ({releases_skipped} without archives), {assets} assets: \
     {cache_hits} cached, {negative_hits} known non-mods, {fetched} downloaded, {failed} failed; \
     {records} records, {collected} stale cache entries removed"
)]
pub struct Summary {
    /// Releases in the listing.
    pub releases: usize,
    /// Releases without a single archive-shaped asset.
    pub releases_skipped: usize,
    /// Resolvable assets (archive name, download URL and declared digest).
    pub assets: usize,
    /// Assets answered from a positive cache entry.
    pub cache_hits: usize,
    /// Assets answered from a negative cache entry.
    pub negative_hits: usize,
    /// Archives actually downloaded. Assets sharing a digest share a download.
    pub fetched: usize,
    /// Assets that contributed nothing because resolution failed.
    pub failed: usize,
    /// Records in the catalog.
    pub records: usize,
    /// Cache entries removed by garbage collection.
    pub collected: usize,
}
impl Summary {
    pub(crate) fn count(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Cached(_) => self.cache_hits += 1,
            Resolution::KnownNotAMod => self.negative_hits += 1,
            Resolution::Fetched(_) | Resolution::NotAMod => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let summary = Summary {
            releases: 3,
            releases_skipped: 1,
            assets: 4,
            cache_hits: 1,
            negative_hits: 1,
            fetched: 2,
            failed: 1,
            records: 2,
            collected: 5,
        };
        assert_eq!(
            summary.to_string(),
            "3 releases (1 without archives), 4 assets: 1 cached, 1 known non-mods, 2 downloaded, 1 failed; \
             2 records, 5 stale cache entries removed"
        );
    }
}

//! Release listing types shared by every [`ReleaseSource`](crate::ReleaseSource).

/// One published release and its attachments, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Tag identifier, used for logging only.
    pub tag: String,
    pub assets: Vec<Asset>,
}
impl Release {
    pub fn new(tag: impl Into<String>, assets: impl IntoIterator<Item = Asset>) -> Self {
        Self { tag: tag.into(), assets: assets.into_iter().collect() }
    }

    /// Whether any attachment *name* looks like an archive, regardless of
    /// whether it can actually be fetched.
    pub fn has_archive(&self, extension: &str) -> bool {
        self.assets.iter().any(|asset| asset.is_archive(extension))
    }
}

/// A single release attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    /// File name as uploaded.
    pub name: String,
    /// Where the bytes can be downloaded from; may be empty.
    pub url: String,
    /// Content digest declared by the host (`sha256:<hex>`), if any.
    pub digest: Option<String>,
}
impl Asset {
    pub fn new(name: impl Into<String>, url: impl Into<String>, digest: Option<String>) -> Self {
        Self { name: name.into(), url: url.into(), digest }
    }

    /// Case-insensitive extension match on the file name.
    pub fn is_archive(&self, extension: &str) -> bool {
        self.name.to_lowercase().ends_with(&extension.to_lowercase())
    }

    /// The declared digest, treating a blank value as absent.
    pub fn declared_digest(&self) -> Option<&str> {
        self.digest.as_deref().map(str::trim).filter(|digest| !digest.is_empty())
    }

    /// Whether this attachment can be resolved at all: an archive with a
    /// download URL and a declared digest.
    pub fn is_resolvable(&self, extension: &str) -> bool {
        self.is_archive(extension) && !self.url.trim().is_empty() && self.declared_digest().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Mod-1.0.0.zip", true)]
    #[case("Mod-1.0.0.ZIP", true)]
    #[case("Mod-1.0.0.Zip", true)]
    #[case("Mod-1.0.0.tar.gz", false)]
    #[case("zip", false)]
    #[case("", false)]
    fn test_is_archive(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(Asset::new(name, "https://example.com", None).is_archive(".zip"), expected);
    }

    #[rstest]
    #[case("Mod.zip", "https://example.com/Mod.zip", Some("sha256:aa"), true)]
    #[case("Mod.zip", "", Some("sha256:aa"), false)]
    #[case("Mod.zip", "https://example.com/Mod.zip", None, false)]
    #[case("Mod.zip", "https://example.com/Mod.zip", Some("  "), false)]
    #[case("Mod.txt", "https://example.com/Mod.txt", Some("sha256:aa"), false)]
    fn test_is_resolvable(#[case] name: &str, #[case] url: &str, #[case] digest: Option<&str>, #[case] expected: bool) {
        let asset = Asset::new(name, url, digest.map(str::to_string));
        assert_eq!(asset.is_resolvable(".zip"), expected);
    }

    #[test]
    fn test_has_archive_ignores_fetchability() {
        let release = Release::new("v1", [Asset::new("Mod.zip", "", None), Asset::new("notes.md", "u", None)]);
        assert!(release.has_archive(".zip"));
        let release = Release::new("v2", [Asset::new("notes.md", "u", None)]);
        assert!(!release.has_archive(".zip"));
    }
}

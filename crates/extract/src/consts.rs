use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Canonical location of the descriptor inside a mod archive.
pub const DESCRIPTOR_PATH: &str = "About/About.xml";
/// Largest descriptor (uncompressed, in bytes) that will be read out of an
/// archive.
pub const MAX_DESCRIPTOR_SIZE: u64 = 1024 * 1024;
/// Algorithm tag prepended to every content digest.
pub const DIGEST_PREFIX: &str = "sha256:";

// Descriptor element and attribute names.
pub(crate) const MOD_ID: &str = "ModID";
pub(crate) const VERSION: &str = "Version";
pub(crate) const NAME: &str = "Name";
pub(crate) const AUTHOR: &str = "Author";
pub(crate) const TAGS: &str = "Tags";
pub(crate) const TAG: &str = "Tag";
pub(crate) const DEPENDS_ON: &str = "DependsOn";
pub(crate) const WORKSHOP_HANDLE: &str = "WorkshopHandle";
pub(crate) const BRANCH: &str = "Branch";

// Version parts that start with a digit: leading number, then the suffix.
regex!(LEADING_NUMBER_REGEX, r"(?s)^([0-9]+)(.*)$");
// Any other version part: prefix, then an optional trailing number.
regex!(TRAILING_NUMBER_REGEX, r"(?s)^(.*?)([0-9]*)$");

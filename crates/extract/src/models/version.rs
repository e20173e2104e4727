use crate::consts::{LEADING_NUMBER_REGEX, TRAILING_NUMBER_REGEX};
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The parsed, totally-ordered representation of a raw version string.
///
/// Mod authors are wildly inconsistent with their version strings (`v1.2`,
/// `1.2.0-beta3`, `r12`, `2024.01.05-hotfix`), so this is deliberately *not*
/// semver. A version is split on `.` into [sections](Section), each section
/// is split on `-` into [parts](Part), and each part becomes a
/// `(prefix, number, suffix)` triple. Ordering is lexicographic at every
/// level, with shorter sequences sorting before longer ones that they prefix.
///
/// Parsing is total: every string, including the empty string, produces a
/// key. Ordering is implemented in [`compare`](crate::compare).
///
/// ```rust
/// use modrepo_extract::models::VersionKey;
///
/// assert!(VersionKey::parse("1.9.0") < VersionKey::parse("1.10.0"));
/// assert_eq!(VersionKey::parse("v1.2.0"), VersionKey::parse("1.2.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    pub(crate) sections: Vec<Section>,
}

/// A `.`-separated run of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Section {
    pub(crate) parts: Vec<Part>,
}

/// A `-`-separated run of a [`Section`].
///
/// Both `prefix` and `suffix` are stored case-folded, so comparisons are
/// case-insensitive ordinal comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part {
    pub(crate) prefix: String,
    pub(crate) number: Number,
    pub(crate) suffix: String,
}

/// An arbitrarily large non-negative integer, stored as its decimal digits
/// with leading zeros removed (zero is `"0"`).
///
/// Version strings like `20240105123000` or absurdly long build numbers are
/// compared numerically without any risk of overflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(pub(crate) String);

impl VersionKey {
    pub fn parse(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        let raw = raw.strip_prefix(['v', 'V']).unwrap_or(raw);
        Self {
            sections: raw.split('.').map(Section::parse).collect(),
        }
    }

    /// The minimal possible key: what an empty version string parses to.
    pub fn minimum() -> Self {
        Self {
            sections: vec![Section { parts: vec![Part::default()] }],
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}
impl Default for VersionKey {
    fn default() -> Self {
        Self::minimum()
    }
}
impl FromStr for VersionKey {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
impl From<&str> for VersionKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
impl Display for VersionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

impl Section {
    fn parse(section: &str) -> Self {
        Self {
            parts: section.split('-').map(Part::parse).collect(),
        }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}
impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl Part {
    fn parse(part: &str) -> Self {
        if part.is_empty() {
            return Self::default();
        }
        if part.starts_with(|c: char| c.is_ascii_digit()) {
            return match LEADING_NUMBER_REGEX.captures(part) {
                Some(captures) => Self {
                    prefix: String::new(),
                    number: Number::from_digits(captures.get(1).map_or("", |m| m.as_str())),
                    suffix: fold(captures.get(2).map_or("", |m| m.as_str())),
                },
                None => Self::default(),
            };
        }
        match TRAILING_NUMBER_REGEX.captures(part) {
            Some(captures) => Self {
                prefix: fold(captures.get(1).map_or("", |m| m.as_str())),
                number: Number::from_digits(captures.get(2).map_or("", |m| m.as_str())),
                suffix: String::new(),
            },
            None => Self {
                prefix: fold(part),
                ..Self::default()
            },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> &Number {
        &self.number
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}
impl Default for Part {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            number: Number::zero(),
            suffix: String::new(),
        }
    }
}
impl Display for Part {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.prefix, self.number, self.suffix)
    }
}

impl Number {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Normalizes a run of ASCII digits; an empty run is zero.
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() { Self::zero() } else { Self(trimmed.to_string()) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Unicode full case folding, so `ß` and `SS` compare equal.
fn fold(s: &str) -> String {
    caseless::default_case_fold_str(s)
}

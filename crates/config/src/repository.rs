use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;

/// An `owner/repo` slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{owner}/{name}")]
pub struct Repository {
    owner: String,
    name: String,
}
impl Repository {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
impl FromStr for Repository {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();
        match slug.split_once('/') {
            Some((owner, name))
                if !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/') =>
            {
                Ok(Self { owner: owner.trim().to_string(), name: name.trim().to_string() })
            },
            _ => exn::bail!(ErrorKind::InvalidRepository(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("owner/repo", "owner", "repo")]
    #[case("  owner/repo\n", "owner", "repo")]
    #[case("my-org/my.mods", "my-org", "my.mods")]
    fn test_valid(#[case] input: &str, #[case] owner: &str, #[case] name: &str) {
        let repository: Repository = input.parse().unwrap();
        assert_eq!(repository.owner(), owner);
        assert_eq!(repository.name(), name);
        assert_eq!(repository.to_string(), format!("{owner}/{name}"));
    }

    #[rstest]
    #[case("")]
    #[case("owner")]
    #[case("owner/")]
    #[case("/repo")]
    #[case("owner/repo/extra")]
    #[case(" / ")]
    fn test_invalid(#[case] input: &str) {
        let err = input.parse::<Repository>().unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidRepository(input.to_string()));
    }
}

//! Layered configuration for catalog builds.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file: the one given explicitly, otherwise the first of
//!    `modrepo.{toml,yaml,yml,json}` found in the working directory and then
//!    the user's configuration directory,
//! 3. the GitHub Actions environment: `GITHUB_REPOSITORY`, and `GITHUB_TOKEN`
//!    or `GH_TOKEN` (the latter wins),
//! 4. `MODREPO_*` environment variables (e.g. `MODREPO_CONCURRENCY=8`),
//! 5. command-line [`Overrides`].
//!
//! The merged [`Config`] is then validated into [`Settings`].

pub mod error;
mod repository;

pub use crate::repository::Repository;
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use modrepo_catalog::{DEFAULT_CONCURRENCY, DEFAULT_EXTENSION};
use modrepo_source::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILE_STEM: &str = "modrepo";
const FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];
const ENV_PREFIX: &str = "MODREPO_";
/// Per-request timeout, in seconds.
const DEFAULT_TIMEOUT: u64 = 10;

/// Raw, unvalidated configuration as merged from every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `owner/repo` whose releases are cataloged.
    pub repository: Option<String>,
    /// API token for the release listing.
    pub token: Option<String>,
    pub api_base: String,
    /// Artifact cache file.
    pub cache: PathBuf,
    /// Catalog document.
    pub output: PathBuf,
    /// Maximum concurrent downloads.
    pub concurrency: usize,
    /// Per-request timeout, in seconds.
    pub timeout: u64,
    /// Archive file extension.
    pub extension: String,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            repository: None,
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            cache: PathBuf::from("modrepo_cache.json"),
            output: PathBuf::from("modrepo.xml"),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Command-line values; `None` leaves the lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Validated configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub repository: Repository,
    pub token: Option<String>,
    pub api_base: String,
    pub cache: PathBuf,
    pub output: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub extension: String,
}
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("repository", &self.repository)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("cache", &self.cache)
            .field("output", &self.output)
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("extension", &self.extension)
            .finish()
    }
}
impl TryFrom<Config> for Settings {
    type Error = error::Error;
    fn try_from(config: Config) -> Result<Self> {
        let repository = config
            .repository
            .as_deref()
            .map(str::trim)
            .filter(|repository| !repository.is_empty())
            .ok_or_raise(|| ErrorKind::MissingRepository)?
            .parse::<Repository>()?;
        if config.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("concurrency"));
        }
        if config.timeout == 0 {
            exn::bail!(ErrorKind::Invalid("timeout"));
        }
        if config.extension.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("extension"));
        }
        Ok(Self {
            repository,
            token: config.token.map(|token| token.trim().to_string()).filter(|token| !token.is_empty()),
            api_base: config.api_base,
            cache: config.cache,
            output: config.output,
            concurrency: config.concurrency,
            timeout: Duration::from_secs(config.timeout),
            extension: config.extension,
        })
    }
}

impl Config {
    /// Load from every source and validate.
    ///
    /// `file` must exist when given; otherwise a configuration file is looked
    /// up in the working directory, then the user configuration directory.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
        let config = Self::figment(file, &search_dirs(), overrides)?.extract::<Config>().or_raise(|| ErrorKind::Load)?;
        Settings::try_from(config)
    }

    fn figment(file: Option<&Path>, search: &[PathBuf], overrides: &Overrides) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match file {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            None => discover(search),
        };
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Using configuration file");
            figment = merge_file(figment, &path)?;
        }
        Ok(figment
            .merge(Env::raw().only(&["GITHUB_REPOSITORY"]).map(|_| "repository".into()))
            .merge(Env::raw().only(&["GITHUB_TOKEN"]).map(|_| "token".into()))
            .merge(Env::raw().only(&["GH_TOKEN"]).map(|_| "token".into()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides)))
    }
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(project) = ProjectDirs::from("", "", FILE_STEM) {
        dirs.push(project.config_dir().to_path_buf());
    }
    dirs
}

fn discover(search: &[PathBuf]) -> Option<PathBuf> {
    search
        .iter()
        .flat_map(|dir| FILE_EXTENSIONS.iter().map(move |extension| dir.join(format!("{FILE_STEM}.{extension}"))))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|extension| extension.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::Invalid("configuration file extension")),
    })
}

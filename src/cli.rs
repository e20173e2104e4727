use clap::{Args, Parser, Subcommand};
use modrepo_config::Overrides;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "modrepo", version, about = "Builds a mod catalog from published release archives")]
pub struct Cli {
    /// More logging (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Less logging (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
    #[command(subcommand)]
    pub command: Command,
}
impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            ..=-3 => LevelFilter::OFF,
            -2 => LevelFilter::ERROR,
            -1 => LevelFilter::WARN,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the catalog and update the artifact cache.
    Build(BuildArgs),
    /// Compare two version strings the way the catalog orders them.
    Compare {
        a: String,
        b: String,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Configuration file (otherwise `modrepo.{toml,yaml,yml,json}` is
    /// looked up).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Repository to catalog, as `owner/repo`.
    #[arg(short, long)]
    pub repository: Option<String>,
    /// Artifact cache file.
    #[arg(long)]
    pub cache: Option<PathBuf>,
    /// Catalog output file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Maximum concurrent downloads.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Build everything but write nothing.
    #[arg(long)]
    pub dry_run: bool,
}
impl BuildArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repository: self.repository.clone(),
            cache: self.cache.clone(),
            output: self.output.clone(),
            concurrency: self.concurrency,
            timeout: self.timeout,
        }
    }
}

use crate::cli::BuildArgs;
use crate::error::{ErrorKind, Result};
use crate::persist::write_atomic;
use exn::ResultExt;
use futures::StreamExt;
use modrepo_cache::ArtifactCache;
use modrepo_catalog::{BuildEvent, BuildOptions, BuildOutput, build_stream};
use modrepo_config::{Config, Settings};
use modrepo_source::{FetcherHandle, GitHubSource, HttpFetcher, SourceHandle};
use std::pin::pin;
use std::sync::Arc;
use tracing::instrument;

pub async fn run(args: &BuildArgs) -> Result<()> {
    let settings = Config::load(args.config.as_deref(), &args.overrides()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?settings, "Loaded configuration");
    execute(&settings, args.dry_run).await
}

/// Build the catalog described by `settings`, then write the catalog and the
/// updated cache (catalog first) unless this is a dry run.
#[instrument(skip_all, fields(repository = %settings.repository))]
pub async fn execute(settings: &Settings, dry_run: bool) -> Result<()> {
    let mut github = GitHubSource::new(settings.repository.to_string(), settings.timeout)
        .or_raise(|| ErrorKind::Setup)?
        .with_api_base(&settings.api_base);
    if let Some(token) = &settings.token {
        github = github.with_token(token);
    }
    let source: SourceHandle = Arc::new(github);
    let fetcher: FetcherHandle = Arc::new(HttpFetcher::new(settings.timeout).or_raise(|| ErrorKind::Setup)?);

    let mut cache = ArtifactCache::load(&settings.cache);
    let options = BuildOptions { extension: settings.extension.clone(), concurrency: settings.concurrency };
    let output = drive(&source, &fetcher, &mut cache, &options).await?;

    let catalog = output.catalog().or_raise(|| ErrorKind::Build)?;
    let cache_json = cache.to_json().or_raise(|| ErrorKind::Persist(settings.cache.clone()))?;
    if dry_run {
        tracing::info!("Dry run; nothing written");
    } else {
        write_atomic(&settings.output, catalog.as_bytes())?;
        write_atomic(&settings.cache, cache_json.as_bytes())?;
        tracing::info!(
            catalog = %settings.output.display(),
            cache = %settings.cache.display(),
            records = output.records.len(),
            "Catalog written"
        );
    }
    println!("{}", output.summary);
    Ok(())
}

/// Runs the build, logging progress as it goes.
async fn drive(
    source: &SourceHandle,
    fetcher: &FetcherHandle,
    cache: &mut ArtifactCache,
    options: &BuildOptions,
) -> Result<BuildOutput> {
    let mut events = pin!(build_stream(source, fetcher, cache, options));
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Build)? {
            BuildEvent::Started => tracing::debug!(source = source.name(), "Listing releases"),
            BuildEvent::Discovered { releases } => tracing::info!(releases, "Found releases"),
            BuildEvent::ReleaseSkipped { release } => tracing::debug!(%release, "No archives; skipping"),
            BuildEvent::ReleaseStarted { release } => tracing::debug!(%release, "Resolving release"),
            BuildEvent::AssetResolved { release, asset, resolution } => {
                tracing::debug!(%release, %asset, ?resolution, "Resolved asset");
            },
            // Already logged with its error tree by the builder.
            BuildEvent::AssetFailed { .. } => {},
            BuildEvent::Complete(output) => return Ok(*output),
        }
    }
    exn::bail!(ErrorKind::Build)
}

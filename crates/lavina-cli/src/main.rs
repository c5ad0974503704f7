//! Lavina - avalanche danger bulletin ingestion
//!
//! The `lavina` command fetches the daily avalanche bulletin of each
//! configured regional authority, extracts per-zone danger levels, and
//! records them with at-most-once semantics.
//!
//! ## Commands
//!
//! - `ingest`: Run the pipeline for one or all providers
//! - `providers`: List the configured providers
//! - `zones`: List the canonical zone catalog
//!
//! A run that stores nothing new (every reading already recorded) still
//! exits 0; only fatal failures (unreachable source, unresolvable
//! publication date, malformed document) exit non-zero.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lavina_core::{
    HttpSourceFetcher, IngestPipeline, IngestReport, ProviderCatalog, RawDocument, SourceFetcher,
    StaticSourceFetcher, ZoneRegistry,
};
use lavina_store::memory::MemoryBulletinStore;
use lavina_store::ProviderId;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "lavina")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Avalanche danger bulletin ingestion", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Load the zone and provider catalog from a JSON file instead of the
    /// built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingestion pipeline
    Ingest {
        /// Provider to ingest (repeatable; default: all configured)
        #[arg(short, long)]
        provider: Vec<String>,

        /// Date to request from the source (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Pin the bulletin date instead of resolving it from the document
        #[arg(long)]
        bulletin_date: Option<String>,

        /// Ingest an already-downloaded document instead of fetching
        /// (requires exactly one --provider)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List the configured providers
    Providers,

    /// List the canonical zone catalog
    Zones,
}

/// Configure the global tracing subscriber for this binary.
///
/// `RUST_LOG` overrides everything. Otherwise pipeline crates log at INFO
/// with the HTTP client internals quieted, or everything at DEBUG under
/// `--verbose`. Safe to call more than once; only the first call takes
/// effect.
fn init_tracing(json: bool, verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        "info,reqwest=warn,hyper=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.json, cli.verbose);

    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Ingest {
            provider,
            date,
            bulletin_date,
            input,
        } => {
            cmd_ingest(
                &catalog,
                &provider,
                date.as_deref(),
                bulletin_date.as_deref(),
                input.as_deref(),
            )
            .await
        }
        Commands::Providers => cmd_providers(&catalog),
        Commands::Zones => cmd_zones(&catalog),
    }
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<ProviderCatalog> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
            ProviderCatalog::from_json(&json)
                .with_context(|| format!("Invalid catalog file: {:?}", path))
        }
        None => Ok(ProviderCatalog::builtin()),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    value
        .parse()
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

/// Run the pipeline for one or all providers
async fn cmd_ingest(
    catalog: &ProviderCatalog,
    providers: &[String],
    date: Option<&str>,
    bulletin_date: Option<&str>,
    input: Option<&std::path::Path>,
) -> Result<()> {
    let requested_date = match date {
        Some(value) => parse_date(value)?,
        None => chrono::Utc::now().date_naive(),
    };
    let date_override = bulletin_date.map(parse_date).transpose()?;

    let selection = select_providers(catalog, providers)?;

    let fetcher: Arc<dyn SourceFetcher> = match input {
        Some(path) => {
            let [config] = selection.as_slice() else {
                bail!("--input requires exactly one --provider");
            };
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read input file: {:?}", path))?;
            let config = catalog.provider(config).expect("selected provider exists");
            Arc::new(
                StaticSourceFetcher::new()
                    .with_document(config.id.clone(), RawDocument::new(bytes, config.format)),
            )
        }
        None => Arc::new(HttpSourceFetcher::new()),
    };

    let store = Arc::new(MemoryBulletinStore::new());
    let registry = ZoneRegistry::load(catalog.zones.clone())?;
    let pipeline = IngestPipeline::new(fetcher, store.clone(), registry);

    let mut failed = Vec::new();
    for id in &selection {
        let config = catalog.provider(id).expect("selected provider exists");
        match pipeline.run(config, requested_date, date_override).await {
            Ok(report) => print_report(&report),
            Err(err) => {
                error!(provider = %id, error = %err, "provider run failed");
                failed.push(id.clone());
            }
        }
    }

    println!();
    println!("Readings stored this run: {}", store.history_len());

    if !failed.is_empty() {
        bail!(
            "{} of {} provider runs failed: {}",
            failed.len(),
            selection.len(),
            failed
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

/// Resolve `--provider` arguments against the catalog; empty means all.
fn select_providers(catalog: &ProviderCatalog, requested: &[String]) -> Result<Vec<ProviderId>> {
    if requested.is_empty() {
        return Ok(catalog.providers.iter().map(|p| p.id.clone()).collect());
    }
    let mut selection = Vec::new();
    for name in requested {
        let id = ProviderId::new(name);
        if catalog.provider(&id).is_none() {
            bail!(
                "Unknown provider '{}'. Run 'lavina providers' to list them.",
                name
            );
        }
        selection.push(id);
    }
    Ok(selection)
}

fn print_report(report: &IngestReport) {
    println!(
        "[{}] {} written, {} already recorded ({} ms)",
        report.provider, report.written, report.already_existing, report.duration_ms
    );
    if report.unresolved_zones > 0 {
        println!("  unresolved zones: {}", report.unresolved_zones);
    }
    if report.unresolved_levels > 0 {
        println!("  unresolved levels: {}", report.unresolved_levels);
    }
}

/// List the configured providers
fn cmd_providers(catalog: &ProviderCatalog) -> Result<()> {
    for config in &catalog.providers {
        println!(
            "{:<16} {:?}  {}",
            config.id.as_str(),
            config.format,
            config.display_name
        );
    }
    Ok(())
}

/// List the canonical zone catalog
fn cmd_zones(catalog: &ProviderCatalog) -> Result<()> {
    for zone in &catalog.zones {
        if zone.aliases.is_empty() {
            println!("{:<28} {}", zone.canonical_id.as_str(), zone.canonical_name);
        } else {
            let aliases: Vec<&str> = zone.aliases.iter().map(String::as_str).collect();
            println!(
                "{:<28} {} (aka {})",
                zone.canonical_id.as_str(),
                zone.canonical_name,
                aliases.join(", ")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso() {
        assert_eq!(
            parse_date("2024-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert!(parse_date("10/01/2024").is_err());
    }

    #[test]
    fn empty_selection_means_all_providers() {
        let catalog = ProviderCatalog::builtin();
        let selection = select_providers(&catalog, &[]).unwrap();
        assert_eq!(selection.len(), catalog.providers.len());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let catalog = ProviderCatalog::builtin();
        let err = select_providers(&catalog, &["atlantis".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn builtin_catalog_loads_without_file() {
        let catalog = load_catalog(None).unwrap();
        assert!(!catalog.providers.is_empty());
        assert!(!catalog.zones.is_empty());
    }

    #[test]
    fn tracing_init_is_safe_to_repeat() {
        init_tracing(false, false);
        init_tracing(true, true);
    }
}

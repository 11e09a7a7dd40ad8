//! College-Scout main entry point
//!
//! This is the command-line interface for the College-Scout directory
//! harvester.

use clap::{Parser, Subcommand};
use college_scout::cache::PageCache;
use college_scout::catalog::CatalogBuilder;
use college_scout::config::{load_config_with_hash, Config};
use college_scout::crawler::Coordinator;
use college_scout::output::{load_statistics, print_results, print_statistics};
use college_scout::query::{search, SEARCH_KEYWORD};
use college_scout::storage::{open_storage, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// College-Scout: a university facts harvester
///
/// College-Scout crawls a paginated college directory into a local page
/// cache, builds a searchable catalog of institutions from the cached
/// pages, and answers filtered searches over it.
#[derive(Parser, Debug)]
#[command(name = "college-scout")]
#[command(version = "1.0.0")]
#[command(about = "A university facts harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the directory listing and cache every institution page
    Crawl {
        /// Listing pages to visit (overrides the configured count)
        #[arg(long)]
        pages: Option<u32>,
    },

    /// Build the catalog from cached pages into an empty database
    Build,

    /// Delete the catalog and build it again from cached pages
    Rebuild,

    /// Search the catalog, e.g. `search state=NY major=computer_science gpa`
    Search {
        /// Search tokens: state=, major=, tuition=, limit=, gpa, acceptance
        #[arg(value_name = "TOKENS", required = true, num_args = 1..)]
        tokens: Vec<String>,
    },

    /// Show catalog and cache statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path))?);

    let result = match cli.command {
        Command::Crawl { pages } => handle_crawl(&config, Arc::clone(&cache), pages).await,
        Command::Build => handle_build(&config, Arc::clone(&cache), false).await,
        Command::Rebuild => handle_build(&config, Arc::clone(&cache), true).await,
        Command::Search { tokens } => handle_search(&config, &tokens),
        Command::Stats => handle_stats(&config, &cache),
    };

    // flush even when the command failed so fetched pages survive
    if let Err(e) = cache.flush() {
        tracing::error!("Failed to flush cache: {}", e);
    }

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("college_scout=info,warn"),
            1 => EnvFilter::new("college_scout=debug,info"),
            2 => EnvFilter::new("college_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `crawl`: walks the listing pages into the cache
async fn handle_crawl(
    config: &Config,
    cache: Arc<PageCache>,
    pages: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut coordinator = Coordinator::from_config(config, cache)?;
    if let Some(pages) = pages {
        coordinator = coordinator.with_max_pages(pages);
    }

    let report = coordinator.run().await?;
    println!(
        "Crawled {} listing pages: {} institutions ({} new, {} skipped), {} network requests",
        report.listing_pages,
        report.institutions_seen,
        report.new_institutions,
        report.skipped,
        coordinator.fetcher().network_requests()
    );

    Ok(())
}

/// Handles `build` and `rebuild`
///
/// Crawls first when the frontier is empty.
async fn handle_build(
    config: &Config,
    cache: Arc<PageCache>,
    rebuild: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    if !rebuild && storage.count_institutions()? > 0 {
        return Err(format!(
            "catalog {} is already populated; use `rebuild` to replace it",
            config.output.database_path
        )
        .into());
    }

    if cache.frontier_len()? == 0 {
        tracing::info!("Link frontier is empty, crawling before build");
        handle_crawl(config, Arc::clone(&cache), None).await?;
    }

    let builder = CatalogBuilder::from_config(config, cache)?;
    let report = if rebuild {
        builder.rebuild(&mut storage).await?
    } else {
        builder.build(&mut storage).await?
    };

    println!(
        "Catalog {}: {} institutions inserted, {} duplicates, {} skipped, {} geocoded",
        if rebuild { "rebuilt" } else { "built" },
        report.inserted,
        report.duplicates,
        report.skipped,
        report.geocoded
    );

    Ok(())
}

/// Handles `search`: runs one command against the catalog
fn handle_search(config: &Config, tokens: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    let command = if tokens
        .first()
        .is_some_and(|first| first.eq_ignore_ascii_case(SEARCH_KEYWORD))
    {
        tokens.join(" ")
    } else {
        format!("{} {}", SEARCH_KEYWORD, tokens.join(" "))
    };

    let outcome = search(&storage, &command)?;
    print_results(&outcome);

    Ok(())
}

/// Handles `stats`: shows catalog and cache statistics
fn handle_stats(config: &Config, cache: &PageCache) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}", config.output.database_path);
    println!("Cache: {}\n", config.output.cache_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage, cache)?;
    print_statistics(&stats);

    Ok(())
}

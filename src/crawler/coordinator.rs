//! Crawler coordinator - listing page walk
//!
//! This module contains the crawl loop that walks the paginated directory:
//! - Fetching each listing page through the cache
//! - Extracting institution links and recording them in the frontier
//! - Fanning out the institution page fetches to the scheduler
//! - Following the pagination link until the page budget is spent

use crate::cache::PageCache;
use crate::config::Config;
use crate::crawler::parser::parse_listing;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::Fetcher;
use crate::url::listing_url;
use crate::ScoutError;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// States of the listing page walk
#[derive(Debug)]
enum CrawlState {
    /// Fetch the listing page at this URL
    FetchListing(Url),
    /// Extract institution links from a fetched listing page
    ExtractLinks { url: Url, html: String },
    /// Move on to the next listing page, if any
    FollowNext(Option<Url>),
    Done,
}

/// Summary of a finished crawl pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Listing pages visited
    pub listing_pages: u32,
    /// Distinct institution links seen in this pass
    pub institutions_seen: usize,
    /// Institutions added to the frontier for the first time
    pub new_institutions: usize,
    /// Institutions whose pages answered with an HTTP error status
    pub skipped: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<Fetcher>,
    scheduler: Scheduler,
    base_url: Url,
    start_url: Url,
    max_pages: u32,
}

impl Coordinator {
    /// Creates a coordinator starting at `start_url`
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared cache-first fetcher
    /// * `base_url` - Site root that relative links resolve against
    /// * `start_url` - First listing page
    /// * `max_pages` - Listing pages to visit before stopping
    /// * `max_concurrent` - Fetch workers per listing page
    pub fn new(
        fetcher: Arc<Fetcher>,
        base_url: Url,
        start_url: Url,
        max_pages: u32,
        max_concurrent: usize,
    ) -> Self {
        let scheduler = Scheduler::new(Arc::clone(&fetcher), max_concurrent);
        Self {
            fetcher,
            scheduler,
            base_url,
            start_url,
            max_pages,
        }
    }

    /// Builds a coordinator from configuration
    pub fn from_config(config: &Config, cache: Arc<PageCache>) -> Result<Self, ScoutError> {
        let fetcher = Arc::new(Fetcher::from_config(
            &config.crawler,
            &config.user_agent,
            cache,
        )?);
        let base_url = Url::parse(&config.crawler.base_url)?;
        let start_url = listing_url(&base_url, &config.crawler.listing_path)?;

        Ok(Self::new(
            fetcher,
            base_url,
            start_url,
            config.crawler.pages,
            config.crawler.max_concurrent_fetches as usize,
        ))
    }

    /// Overrides the listing page budget
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The fetcher shared with the scheduler
    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Runs the listing walk to completion
    ///
    /// An institution answering with an HTTP error status is skipped. A
    /// failed listing page or a transport failure aborts the walk; pages
    /// fetched before the failure stay cached, so a rerun resumes without
    /// refetching them.
    pub async fn run(&self) -> Result<CrawlReport, ScoutError> {
        tracing::info!(
            "Starting crawl at {} ({} listing pages)",
            self.start_url,
            self.max_pages
        );

        let cache = self.fetcher.cache();
        let mut report = CrawlReport::default();
        let mut collected: HashSet<String> = HashSet::new();
        let mut state = if self.max_pages == 0 {
            CrawlState::Done
        } else {
            CrawlState::FetchListing(self.start_url.clone())
        };

        loop {
            state = match state {
                CrawlState::FetchListing(url) => {
                    tracing::debug!("Fetching listing page {}", url);
                    let html = self.fetcher.fetch(url.as_str()).await?;
                    report.listing_pages += 1;
                    CrawlState::ExtractLinks { url, html }
                }

                CrawlState::ExtractLinks { url, html } => {
                    let listing = parse_listing(&html, &self.base_url);

                    let mut batch = Vec::new();
                    for link in listing.institution_links {
                        if !collected.insert(link.clone()) {
                            continue;
                        }
                        if cache.add_to_frontier(&link)? {
                            report.new_institutions += 1;
                        }
                        batch.push(link);
                    }

                    let outcome = self.scheduler.fetch_institutions(&batch).await?;
                    report.institutions_seen += outcome.fetched + outcome.skipped;
                    report.skipped += outcome.skipped;
                    tracing::info!(
                        "Listing page {} ({}): {} institutions cached, {} skipped",
                        report.listing_pages,
                        url,
                        outcome.fetched,
                        outcome.skipped
                    );

                    CrawlState::FollowNext(listing.next_page)
                }

                CrawlState::FollowNext(next) => match next {
                    Some(next) if report.listing_pages < self.max_pages => {
                        CrawlState::FetchListing(next)
                    }
                    Some(_) => {
                        tracing::debug!("Listing page budget of {} reached", self.max_pages);
                        CrawlState::Done
                    }
                    None => {
                        tracing::debug!("No pagination link, crawl complete");
                        CrawlState::Done
                    }
                },

                CrawlState::Done => break,
            };
        }

        tracing::info!(
            "Crawl completed: {} listing pages, {} institutions ({} new, {} skipped)",
            report.listing_pages,
            report.institutions_seen,
            report.new_institutions,
            report.skipped
        );

        Ok(report)
    }
}

/// Runs a crawl using the configured listing page budget
///
/// # Example
///
/// ```no_run
/// use college_scout::cache::PageCache;
/// use college_scout::config::load_config;
/// use college_scout::crawler::run_crawl;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scout.toml"))?;
/// let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path))?);
/// run_crawl(&config, cache).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, cache: Arc<PageCache>) -> Result<CrawlReport, ScoutError> {
    Coordinator::from_config(config, cache)?.run().await
}

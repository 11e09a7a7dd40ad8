//! Crawler module for directory page acquisition
//!
//! This module contains the acquisition pipeline, including:
//! - Cache-first HTTP fetching
//! - Listing page parsing and institution link extraction
//! - Bounded concurrent fetching of institution pages
//! - The listing page walk

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{parse_listing, ListingPage};
pub use scheduler::{BatchOutcome, Scheduler};

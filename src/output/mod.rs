//! Console output for search results and catalog statistics
//!
//! This module handles:
//! - Formatting search results with the columns a command asked for
//! - Gathering and printing catalog and cache statistics

mod results;
pub mod stats;

pub use results::{format_results, print_results};
pub use stats::{load_statistics, print_statistics, CatalogStatistics};

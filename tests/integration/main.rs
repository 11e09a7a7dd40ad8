//! Integration tests for College-Scout

mod crawl_tests;
mod search_tests;

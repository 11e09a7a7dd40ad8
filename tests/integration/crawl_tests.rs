//! Integration tests for the crawler and catalog build
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl and build cycle end-to-end.

use college_scout::cache::{CacheTable, PageCache};
use college_scout::catalog::CatalogBuilder;
use college_scout::config::{load_config, Config};
use college_scout::crawler::{run_crawl, Coordinator};
use college_scout::storage::{open_storage, Storage};
use college_scout::url::{section_url, Section};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INSTITUTION_PATH: &str = "/college/harvard-college-1002470";

/// One page carrying every profile section
const PROFILE_PAGE: &str = r#"
<html><body>
  <h1><span itemprop="name">Harvard College</span></h1>
  <div class="number-callout">A+</div>
  <div class="number-callout">5%</div>
  <div class="row">
    <h4>Overview</h4>
    <div class="col-sm-4">
      <div class="bold">Average HS GPA</div>
      <div class="number-callout">4.18</div>
    </div>
  </div>
  <ul class="list-unstyled">
    <li><h6> Economics </h6></li>
    <li><h6> Computer Science </h6></li>
  </ul>
  <div class="row">
    <h4>Expenses per Academic Year</h4>
    <div class="number-callout">$46,340</div>
  </div>
  <div class="row">
    <span itemprop="streetAddress">86 Brattle Street</span>
    <span itemprop="addressLocality">Cambridge</span>
    <span itemprop="addressRegion">MA</span>
    <span itemprop="postalCode">02138</span>
  </div>
</body></html>
"#;

/// Writes a configuration file pointing at the mock server
fn write_config(dir: &TempDir, base_url: &str) -> Config {
    let config_path = dir.path().join("scout.toml");
    let toml = format!(
        r#"
[crawler]
base-url = "{}"
pages = 3
max-concurrent-fetches = 2
request-timeout-secs = 5

[user-agent]
crawler-name = "ScoutTest"
crawler-version = "1.0.0"
contact-url = "https://example.com/about"

[output]
database-path = "{}"
cache-path = "{}"
"#,
        base_url,
        dir.path().join("catalog.db").display(),
        dir.path().join("cache.db").display()
    );
    std::fs::write(&config_path, toml).unwrap();
    load_config(&config_path).unwrap()
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/college-search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
                 <a href="/about">About</a>
                 <a href="{}">Harvard College</a>
                 <a href="/college/unlisted">No id</a>
               </body></html>"#,
            INSTITUTION_PATH
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(INSTITUTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_PAGE))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_fills_frontier_and_section_cache() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());
    let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path)).unwrap());

    let report = run_crawl(&config, Arc::clone(&cache)).await.unwrap();
    assert_eq!(report.listing_pages, 1);
    assert_eq!(report.new_institutions, 1);

    let institution = format!("{}{}", server.uri(), INSTITUTION_PATH);
    assert!(cache.frontier_contains(&institution).unwrap());
    assert_eq!(cache.frontier_len().unwrap(), 1);

    assert!(cache.contains(CacheTable::Pages, &institution).unwrap());
    for section in Section::ALL {
        assert!(
            cache
                .contains(CacheTable::Pages, &section_url(&institution, section))
                .unwrap(),
            "{} should be cached",
            section
        );
    }
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());

    {
        let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path)).unwrap());
        run_crawl(&config, Arc::clone(&cache)).await.unwrap();
        cache.flush().unwrap();
    }

    let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path)).unwrap());
    let coordinator = Coordinator::from_config(&config, cache).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.new_institutions, 0);
    assert_eq!(coordinator.fetcher().network_requests(), 0);
}

#[tokio::test]
async fn test_crawl_then_build_catalog() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());
    let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path)).unwrap());
    run_crawl(&config, Arc::clone(&cache)).await.unwrap();

    let builder = CatalogBuilder::from_config(&config, cache).unwrap();
    let mut storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let report = builder.build(&mut storage).await.unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(builder.fetcher().network_requests(), 0);

    let institution = storage.get_institution("Harvard College").unwrap().unwrap();
    assert_eq!(institution.acceptance_rate, 5.0);
    assert_eq!(institution.tuition, 46340.0);
    assert_eq!(institution.average_gpa, "4.18");
    assert_eq!(
        storage.get_majors("Harvard College").unwrap(),
        vec!["Economics".to_string(), "Computer Science".to_string()]
    );
    let location = storage.get_location("Harvard College").unwrap().unwrap();
    assert_eq!(location.city.as_deref(), Some("Cambridge"));
    assert_eq!(location.zip_code.as_deref(), Some("02138"));
}

#[tokio::test]
async fn test_listing_failure_aborts_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());
    let cache = Arc::new(PageCache::open(Path::new(&config.output.cache_path)).unwrap());

    let result = run_crawl(&config, Arc::clone(&cache)).await;
    assert!(matches!(
        result,
        Err(college_scout::ScoutError::Http { status: 500, .. })
    ));
    assert_eq!(cache.len(CacheTable::Pages).unwrap(), 0);
}

//! Listing page parser
//!
//! This module handles parsing a directory listing page to extract:
//! - Institution profile links (site-relative, numeric id suffix)
//! - The pagination link to the next listing page

use crate::url::{institution_url, is_institution_href, resolve_next_listing};
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from a listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Canonical institution base URLs, deduplicated, in page order
    pub institution_links: Vec<String>,

    /// The next listing page, if the pagination block has one
    pub next_page: Option<Url>,
}

/// Parses a listing page
///
/// # Link Extraction Rules
///
/// **Include:** every `<a href>` whose href starts with `/` and carries a
/// digit six characters from the end.
///
/// **Next page:** the last anchor inside the first `ul.pagination` element.
///
/// # Example
///
/// ```
/// use college_scout::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<a href="/college/harvard-college-1022984">Harvard</a>
///               <ul class="pagination"><li><a href="/college-search?page=2">Next</a></li></ul>"#;
/// let base = Url::parse("https://www.princetonreview.com").unwrap();
/// let page = parse_listing(html, &base);
/// assert_eq!(page.institution_links.len(), 1);
/// assert!(page.next_page.is_some());
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    ListingPage {
        institution_links: extract_institution_links(&document, base_url),
        next_page: extract_next_page(&document, base_url),
    }
}

/// Collects institution links from every anchor on the page
fn extract_institution_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if !is_institution_href(href) {
            continue;
        }

        match institution_url(base_url, href) {
            Ok(url) => {
                if !links.contains(&url) {
                    links.push(url);
                }
            }
            Err(e) => tracing::debug!("Skipping unresolvable link {}: {}", href, e),
        }
    }

    links
}

/// Finds the last anchor of the pagination block
fn extract_next_page(document: &Html, base_url: &Url) -> Option<Url> {
    let pagination_selector = Selector::parse("ul.pagination").ok()?;
    let a_selector = Selector::parse("a").ok()?;

    let pagination = document.select(&pagination_selector).next()?;
    let last_anchor = pagination.select(&a_selector).last()?;
    let href = last_anchor.value().attr("href")?;

    resolve_next_listing(base_url, href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.princetonreview.com").unwrap()
    }

    #[test]
    fn test_extract_institution_links() {
        let html = r#"
            <html><body>
                <div class="col-md-3"><a href="/college/harvard-college-1022984">Harvard</a></div>
                <div class="col-md-3"><a href="/college/michigan-state-university-1022671">MSU</a></div>
                <a href="/college-search">Search</a>
                <a href="https://other.com/college/x-1022984">External</a>
            </body></html>
        "#;
        let page = parse_listing(html, &base_url());
        assert_eq!(
            page.institution_links,
            vec![
                "https://www.princetonreview.com/college/harvard-college-1022984".to_string(),
                "https://www.princetonreview.com/college/michigan-state-university-1022671"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_duplicate_links_collected_once() {
        let html = r#"
            <a href="/college/harvard-college-1022984">Harvard</a>
            <a href="/college/harvard-college-1022984"><img src="logo.png"></a>
        "#;
        let page = parse_listing(html, &base_url());
        assert_eq!(page.institution_links.len(), 1);
    }

    #[test]
    fn test_anchor_without_href_is_skipped() {
        let html = r#"<a name="top">Top</a><a href="/college/yale-university-1023743">Yale</a>"#;
        let page = parse_listing(html, &base_url());
        assert_eq!(page.institution_links.len(), 1);
    }

    #[test]
    fn test_next_page_is_last_pagination_anchor() {
        let html = r#"
            <ul class="pagination">
                <li><a href="/college-search?page=1">1</a></li>
                <li><a href="/college-search?page=2">2</a></li>
                <li><a href="/college-search?page=2">Next</a></li>
            </ul>
        "#;
        let page = parse_listing(html, &base_url());
        assert_eq!(
            page.next_page.unwrap().as_str(),
            "https://www.princetonreview.com/college-search?page=2"
        );
    }

    #[test]
    fn test_no_pagination_means_no_next_page() {
        let html = r#"<html><body><a href="/college/yale-university-1023743">Yale</a></body></html>"#;
        let page = parse_listing(html, &base_url());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_empty_pagination_means_no_next_page() {
        let html = r#"<ul class="pagination"><li>1</li></ul>"#;
        let page = parse_listing(html, &base_url());
        assert!(page.next_page.is_none());
    }
}

use crate::url::Section;
use url::Url;

/// Builds the URL of the first listing page
///
/// # Example
///
/// ```
/// use college_scout::url::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.princetonreview.com").unwrap();
/// let url = listing_url(&base, "/college-search").unwrap();
/// assert_eq!(url.as_str(), "https://www.princetonreview.com/college-search");
/// ```
pub fn listing_url(base: &Url, listing_path: &str) -> Result<Url, url::ParseError> {
    base.join(listing_path)
}

/// Returns true if an anchor href looks like an institution profile link
///
/// Institution links are site-relative and end in a numeric id, so the
/// character six positions from the end is a digit
/// (`/college/harvard-college-1022984`).
pub fn is_institution_href(href: &str) -> bool {
    href.starts_with('/')
        && href
            .chars()
            .rev()
            .nth(5)
            .is_some_and(|c| c.is_ascii_digit())
}

/// Resolves a site-relative institution href into its canonical base URL
pub fn institution_url(base: &Url, href: &str) -> Result<String, url::ParseError> {
    Ok(base.join(href)?.to_string())
}

/// Appends the fixed section fragment to an institution base URL
pub fn section_url(institution_url: &str, section: Section) -> String {
    format!("{}{}", institution_url, section.suffix())
}

/// Resolves the href of a pagination "next" anchor against the site root
pub fn resolve_next_listing(base: &Url, href: &str) -> Result<Url, url::ParseError> {
    base.join(href.trim())
}

use crate::extract::{first_text, selector};
use crate::ScoutError;
use scraper::Html;

/// Postal address from an institution's visiting page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    /// True when every field is present
    pub fn is_complete(&self) -> bool {
        self.street_address.is_some()
            && self.city.is_some()
            && self.state.is_some()
            && self.zip_code.is_some()
    }
}

/// Extracts the postal address from a visiting page
///
/// Scans `div.row` blocks for the schema.org `itemprop` spans
/// `streetAddress`, `addressLocality`, `addressRegion` and `postalCode`.
/// The first block holding all four wins. Fields are never merged across
/// blocks: if no single block is complete, every field is `None`.
pub fn extract_address(html: &str) -> Result<Address, ScoutError> {
    let document = Html::parse_document(html);
    let row_selector = selector("div.row")?;
    let street_selector = selector(r#"span[itemprop="streetAddress"]"#)?;
    let city_selector = selector(r#"span[itemprop="addressLocality"]"#)?;
    let state_selector = selector(r#"span[itemprop="addressRegion"]"#)?;
    let zip_selector = selector(r#"span[itemprop="postalCode"]"#)?;

    for row in document.select(&row_selector) {
        let candidate = Address {
            street_address: first_text(row, &street_selector),
            city: first_text(row, &city_selector),
            state: first_text(row, &state_selector),
            zip_code: first_text(row, &zip_selector),
        };

        if candidate.is_complete() {
            return Ok(candidate);
        }
    }

    Ok(Address::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_complete_address() {
        let html = r#"
            <div class="row"><h4>Campus Visits</h4></div>
            <div class="row">
                <span itemprop="streetAddress"> 86 Brattle Street </span>
                <span itemprop="addressLocality">Cambridge</span>,
                <span itemprop="addressRegion">MA</span>
                <span itemprop="postalCode">02138</span>
            </div>
        "#;
        let address = extract_address(html).unwrap();
        assert_eq!(address.street_address.as_deref(), Some("86 Brattle Street"));
        assert_eq!(address.city.as_deref(), Some("Cambridge"));
        assert_eq!(address.state.as_deref(), Some("MA"));
        assert_eq!(address.zip_code.as_deref(), Some("02138"));
    }

    #[test]
    fn test_split_address_is_all_none() {
        let html = r#"
            <div class="row">
                <span itemprop="streetAddress">250 Administration Building</span>
                <span itemprop="addressLocality">East Lansing</span>
            </div>
            <div class="row">
                <span itemprop="addressRegion">MI</span>
                <span itemprop="postalCode">48824</span>
            </div>
        "#;
        assert_eq!(extract_address(html).unwrap(), Address::default());
    }

    #[test]
    fn test_first_complete_block_wins() {
        let html = r#"
            <div class="row">
                <span itemprop="streetAddress">1 First St</span>
                <span itemprop="addressLocality">Alpha</span>
                <span itemprop="addressRegion">NY</span>
                <span itemprop="postalCode">10001</span>
            </div>
            <div class="row">
                <span itemprop="streetAddress">2 Second St</span>
                <span itemprop="addressLocality">Beta</span>
                <span itemprop="addressRegion">CA</span>
                <span itemprop="postalCode">90001</span>
            </div>
        "#;
        let address = extract_address(html).unwrap();
        assert_eq!(address.city.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_no_rows_is_all_none() {
        let address = extract_address("<p>No address</p>").unwrap();
        assert!(!address.is_complete());
        assert_eq!(address, Address::default());
    }
}

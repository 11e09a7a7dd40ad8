use crate::extract::{first_text, selector};
use crate::ScoutError;
use scraper::Html;

/// Heading of the row holding the yearly tuition figure
const EXPENSES_HEADING: &str = "Expenses per Academic Year";

/// Extracts yearly tuition from a tuition page
///
/// Finds the row headed "Expenses per Academic Year" and parses its
/// `number-callout` value with thousands separators and the currency symbol
/// removed. Returns the `0.0` sentinel when the row, the value, or a
/// parsable number is missing.
///
/// # Example
///
/// ```
/// use college_scout::extract::extract_tuition;
///
/// let html = r#"<div class="row"><h4>Expenses per Academic Year</h4>
///               <div class="number-callout">$46,340</div></div>"#;
/// assert_eq!(extract_tuition(html).unwrap(), 46340.0);
/// ```
pub fn extract_tuition(html: &str) -> Result<f64, ScoutError> {
    let document = Html::parse_document(html);
    let row_selector = selector("div.row")?;
    let heading_selector = selector("h4")?;
    let value_selector = selector("div.number-callout")?;

    let Some(row) = document
        .select(&row_selector)
        .find(|row| first_text(*row, &heading_selector).as_deref() == Some(EXPENSES_HEADING))
    else {
        return Ok(0.0);
    };

    let Some(raw) = first_text(row, &value_selector) else {
        return Ok(0.0);
    };

    match parse_currency(&raw) {
        Some(tuition) => Ok(tuition),
        None => {
            tracing::debug!("Unparsable tuition '{}', using 0.0", raw);
            Ok(0.0)
        }
    }
}

/// Parses `"$46,340"` style text into `46340.0`
fn parse_currency(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .trim_matches('$')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

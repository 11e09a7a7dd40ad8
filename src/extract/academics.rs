use crate::extract::{selector, text_of};
use crate::ScoutError;
use scraper::Html;

/// Extracts the list of majors from an academics page
///
/// Majors are the `h6` labels inside every `ul.list-unstyled` block. Each
/// raw label carries one wrapping character on either side which is
/// dropped. A page without majors yields an empty list.
pub fn extract_majors(html: &str) -> Result<Vec<String>, ScoutError> {
    let document = Html::parse_document(html);
    let list_selector = selector("ul.list-unstyled")?;
    let label_selector = selector("h6")?;

    let majors = document
        .select(&list_selector)
        .flat_map(|list| list.select(&label_selector))
        .map(|label| strip_wrapping(&text_of(label)))
        .collect();

    Ok(majors)
}

/// Removes exactly one leading and one trailing character
fn strip_wrapping(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

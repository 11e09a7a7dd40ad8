use crate::extract::{first_text, selector, text_of};
use crate::ScoutError;
use scraper::Html;

/// Admissions facts from an institution's base page
#[derive(Debug, Clone, PartialEq)]
pub struct Admissions {
    /// Canonical institution name
    pub name: String,

    /// Acceptance rate as a percentage (0-100)
    pub acceptance_rate: f64,

    /// Average high-school GPA as printed; empty when not listed
    pub average_gpa: String,
}

/// Extracts the name, acceptance rate, and average GPA
///
/// The acceptance rate is the second `number-callout` block on the page.
/// The GPA lives in the "Overview" row under an "Average HS GPA" label.
///
/// # Errors
///
/// `ScoutError::Parse` when the name or acceptance rate is missing or the
/// rate is not a number.
pub fn extract_admissions(html: &str) -> Result<Admissions, ScoutError> {
    let document = Html::parse_document(html);

    let name_selector = selector(r#"span[itemprop="name"]"#)?;
    let name = first_text(document.root_element(), &name_selector)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ScoutError::Parse("institution name not found".to_string()))?;

    let callout_selector = selector("div.number-callout")?;
    let raw_rate = document
        .select(&callout_selector)
        .nth(1)
        .map(text_of)
        .ok_or_else(|| {
            ScoutError::Parse(format!("acceptance rate not found for {}", name))
        })?;
    let acceptance_rate = parse_percentage(&raw_rate).ok_or_else(|| {
        ScoutError::Parse(format!(
            "acceptance rate '{}' for {} is not a number",
            raw_rate.trim(),
            name
        ))
    })?;

    let average_gpa = extract_gpa(&document)?;

    Ok(Admissions {
        name,
        acceptance_rate,
        average_gpa,
    })
}

/// Parses `"5%"` style text into `5.0`
fn parse_percentage(raw: &str) -> Option<f64> {
    raw.trim().trim_matches('%').trim().parse::<f64>().ok()
}

fn extract_gpa(document: &Html) -> Result<String, ScoutError> {
    let row_selector = selector("div.row")?;
    let heading_selector = selector("h4")?;
    let item_selector = selector("div.col-sm-4")?;
    let label_selector = selector("div.bold")?;
    let value_selector = selector("div.number-callout")?;

    for row in document.select(&row_selector) {
        if first_text(row, &heading_selector).as_deref() != Some("Overview") {
            continue;
        }

        for item in row.select(&item_selector) {
            if first_text(item, &label_selector).as_deref() == Some("Average HS GPA") {
                if let Some(gpa) = first_text(item, &value_selector) {
                    return Ok(gpa);
                }
            }
        }
    }

    Ok(String::new())
}

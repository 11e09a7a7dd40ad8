//! Institution profile extraction
//!
//! Each profile section is parsed independently by looking for a block whose
//! heading or label matches known text and reading a sibling value:
//! - Admissions: canonical name, acceptance rate, average GPA
//! - Academics: offered majors
//! - Tuition: expenses per academic year
//! - Visiting: street address, city, state, postal code
//!
//! Required facts (name, acceptance rate) fail with a parse error; optional
//! facts fall back to documented defaults.

mod academics;
mod admissions;
mod tuition;
mod visiting;

pub use academics::extract_majors;
pub use admissions::{extract_admissions, Admissions};
pub use tuition::extract_tuition;
pub use visiting::{extract_address, Address};

use crate::ScoutError;
use scraper::{ElementRef, Selector};

/// Raw HTML of the pages making up one institution profile
#[derive(Debug, Clone)]
pub struct ProfilePages {
    pub admissions: String,
    pub academics: String,
    pub tuition: String,
    pub visiting: String,
}

/// Everything extracted for one institution
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionProfile {
    pub admissions: Admissions,
    pub majors: Vec<String>,
    pub tuition: f64,
    pub address: Address,
}

/// Extracts all sections of a profile
///
/// Fails only when a required admissions fact is missing.
pub fn extract_profile(pages: &ProfilePages) -> Result<InstitutionProfile, ScoutError> {
    Ok(InstitutionProfile {
        admissions: extract_admissions(&pages.admissions)?,
        majors: extract_majors(&pages.academics)?,
        tuition: extract_tuition(&pages.tuition)?,
        address: extract_address(&pages.visiting)?,
    })
}

/// Parses a CSS selector, mapping failures to a parse error
pub(crate) fn selector(css: &str) -> Result<Selector, ScoutError> {
    Selector::parse(css).map_err(|e| ScoutError::Parse(format!("bad selector '{}': {:?}", css, e)))
}

/// Concatenated text content of an element
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the first descendant matching `selector`
pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|found| text_of(found).trim().to_string())
}

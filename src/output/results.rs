//! Search result rendering
//!
//! Columns beyond the name are shown on request: acceptance rate and GPA
//! through the `acceptance` and `gpa` flags, tuition whenever the search
//! filtered on it, and the match count for major searches.

use crate::query::{SearchOutcome, SearchResult};

/// Formats search results as one line per institution
///
/// # Arguments
///
/// * `outcome` - The finished search, carrying the display flags
///
/// # Returns
///
/// The formatted text, ending with a newline
pub fn format_results(outcome: &SearchOutcome) -> String {
    let mut out = String::new();

    if outcome.results.is_empty() {
        out.push_str("No institutions matched.\n");
        return out;
    }

    let filter = &outcome.filter;
    for (rank, result) in outcome.results.iter().enumerate() {
        let institution = result.institution();
        out.push_str(&format!("{:>3}. {}", rank + 1, institution.name));

        if let SearchResult::Counted(_, count) = result {
            let noun = if *count == 1 { "major" } else { "majors" };
            out.push_str(&format!(" ({} matching {})", count, noun));
        }
        if filter.tuition.is_some() {
            out.push_str(&format!(" | tuition ${:.0}", institution.tuition));
        }
        if filter.wants_acceptance {
            out.push_str(&format!(
                " | acceptance {}%",
                institution.acceptance_rate
            ));
        }
        if filter.wants_gpa {
            let gpa = if institution.average_gpa.is_empty() {
                "n/a"
            } else {
                institution.average_gpa.as_str()
            };
            out.push_str(&format!(" | gpa {}", gpa));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{} result{} (limit {})\n",
        outcome.results.len(),
        if outcome.results.len() == 1 { "" } else { "s" },
        filter.limit
    ));

    out
}

/// Prints search results to stdout
pub fn print_results(outcome: &SearchOutcome) {
    print!("{}", format_results(outcome));
}

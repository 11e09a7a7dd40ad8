//! Catalog search
//!
//! A search command is parsed into a [`SearchFilter`], turned into a
//! parameterized statement by the [`QueryBuilder`], and run against the
//! catalog. The limit is applied after the rows come back.

mod builder;
mod command;

pub use builder::{QueryBuilder, QueryValue, SearchQuery, Strategy};
pub use command::{parse_command, SearchFilter, DEFAULT_LIMIT, SEARCH_KEYWORD};

use crate::storage::{Institution, Storage};
use crate::ScoutError;

/// One search hit
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// Institution matched without a major filter
    Plain(Institution),
    /// Institution with the number of majors that matched
    Counted(Institution, u64),
}

impl SearchResult {
    pub fn institution(&self) -> &Institution {
        match self {
            SearchResult::Plain(institution) | SearchResult::Counted(institution, _) => {
                institution
            }
        }
    }

    /// Number of matching majors, for major searches
    pub fn match_count(&self) -> Option<u64> {
        match self {
            SearchResult::Plain(_) => None,
            SearchResult::Counted(_, count) => Some(*count),
        }
    }
}

/// A finished search: the interpreted filter and its hits
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub filter: SearchFilter,
    pub results: Vec<SearchResult>,
}

/// Parses, builds, and runs a search command
///
/// Returns at most `limit` results, ordered by institution name.
pub fn search(storage: &dyn Storage, command: &str) -> Result<SearchOutcome, ScoutError> {
    let filter = parse_command(command)?;
    let query = QueryBuilder::build(&filter)?;

    let mut results = storage.run_search(&query)?;
    tracing::debug!("{} rows before limit {}", results.len(), filter.limit);
    results.truncate(filter.limit);

    Ok(SearchOutcome { filter, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InstitutionRecord, Location, SqliteStorage};

    fn record(
        name: &str,
        tuition: f64,
        state: &str,
        majors: &[&str],
    ) -> InstitutionRecord {
        InstitutionRecord {
            institution: Institution {
                name: name.to_string(),
                acceptance_rate: 40.0,
                tuition,
                average_gpa: "3.9".to_string(),
                latitude: None,
                longitude: None,
            },
            majors: majors.iter().map(|m| m.to_string()).collect(),
            location: Location {
                institution_name: name.to_string(),
                street_address: Some("1 Main St".to_string()),
                city: Some("Town".to_string()),
                state: Some(state.to_string()),
                zip_code: Some("00000".to_string()),
            },
        }
    }

    fn catalog() -> SqliteStorage {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let records = [
            record(
                "Alpha University",
                45000.0,
                "NY",
                &["Computer Science", "Computer Engineering", "History"],
            ),
            record("Beta College", 18000.0, "NY", &["History", "Biology"]),
            record("Gamma Institute", 0.0, "CA", &["Computer Science"]),
            record("Delta State", 12000.0, "CA", &["Biology", "Marine Biology"]),
        ];
        for record in &records {
            assert!(storage.insert_institution(record).unwrap());
        }
        storage
    }

    fn names(outcome: &SearchOutcome) -> Vec<&str> {
        outcome
            .results
            .iter()
            .map(|result| result.institution().name.as_str())
            .collect()
    }

    #[test]
    fn test_search_by_state() {
        let storage = catalog();
        let outcome = search(&storage, "search state=ny").unwrap();
        assert_eq!(names(&outcome), vec!["Alpha University", "Beta College"]);
        assert!(outcome.results.iter().all(|r| r.match_count().is_none()));
    }

    #[test]
    fn test_search_by_tuition_skips_unknown() {
        let storage = catalog();
        let outcome = search(&storage, "search tuition=50000").unwrap();
        assert_eq!(
            names(&outcome),
            vec!["Alpha University", "Beta College", "Delta State"]
        );
    }

    #[test]
    fn test_tuition_ceiling_is_inclusive() {
        let storage = catalog();
        let outcome = search(&storage, "search tuition=18000").unwrap();
        assert_eq!(names(&outcome), vec!["Beta College", "Delta State"]);
    }

    #[test]
    fn test_search_by_major_counts_matches() {
        let storage = catalog();
        let outcome = search(&storage, "search major=computer").unwrap();
        assert_eq!(
            outcome.results,
            vec![
                SearchResult::Counted(storage.get_institution("Alpha University").unwrap().unwrap(), 2),
                SearchResult::Counted(storage.get_institution("Gamma Institute").unwrap().unwrap(), 1),
            ]
        );
    }

    #[test]
    fn test_major_underscores_match_spaces() {
        let storage = catalog();
        let outcome = search(&storage, "search major=marine_biology").unwrap();
        assert_eq!(names(&outcome), vec!["Delta State"]);
        assert_eq!(outcome.results[0].match_count(), Some(1));
    }

    #[test]
    fn test_major_and_tuition() {
        let storage = catalog();
        let outcome = search(&storage, "search major=computer_science tuition=50000").unwrap();
        assert_eq!(names(&outcome), vec!["Alpha University"]);
    }

    #[test]
    fn test_major_and_state() {
        let storage = catalog();
        let outcome = search(&storage, "search major=biology state=CA").unwrap();
        assert_eq!(names(&outcome), vec!["Delta State"]);
        assert_eq!(outcome.results[0].match_count(), Some(2));
    }

    #[test]
    fn test_tuition_and_state() {
        let storage = catalog();
        let outcome = search(&storage, "search tuition=40000 state=ca").unwrap();
        assert_eq!(names(&outcome), vec!["Delta State"]);
    }

    #[test]
    fn test_all_three_filters() {
        let storage = catalog();
        let outcome = search(&storage, "search major=history tuition=20000 state=NY").unwrap();
        assert_eq!(names(&outcome), vec!["Beta College"]);

        let outcome = search(&storage, "search major=history tuition=10000 state=NY").unwrap();
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_limit_truncates_results() {
        let storage = catalog();
        let outcome = search(&storage, "search tuition=50000 limit=2").unwrap();
        assert_eq!(names(&outcome), vec!["Alpha University", "Beta College"]);

        let outcome = search(&storage, "search tuition=50000 limit=0").unwrap();
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_no_filter_is_rejected() {
        let storage = catalog();
        assert!(matches!(
            search(&storage, "search limit=3 gpa"),
            Err(ScoutError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_display_flags_carry_through() {
        let storage = catalog();
        let outcome = search(&storage, "search state=NY gpa acceptance").unwrap();
        assert!(outcome.filter.wants_gpa);
        assert!(outcome.filter.wants_acceptance);
    }
}

//! Integration tests for catalog search
//!
//! A small catalog is written to an on-disk database and searched through
//! the public command interface.

use college_scout::output::format_results;
use college_scout::query::search;
use college_scout::storage::{
    open_storage, Institution, InstitutionRecord, Location, SqliteStorage, Storage,
};
use college_scout::{ScoutError, SearchResult};
use tempfile::TempDir;

fn record(name: &str, tuition: f64, state: &str, majors: &[&str]) -> InstitutionRecord {
    InstitutionRecord {
        institution: Institution {
            name: name.to_string(),
            acceptance_rate: 25.0,
            tuition,
            average_gpa: "3.7".to_string(),
            latitude: None,
            longitude: None,
        },
        majors: majors.iter().map(|m| m.to_string()).collect(),
        location: Location {
            institution_name: name.to_string(),
            street_address: None,
            city: None,
            state: Some(state.to_string()),
            zip_code: None,
        },
    }
}

fn populated_catalog(dir: &TempDir) -> SqliteStorage {
    let mut storage = open_storage(&dir.path().join("catalog.db")).unwrap();
    for i in 0..15 {
        let state = if i % 3 == 0 { "TX" } else { "OK" };
        let tuition = if i % 5 == 0 { 0.0 } else { 10000.0 + i as f64 * 1000.0 };
        let majors: &[&str] = if i % 2 == 0 {
            &["Petroleum Engineering", "Computer Science"]
        } else {
            &["History"]
        };
        storage
            .insert_institution(&record(&format!("College {:02}", i), tuition, state, majors))
            .unwrap();
    }
    storage
}

#[test]
fn test_tuition_results_respect_ceiling() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    let outcome = search(&storage, "search tuition=20000 limit=100").unwrap();
    assert!(!outcome.results.is_empty());
    for result in &outcome.results {
        let tuition = result.institution().tuition;
        assert!(tuition > 0.0 && tuition <= 20000.0, "tuition {}", tuition);
    }
}

#[test]
fn test_limit_returns_prefix_of_full_results() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    let all = search(&storage, "search state=OK limit=100").unwrap();
    let limited = search(&storage, "search state=OK limit=3").unwrap();

    assert!(all.results.len() > 3);
    assert_eq!(limited.results.len(), 3);
    assert_eq!(limited.results[..], all.results[..3]);
}

#[test]
fn test_default_limit_is_ten() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    let outcome = search(&storage, "search major=history").unwrap();
    assert_eq!(outcome.results.len(), 7);

    let outcome = search(&storage, "search tuition=99999").unwrap();
    assert_eq!(outcome.results.len(), 10);
}

#[test]
fn test_major_results_are_counted() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    let outcome = search(&storage, "search major=computer_science state=TX").unwrap();
    assert!(!outcome.results.is_empty());
    for result in &outcome.results {
        assert!(matches!(result, SearchResult::Counted(_, 1)));
    }
}

#[test]
fn test_invalid_commands_are_not_fatal() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    for command in ["search", "search limit=5", "search color=red", "search tuition=cheap"] {
        assert!(matches!(
            search(&storage, command),
            Err(ScoutError::InvalidCommand(_))
        ));
    }

    // the catalog is still usable afterwards
    assert!(search(&storage, "search state=TX").is_ok());
}

#[test]
fn test_rendered_output_honours_flags() {
    let dir = TempDir::new().unwrap();
    let storage = populated_catalog(&dir);

    let outcome = search(&storage, "search state=TX limit=1 gpa acceptance").unwrap();
    let text = format_results(&outcome);
    assert!(text.contains("College 00"));
    assert!(text.contains("acceptance 25%"));
    assert!(text.contains("gpa 3.7"));
}

#[test]
fn test_catalog_persists_on_disk() {
    let dir = TempDir::new().unwrap();
    drop(populated_catalog(&dir));

    let storage = open_storage(&dir.path().join("catalog.db")).unwrap();
    assert_eq!(storage.count_institutions().unwrap(), 15);
}

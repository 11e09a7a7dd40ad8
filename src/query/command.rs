//! Search command tokenizer and validator
//!
//! Grammar:
//!
//! ```text
//! search [state=XX] [major=name_with_underscores] [tuition=NUMBER] [limit=NUMBER] [gpa] [acceptance]
//! ```
//!
//! Tokens are split on whitespace into `key=value` pairs and bare flags,
//! collected into a map, and checked against a fixed schema before being
//! interpreted.

use crate::ScoutError;
use std::collections::{BTreeMap, BTreeSet};

/// Keyword every search command starts with
pub const SEARCH_KEYWORD: &str = "search";

/// Result count used when no `limit=` is given
pub const DEFAULT_LIMIT: usize = 10;

const PAIR_KEYS: [&str; 4] = ["state", "major", "tuition", "limit"];
const FLAGS: [&str; 2] = ["gpa", "acceptance"];

/// A validated search command
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    /// Major name with underscores turned into spaces, matched as a substring
    pub major: Option<String>,
    /// Inclusive tuition ceiling
    pub tuition: Option<f64>,
    /// Upper-cased state code
    pub state: Option<String>,
    /// Maximum number of results returned
    pub limit: usize,
    /// Display the average GPA column
    pub wants_gpa: bool,
    /// Display the acceptance rate column
    pub wants_acceptance: bool,
}

/// One whitespace-separated token
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Pair { key: String, value: &'a str },
    Flag(String),
}

/// Structured form of a command before interpretation
#[derive(Debug, Default)]
struct ParsedTokens<'a> {
    pairs: BTreeMap<String, &'a str>,
    flags: BTreeSet<String>,
}

fn invalid(message: impl Into<String>) -> ScoutError {
    ScoutError::InvalidCommand(message.into())
}

fn tokenize(token: &str) -> Result<Token<'_>, ScoutError> {
    match token.split_once('=') {
        Some((key, value)) => {
            if key.is_empty() || value.is_empty() || value.contains('=') {
                return Err(invalid(format!("malformed parameter '{}'", token)));
            }
            Ok(Token::Pair {
                key: key.to_ascii_lowercase(),
                value,
            })
        }
        None => Ok(Token::Flag(token.to_ascii_lowercase())),
    }
}

/// Splits a command into pairs and flags and checks them against the schema
fn collect_tokens(command: &str) -> Result<ParsedTokens<'_>, ScoutError> {
    let mut words = command.split_whitespace();

    match words.next() {
        Some(first) if first.eq_ignore_ascii_case(SEARCH_KEYWORD) => {}
        Some(first) => return Err(invalid(format!("unknown command '{}'", first))),
        None => return Err(invalid("empty command")),
    }

    let mut parsed = ParsedTokens::default();
    for word in words {
        match tokenize(word)? {
            Token::Pair { key, value } => {
                if !PAIR_KEYS.contains(&key.as_str()) {
                    return Err(invalid(format!("unknown parameter '{}'", key)));
                }
                if parsed.pairs.insert(key.clone(), value).is_some() {
                    return Err(invalid(format!("parameter '{}' given twice", key)));
                }
            }
            Token::Flag(flag) => {
                if !FLAGS.contains(&flag.as_str()) {
                    return Err(invalid(format!("unknown option '{}'", flag)));
                }
                parsed.flags.insert(flag);
            }
        }
    }

    Ok(parsed)
}

/// Parses and validates a search command
///
/// # Errors
///
/// `ScoutError::InvalidCommand` when the command does not start with
/// `search`, contains an unknown or repeated token, has a number that does
/// not parse, or names none of `major`, `tuition`, and `state`.
///
/// # Example
///
/// ```
/// use college_scout::query::parse_command;
///
/// let filter = parse_command("search state=ny major=computer_science gpa").unwrap();
/// assert_eq!(filter.state.as_deref(), Some("NY"));
/// assert_eq!(filter.major.as_deref(), Some("computer science"));
/// assert_eq!(filter.limit, 10);
/// assert!(filter.wants_gpa);
/// ```
pub fn parse_command(command: &str) -> Result<SearchFilter, ScoutError> {
    let parsed = collect_tokens(command)?;

    let major = parsed.pairs.get("major").map(|value| value.replace('_', " "));

    let state = parsed.pairs.get("state").map(|value| value.to_ascii_uppercase());

    let tuition = match parsed.pairs.get("tuition") {
        Some(value) => {
            let ceiling = value
                .parse::<f64>()
                .map_err(|_| invalid(format!("tuition '{}' is not a number", value)))?;
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(invalid(format!(
                    "tuition '{}' must be a non-negative number",
                    value
                )));
            }
            Some(ceiling)
        }
        None => None,
    };

    let limit = match parsed.pairs.get("limit") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| invalid(format!("limit '{}' is not a whole number", value)))?,
        None => DEFAULT_LIMIT,
    };

    if major.is_none() && tuition.is_none() && state.is_none() {
        return Err(invalid("search needs at least one of state=, major=, tuition="));
    }

    Ok(SearchFilter {
        major,
        tuition,
        state,
        limit,
        wants_gpa: parsed.flags.contains("gpa"),
        wants_acceptance: parsed.flags.contains("acceptance"),
    })
}

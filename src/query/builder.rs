//! SQL generation for validated search filters
//!
//! Each combination of the three filters maps to its own [`Strategy`],
//! which decides the joins, predicates, and grouping of the statement.
//! Every user-supplied value is bound as a parameter; nothing from the
//! command is spliced into the SQL text.

use crate::query::SearchFilter;
use crate::ScoutError;
use rusqlite::types::{ToSql, ToSqlOutput};

const SELECT_COLUMNS: &str =
    "SELECT i.name, i.acceptance_rate, i.tuition, i.average_gpa, i.latitude, i.longitude";

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Real(f64),
}

impl ToSql for QueryValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            QueryValue::Text(text) => text.to_sql(),
            QueryValue::Real(value) => value.to_sql(),
        }
    }
}

/// A parameterized search statement
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub sql: String,
    pub params: Vec<QueryValue>,
    /// Rows carry a trailing match count column
    pub counted: bool,
}

/// Which filters a search combines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Major,
    Tuition,
    State,
    MajorTuition,
    MajorState,
    TuitionState,
    MajorTuitionState,
}

impl Strategy {
    /// Picks the strategy for a filter
    ///
    /// A filter naming none of the three fields has no strategy and is
    /// rejected.
    pub fn select(filter: &SearchFilter) -> Result<Self, ScoutError> {
        let strategy = match (
            filter.major.is_some(),
            filter.tuition.is_some(),
            filter.state.is_some(),
        ) {
            (true, false, false) => Strategy::Major,
            (false, true, false) => Strategy::Tuition,
            (false, false, true) => Strategy::State,
            (true, true, false) => Strategy::MajorTuition,
            (true, false, true) => Strategy::MajorState,
            (false, true, true) => Strategy::TuitionState,
            (true, true, true) => Strategy::MajorTuitionState,
            (false, false, false) => {
                return Err(ScoutError::InvalidCommand(
                    "search needs at least one of state=, major=, tuition=".to_string(),
                ))
            }
        };
        Ok(strategy)
    }

    fn uses_major(self) -> bool {
        matches!(
            self,
            Strategy::Major
                | Strategy::MajorTuition
                | Strategy::MajorState
                | Strategy::MajorTuitionState
        )
    }

    fn uses_state(self) -> bool {
        matches!(
            self,
            Strategy::State
                | Strategy::MajorState
                | Strategy::TuitionState
                | Strategy::MajorTuitionState
        )
    }
}

/// Builds search statements from filters
pub struct QueryBuilder;

impl QueryBuilder {
    /// Builds the statement for a filter
    ///
    /// * major: joins `majors`, matches `major_name LIKE %major%`, groups by
    ///   institution and counts matching majors
    /// * tuition: `tuition <= ceiling AND tuition > 0`, so unknown tuition
    ///   never matches
    /// * state: joins `locations` and matches the state exactly
    ///
    /// Results are ordered by institution name. The limit is applied by the
    /// caller.
    pub fn build(filter: &SearchFilter) -> Result<SearchQuery, ScoutError> {
        let strategy = Strategy::select(filter)?;
        let counted = strategy.uses_major();

        let mut sql = String::from(SELECT_COLUMNS);
        if counted {
            sql.push_str(", COUNT(m.id) AS matches");
        }
        sql.push_str(" FROM institutions i");
        if strategy.uses_state() {
            sql.push_str(" JOIN locations l ON l.institution_name = i.name");
        }
        if counted {
            sql.push_str(" JOIN majors m ON m.institution_name = i.name");
        }

        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(major) = &filter.major {
            params.push(QueryValue::Text(format!("%{}%", major)));
            conditions.push(format!("m.major_name LIKE ?{}", params.len()));
        }
        if let Some(ceiling) = filter.tuition {
            params.push(QueryValue::Real(ceiling));
            conditions.push(format!("i.tuition <= ?{} AND i.tuition > 0", params.len()));
        }
        if let Some(state) = &filter.state {
            params.push(QueryValue::Text(state.clone()));
            conditions.push(format!("l.state = ?{}", params.len()));
        }

        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));

        if counted {
            sql.push_str(" GROUP BY i.name");
        }
        sql.push_str(" ORDER BY i.name");

        tracing::debug!("{:?} search: {}", strategy, sql);

        Ok(SearchQuery {
            sql,
            params,
            counted,
        })
    }
}

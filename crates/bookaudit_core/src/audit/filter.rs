//! Composable predicates for audit queries.
//!
//! A predicate appends one `column OP ?N` condition and its bound value to a
//! [`WhereClause`]. Conditions are joined with AND, so the result set does not
//! depend on the order filters are applied in; only parameter positions do.

use crate::model::event::Operation;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Value;

/// Something that narrows an audit query.
pub trait Predicate {
    fn apply(&self, clause: &mut WhereClause);
}

/// Comparison used by one WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    Less,
}

impl Comparison {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }
}

/// Accumulates AND-joined conditions with positionally bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every predicate in application order.
    pub fn from_predicates<P: Predicate>(predicates: &[P]) -> Self {
        let mut clause = Self::new();
        for predicate in predicates {
            predicate.apply(&mut clause);
        }
        clause
    }

    /// Appends `column OP ?N`, where `N` is the next parameter position.
    pub fn push(&mut self, column: &'static str, comparison: Comparison, value: impl Into<Value>) {
        let position = self.params.len() + 1;
        self.conditions
            .push(format!("{column} {} ?{position}", comparison.as_sql()));
        self.params.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Renders `WHERE c1 AND c2 ...`, or an empty string when unconstrained.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        format!("WHERE {}", self.conditions.join(" AND "))
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Audit log filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Events strictly after the instant.
    After(DateTime<Utc>),
    /// Events strictly before the instant.
    Before(DateTime<Utc>),
    User(String),
    Operation(Operation),
    ObjectType(String),
}

impl Filter {
    /// Events strictly after `at`, compared in UTC.
    pub fn after<Tz: TimeZone>(at: DateTime<Tz>) -> Self {
        Self::After(at.with_timezone(&Utc))
    }

    /// Events strictly before `at`, compared in UTC.
    pub fn before<Tz: TimeZone>(at: DateTime<Tz>) -> Self {
        Self::Before(at.with_timezone(&Utc))
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }

    pub fn operation(operation: Operation) -> Self {
        Self::Operation(operation)
    }

    pub fn object_type(tag: impl Into<String>) -> Self {
        Self::ObjectType(tag.into())
    }
}

impl Predicate for Filter {
    fn apply(&self, clause: &mut WhereClause) {
        match self {
            Self::After(at) => clause.push("ts", Comparison::Greater, at.timestamp_millis()),
            Self::Before(at) => clause.push("ts", Comparison::Less, ceil_millis(at)),
            Self::User(name) => clause.push("username", Comparison::Equal, name.clone()),
            Self::Operation(op) => {
                clause.push("operation", Comparison::Equal, op.as_str().to_string())
            }
            Self::ObjectType(tag) => clause.push("obj_type", Comparison::Equal, tag.clone()),
        }
    }
}

/// Smallest whole millisecond not earlier than `at`.
///
/// Stored timestamps are whole milliseconds, so `ts < ceil(at)` keeps an
/// event in the same millisecond as `at` but before it.
fn ceil_millis(at: &DateTime<Utc>) -> i64 {
    let millis = at.timestamp_millis();
    if at.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    }
}

/// Shorthand for [`Filter::after`].
pub fn after<Tz: TimeZone>(at: DateTime<Tz>) -> Filter {
    Filter::after(at)
}

/// Shorthand for [`Filter::before`].
pub fn before<Tz: TimeZone>(at: DateTime<Tz>) -> Filter {
    Filter::before(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn no_filters_render_no_where_clause() {
        let clause = WhereClause::from_predicates::<Filter>(&[]);
        assert!(clause.is_empty());
        assert_eq!(clause.sql(), "");
        assert!(clause.params().is_empty());
    }

    #[test]
    fn filters_number_parameters_in_application_order() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let clause = WhereClause::from_predicates(&[
            after(start),
            before(end),
            Filter::operation(Operation::Delete),
        ]);

        assert_eq!(clause.sql(), "WHERE ts > ?1 AND ts < ?2 AND operation = ?3");
        assert_eq!(
            clause.params(),
            &[
                Value::Integer(start.timestamp_millis()),
                Value::Integer(end.timestamp_millis()),
                Value::Text("DELETE".to_string()),
            ]
        );
    }

    #[test]
    fn reversed_order_changes_positions_only() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let clause = WhereClause::from_predicates(&[before(end), after(start)]);

        assert_eq!(clause.sql(), "WHERE ts < ?1 AND ts > ?2");
        assert_eq!(clause.params()[1], Value::Integer(start.timestamp_millis()));
    }

    #[test]
    fn before_rounds_sub_millisecond_instants_up() {
        let whole = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let inside = whole + chrono::Duration::microseconds(500);

        let clause = WhereClause::from_predicates(&[before(inside), after(inside)]);
        assert_eq!(
            clause.params(),
            &[
                Value::Integer(1_700_000_000_124),
                Value::Integer(1_700_000_000_123),
            ]
        );

        let exact = WhereClause::from_predicates(&[before(whole)]);
        assert_eq!(exact.params(), &[Value::Integer(1_700_000_000_123)]);
    }

    #[test]
    fn instants_are_normalized_to_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        assert_eq!(Filter::after(local), Filter::After(utc));
        assert_eq!(Filter::before(local), Filter::Before(utc));
    }
}

//! Read side of the audit stream. Querying never writes an event.

use super::filter::{Predicate, WhereClause};
use crate::model::event::{AuditEvent, Operation};
use crate::repo::error::{RepoError, RepoResult, StorageContext};
use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection, Row};

const EVENT_SELECT_SQL: &str = "SELECT ts, username, operation, obj_type, obj_id FROM events";

/// Returns every event matching all `filters`, in insertion order.
pub(crate) fn query_events<P: Predicate>(
    conn: &Connection,
    filters: &[P],
) -> RepoResult<Vec<AuditEvent>> {
    let clause = WhereClause::from_predicates(filters);
    let sql = format!("{EVENT_SELECT_SQL} {} ORDER BY id ASC;", clause.sql());

    let mut stmt = conn.prepare(&sql).context("select events")?;
    let mut rows = stmt
        .query(params_from_iter(clause.params()))
        .context("select events")?;

    let mut events = Vec::new();
    while let Some(row) = rows.next().context("scan event row")? {
        events.push(parse_event_row(row)?);
    }
    Ok(events)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<AuditEvent> {
    let millis: i64 = row.get("ts").context("scan event row")?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{millis}` out of range in events.ts"))
    })?;

    let operation_text: String = row.get("operation").context("scan event row")?;
    let operation = Operation::parse(&operation_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid operation `{operation_text}` in events.operation"
        ))
    })?;

    Ok(AuditEvent {
        timestamp,
        user: row.get("username").context("scan event row")?,
        operation,
        object_type: row.get("obj_type").context("scan event row")?,
        object_id: row.get("obj_id").context("scan event row")?,
    })
}

//! Event insertion shared by the authorizer and the repositories.

use crate::model::event::Operation;
use crate::repo::error::{RepoResult, StorageContext};
use rusqlite::{params, Connection};

/// Storage clock in epoch milliseconds, UTC.
pub(crate) const NOW_MILLIS_SQL: &str =
    "CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER)";

/// Appends one audit event using the storage clock.
///
/// `tx` must be the connection of an open transaction so the event shares
/// the fate of the data statement it describes.
pub(crate) fn record_event(
    tx: &Connection,
    user: &str,
    operation: Operation,
    object_type: &str,
    object_id: Option<i64>,
) -> RepoResult<()> {
    tx.execute(
        &format!(
            "INSERT INTO events (username, obj_type, obj_id, operation, ts)
             VALUES (?1, ?2, ?3, ?4, {NOW_MILLIS_SQL});"
        ),
        params![user, object_type, object_id, operation.as_str()],
    )
    .context("insert event")?;
    Ok(())
}

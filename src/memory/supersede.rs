//! Supersession state machine.
//!
//! Each learning is either `Active` (`superseded_by IS NULL`) or `Superseded`.
//! The only transition is Active → Superseded, fired by the explicit
//! [`supersede`] operation or by a `supersedes` parameter at creation time
//! ([`mark_superseded_if_active`]). Once set, `superseded_by` is never
//! re-pointed and never cleared.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::MnemoError;

/// Outcome of a supersede request. Repeating a supersede on an already
/// replaced learning is reported, not re-applied.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SupersedeOutcome {
    Superseded { old_id: i64, new_id: i64 },
    AlreadySuperseded { old_id: i64, superseded_by: i64 },
}

/// Explicit supersede entry point: mark `old_id` as replaced by `new_id`.
///
/// Both learnings must exist and be distinct. Idempotent-by-report: if
/// `old_id` is already superseded the existing target is reported unchanged,
/// even when a different `new_id` is supplied.
pub fn supersede(conn: &Connection, old_id: i64, new_id: i64) -> Result<SupersedeOutcome, MnemoError> {
    if old_id == new_id {
        return Err(MnemoError::SelfSupersession(old_id));
    }

    let current = lookup_superseded_by(conn, old_id)?.ok_or(MnemoError::NotFound(old_id))?;
    if lookup_superseded_by(conn, new_id)?.is_none() {
        return Err(MnemoError::NotFound(new_id));
    }

    if let Some(existing_target) = current {
        return Ok(SupersedeOutcome::AlreadySuperseded {
            old_id,
            superseded_by: existing_target,
        });
    }

    // First write wins: the guard on superseded_by makes the check-then-act
    // atomic at the statement level, so a concurrent supersede that landed
    // between our read and this write leaves the row untouched.
    let updated = conn.execute(
        "UPDATE learnings SET superseded_by = ?1 WHERE id = ?2 AND superseded_by IS NULL",
        params![new_id, old_id],
    )?;

    if updated == 0 {
        let target = lookup_superseded_by(conn, old_id)?
            .flatten()
            .ok_or(MnemoError::NotFound(old_id))?;
        return Ok(SupersedeOutcome::AlreadySuperseded {
            old_id,
            superseded_by: target,
        });
    }

    tracing::info!(old_id, new_id, "learning superseded");
    Ok(SupersedeOutcome::Superseded { old_id, new_id })
}

/// Creation-time supersession: same transition, laxer preconditions.
///
/// Called after the new learning has a durable id. A missing `old_id` is a
/// warn-logged no-op and an already-superseded `old_id` stays pointed at its
/// original replacement — the new learning is kept in both cases.
pub(crate) fn mark_superseded_if_active(
    conn: &Connection,
    old_id: i64,
    new_id: i64,
) -> Result<(), MnemoError> {
    match lookup_superseded_by(conn, old_id)? {
        None => {
            tracing::warn!(old_id, new_id, "supersedes target does not exist; skipping");
        }
        Some(Some(existing_target)) => {
            tracing::debug!(
                old_id,
                existing_target,
                "supersedes target already superseded; not re-pointing"
            );
        }
        Some(None) => {
            conn.execute(
                "UPDATE learnings SET superseded_by = ?1 WHERE id = ?2 AND superseded_by IS NULL",
                params![new_id, old_id],
            )?;
            tracing::info!(old_id, new_id, "learning superseded at creation");
        }
    }
    Ok(())
}

/// Outer `None` = row does not exist; inner option is the current target.
fn lookup_superseded_by(conn: &Connection, id: i64) -> Result<Option<Option<i64>>, MnemoError> {
    let row = conn
        .query_row(
            "SELECT superseded_by FROM learnings WHERE id = ?1",
            params![id],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()?;
    Ok(row)
}

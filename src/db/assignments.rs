//! Checkout and return of inventory items. Each item is either available or
//! held by exactly one student, and a student holds at most one item of each
//! kind. All checks and the bind happen inside one immediate transaction so
//! two racing checkouts of the same item cannot both win.

use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension};
use rusqlite::{Transaction, TransactionBehavior};
use tracing::{info, warn};

use crate::error::{BandError, Result};
use crate::models::{ItemId, NewItem, ResourceItem, ResourceKind, StudentId};

use super::catalog::{add_item, find_item};
use super::roster::student_exists;
use super::today;

/// Bind an available item to a student and stamp today's date.
pub fn checkout(
    conn: &Connection,
    kind: ResourceKind,
    item_id: ItemId,
    student_id: StudentId,
) -> Result<ResourceItem> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    bind(&tx, kind, item_id, student_id)?;
    let item = find_item(&tx, kind, item_id)?;
    tx.commit()?;

    info!(%kind, item_id, student_id, "checked out");
    Ok(item)
}

/// Release a held item back to inventory. Whoever brings it back, the holder
/// is cleared.
pub fn give_back(conn: &Connection, kind: ResourceKind, item_id: ItemId) -> Result<ResourceItem> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    match holder(&tx, kind, item_id)? {
        None => return Err(BandError::item_not_found(kind, item_id)),
        Some(None) => {
            warn!(%kind, item_id, "return of an item that is not checked out");
            return Err(BandError::NotCheckedOut { kind, item_id });
        }
        Some(Some(_)) => {}
    }

    let sql = format!(
        "UPDATE {} SET checked_out_to = NULL, checked_out_date = NULL
         WHERE id = ?1 AND checked_out_to IS NOT NULL",
        kind.table()
    );
    let released = tx.execute(&sql, [item_id])?;
    if released == 0 {
        return Err(BandError::NotCheckedOut { kind, item_id });
    }
    let item = find_item(&tx, kind, item_id)?;
    tx.commit()?;

    info!(%kind, item_id, "returned");
    Ok(item)
}

/// Add a new item and hand it to a student in one step, the way uniforms and
/// shakos are usually issued. If the student cannot take it, the item is not
/// created either.
pub fn issue(
    conn: &Connection,
    item: &NewItem,
    notes: Option<&str>,
    student_id: StudentId,
) -> Result<ResourceItem> {
    let kind = item.kind();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    if !student_exists(&tx, student_id)? {
        return Err(BandError::student_not_found(student_id));
    }
    if let Some(held) = held_item(&tx, kind, student_id)? {
        return Err(BandError::AlreadyHolding {
            kind,
            student_id,
            item_id: held,
        });
    }

    let added = add_item(&tx, item, notes)?;
    bind(&tx, kind, added.id, student_id)?;
    let item = find_item(&tx, kind, added.id)?;
    tx.commit()?;

    info!(%kind, item_id = item.id, student_id, "issued new item");
    Ok(item)
}

/// Everything a student currently holds, at most one item per kind.
pub fn holdings(conn: &Connection, student_id: StudentId) -> Result<Vec<ResourceItem>> {
    if !student_exists(conn, student_id)? {
        return Err(BandError::student_not_found(student_id));
    }

    let mut items = Vec::new();
    for kind in ResourceKind::ALL {
        if let Some(item_id) = held_item(conn, kind, student_id)? {
            items.push(find_item(conn, kind, item_id)?);
        }
    }
    Ok(items)
}

/// Precondition checks followed by the conditional update. Must run inside a
/// write transaction.
fn bind(conn: &Connection, kind: ResourceKind, item_id: ItemId, student_id: StudentId) -> Result<()> {
    if !student_exists(conn, student_id)? {
        return Err(BandError::student_not_found(student_id));
    }

    match holder(conn, kind, item_id)? {
        None => return Err(BandError::item_not_found(kind, item_id)),
        Some(Some(current)) => {
            warn!(%kind, item_id, holder = current, "item already checked out");
            return Err(BandError::ItemUnavailable { kind, item_id });
        }
        Some(None) => {}
    }

    if let Some(held) = held_item(conn, kind, student_id)? {
        warn!(%kind, student_id, held, "student already holds one of this kind");
        return Err(BandError::AlreadyHolding {
            kind,
            student_id,
            item_id: held,
        });
    }

    let sql = format!(
        "UPDATE {} SET checked_out_to = ?1, checked_out_date = ?2
         WHERE id = ?3 AND checked_out_to IS NULL",
        kind.table()
    );
    let bound = match conn.execute(&sql, params![student_id, today(), item_id]) {
        Ok(bound) => bound,
        Err(err) if is_constraint_violation(&err) => {
            let held = held_item(conn, kind, student_id)?.unwrap_or(item_id);
            return Err(BandError::AlreadyHolding {
                kind,
                student_id,
                item_id: held,
            });
        }
        Err(err) => return Err(err.into()),
    };

    if bound == 0 {
        return Err(BandError::ItemUnavailable { kind, item_id });
    }
    Ok(())
}

/// `None` when the item does not exist, otherwise its current holder.
fn holder(
    conn: &Connection,
    kind: ResourceKind,
    item_id: ItemId,
) -> Result<Option<Option<StudentId>>> {
    let sql = format!("SELECT checked_out_to FROM {} WHERE id = ?1", kind.table());
    let found = conn
        .query_row(&sql, [item_id], |row| row.get(0))
        .optional()?;
    Ok(found)
}

fn held_item(conn: &Connection, kind: ResourceKind, student_id: StudentId) -> Result<Option<ItemId>> {
    let sql = format!("SELECT id FROM {} WHERE checked_out_to = ?1", kind.table());
    let found = conn
        .query_row(&sql, [student_id], |row| row.get(0))
        .optional()?;
    Ok(found)
}

/// The per-table `UNIQUE(checked_out_to)` backs the explicit holding check;
/// its violation is reported as the same domain error.
fn is_constraint_violation(err: &SqlError) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::{debug, info};

use crate::error::{BandError, Result};
use crate::models::{
    CheckoutSlot, Descriptor, InstrumentType, ItemId, NewItem, ResourceItem, ResourceKind, Section,
};

/// Base query per kind. Every variant aliases the item table as `i` and starts
/// with the shared columns so `item_from_row` can read them by position.
fn select_sql(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Instrument => {
            "SELECT i.id, i.condition_notes, i.checked_out_to, i.checked_out_date,
                    t.id, t.name, t.section, i.serial
             FROM instruments i
             INNER JOIN instrument_types t ON t.id = i.type_id"
        }
        ResourceKind::Uniform => {
            "SELECT i.id, i.condition_notes, i.checked_out_to, i.checked_out_date,
                    i.coat_size, i.pant_size, i.coat_number, i.pant_number
             FROM uniforms i"
        }
        ResourceKind::Shako => {
            "SELECT i.id, i.condition_notes, i.checked_out_to, i.checked_out_date, i.size
             FROM shakos i"
        }
    }
}

/// Ordering applied after any availability grouping.
fn secondary_order(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Instrument => "t.name, i.id",
        ResourceKind::Uniform | ResourceKind::Shako => "i.id",
    }
}

/// The read-only instrument catalog, grouped by section.
pub fn instrument_types(conn: &Connection) -> Result<Vec<InstrumentType>> {
    let mut stmt = conn.prepare("SELECT id, name, section FROM instrument_types ORDER BY section, name")?;
    let types = stmt
        .query_map([], instrument_type_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(types)
}

/// Case-insensitive lookup of a catalog entry such as "trumpet".
pub fn instrument_type_by_name(conn: &Connection, name: &str) -> Result<Option<InstrumentType>> {
    let found = conn
        .query_row(
            "SELECT id, name, section FROM instrument_types WHERE name = ?1 COLLATE NOCASE",
            [name.trim()],
            instrument_type_from_row,
        )
        .optional()?;
    Ok(found)
}

/// Add an item to inventory. Serials and sizes carry no uniqueness rule; the
/// only failure besides storage is an instrument type missing from the
/// catalog.
pub fn add_item(conn: &Connection, item: &NewItem, notes: Option<&str>) -> Result<ResourceItem> {
    let kind = item.kind();
    match item {
        NewItem::Instrument { type_id, serial } => {
            let known = conn
                .query_row(
                    "SELECT 1 FROM instrument_types WHERE id = ?1",
                    [type_id],
                    |_| Ok(()),
                )
                .optional()?;
            if known.is_none() {
                return Err(BandError::NotFound {
                    what: "instrument type",
                    id: *type_id,
                });
            }
            conn.execute(
                "INSERT INTO instruments (type_id, serial, condition_notes) VALUES (?1, ?2, ?3)",
                params![type_id, serial, notes],
            )?;
        }
        NewItem::Uniform {
            coat_size,
            pant_size,
            coat_number,
            pant_number,
        } => {
            conn.execute(
                "INSERT INTO uniforms (coat_size, pant_size, coat_number, pant_number, condition_notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![coat_size, pant_size, coat_number, pant_number, notes],
            )?;
        }
        NewItem::Shako { size } => {
            conn.execute(
                "INSERT INTO shakos (size, condition_notes) VALUES (?1, ?2)",
                params![size, notes],
            )?;
        }
    }

    let id = conn.last_insert_rowid();
    info!(%kind, item_id = id, "added item to inventory");
    find_item(conn, kind, id)
}

pub fn find_item(conn: &Connection, kind: ResourceKind, id: ItemId) -> Result<ResourceItem> {
    let sql = format!("{} WHERE i.id = ?1", select_sql(kind));
    conn.query_row(&sql, [id], |row| item_from_row(kind, row))
        .optional()?
        .ok_or_else(|| BandError::item_not_found(kind, id))
}

/// Items nobody holds. The section filter narrows instruments by their type's
/// section; uniforms and shakos have no section and ignore it.
pub fn list_available(
    conn: &Connection,
    kind: ResourceKind,
    section: Option<Section>,
) -> Result<Vec<ResourceItem>> {
    match (kind, section) {
        (ResourceKind::Instrument, Some(section)) => query_items(
            conn,
            kind,
            "WHERE i.checked_out_to IS NULL AND t.section = ?1",
            secondary_order(kind),
            [section],
        ),
        _ => {
            if section.is_some() {
                debug!(%kind, "section filter ignored for this kind");
            }
            query_items(
                conn,
                kind,
                "WHERE i.checked_out_to IS NULL",
                secondary_order(kind),
                [],
            )
        }
    }
}

/// Items currently held by a student, by item ID.
pub fn list_checked_out(conn: &Connection, kind: ResourceKind) -> Result<Vec<ResourceItem>> {
    query_items(conn, kind, "WHERE i.checked_out_to IS NOT NULL", "i.id", [])
}

/// The assignments view: held items first, then available ones.
pub fn list_all(conn: &Connection, kind: ResourceKind) -> Result<Vec<ResourceItem>> {
    let order = format!("(i.checked_out_to IS NULL), {}", secondary_order(kind));
    query_items(conn, kind, "", &order, [])
}

fn query_items<P: Params>(
    conn: &Connection,
    kind: ResourceKind,
    filter: &str,
    order: &str,
    params: P,
) -> Result<Vec<ResourceItem>> {
    let sql = format!("{} {filter} ORDER BY {order}", select_sql(kind));
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params, |row| item_from_row(kind, row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(%kind, count = items.len(), "loaded items");
    Ok(items)
}

pub(crate) fn item_from_row(kind: ResourceKind, row: &Row<'_>) -> rusqlite::Result<ResourceItem> {
    let descriptor = match kind {
        ResourceKind::Instrument => Descriptor::Instrument {
            instrument_type: InstrumentType {
                id: row.get(4)?,
                name: row.get(5)?,
                section: row.get(6)?,
            },
            serial: row.get(7)?,
        },
        ResourceKind::Uniform => Descriptor::Uniform {
            coat_size: row.get(4)?,
            pant_size: row.get(5)?,
            coat_number: row.get(6)?,
            pant_number: row.get(7)?,
        },
        ResourceKind::Shako => Descriptor::Shako { size: row.get(4)? },
    };

    Ok(ResourceItem {
        id: row.get(0)?,
        descriptor,
        condition_notes: row.get(1)?,
        slot: CheckoutSlot {
            checked_out_to: row.get(2)?,
            checked_out_date: row.get(3)?,
        },
    })
}

fn instrument_type_from_row(row: &Row<'_>) -> rusqlite::Result<InstrumentType> {
    Ok(InstrumentType {
        id: row.get(0)?,
        name: row.get(1)?,
        section: row.get(2)?,
    })
}

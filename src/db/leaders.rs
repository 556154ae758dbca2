use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::{BandError, Result};
use crate::models::{Section, SectionLeader, StudentId};

use super::roster::student_exists;

const LEADER_SELECT: &str = "
    SELECT l.section, l.student_id, s.first_name || ' ' || s.last_name
    FROM section_leaders l
    INNER JOIN students s ON s.student_id = l.student_id";

/// Make a student the leader of a section, replacing whoever led it before.
/// Membership of that section is not required.
pub fn set_leader(conn: &Connection, section: Section, student_id: StudentId) -> Result<()> {
    if !student_exists(conn, student_id)? {
        return Err(BandError::student_not_found(student_id));
    }

    conn.execute(
        "INSERT INTO section_leaders (section, student_id) VALUES (?1, ?2)
         ON CONFLICT(section) DO UPDATE SET student_id = excluded.student_id",
        params![section, student_id],
    )?;

    info!(%section, student_id, "section leader assigned");
    Ok(())
}

pub fn leader_for(conn: &Connection, section: Section) -> Result<Option<SectionLeader>> {
    let sql = format!("{LEADER_SELECT} WHERE l.section = ?1");
    let leader = conn
        .query_row(&sql, [section], leader_from_row)
        .optional()?;
    Ok(leader)
}

/// Current leaders, one row per section that has one.
pub fn list_leaders(conn: &Connection) -> Result<Vec<SectionLeader>> {
    let sql = format!("{LEADER_SELECT} ORDER BY l.section");
    let mut stmt = conn.prepare(&sql)?;
    let leaders = stmt
        .query_map([], leader_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(leaders)
}

fn leader_from_row(row: &Row<'_>) -> rusqlite::Result<SectionLeader> {
    Ok(SectionLeader {
        section: row.get(0)?,
        student_id: row.get(1)?,
        leader_name: row.get(2)?,
    })
}

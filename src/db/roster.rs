use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row};
use rusqlite::{Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::error::{BandError, Result};
use crate::models::{
    ComplianceRecord, ComplianceUpdate, NewStudent, RosterEntry, Student, StudentId,
};

use super::today;

const ROSTER_SELECT: &str = "
    SELECT s.student_id, s.first_name, s.last_name, s.classification, s.section,
           s.shirt_size, s.shoe_size,
           c.credit_hours, c.gpa, c.dues_paid, c.last_verified
    FROM students s
    INNER JOIN compliance c ON c.student_id = s.student_id";

/// Enroll a student together with a zeroed compliance row. Both inserts run in
/// one transaction so a failure leaves neither behind.
pub fn create_student(conn: &Connection, new: &NewStudent) -> Result<Student> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    if student_exists(&tx, new.id)? {
        warn!(student_id = new.id, "rejected duplicate student");
        return Err(BandError::DuplicateKey(new.id));
    }

    tx.execute(
        "INSERT INTO students
            (student_id, first_name, last_name, classification, section, shirt_size, shoe_size)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.id,
            new.first_name,
            new.last_name,
            new.classification,
            new.section,
            new.shirt_size,
            new.shoe_size,
        ],
    )
    .map_err(|err| map_duplicate_student(err, new.id))?;

    tx.execute(
        "INSERT INTO compliance (student_id, credit_hours, gpa, dues_paid, last_verified)
         VALUES (?1, 0, 0.0, 0, ?2)",
        params![new.id, today()],
    )?;

    tx.commit()?;
    info!(student_id = new.id, section = %new.section, "enrolled student");

    Ok(Student {
        id: new.id,
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        classification: new.classification.clone(),
        section: new.section,
        shirt_size: new.shirt_size.clone(),
        shoe_size: new.shoe_size.clone(),
    })
}

pub fn find_student(conn: &Connection, id: StudentId) -> Result<Student> {
    student_record(conn, id).map(|entry| entry.student)
}

/// Look up one student along with its compliance facts.
pub fn student_record(conn: &Connection, id: StudentId) -> Result<RosterEntry> {
    let sql = format!("{ROSTER_SELECT} WHERE s.student_id = ?1");
    conn.query_row(&sql, [id], roster_entry_from_row)
        .optional()?
        .ok_or_else(|| BandError::student_not_found(id))
}

/// Every student with compliance, ordered by section, last name, first name
/// and finally enrollment order.
pub fn list_students(conn: &Connection) -> Result<Vec<RosterEntry>> {
    let sql = format!(
        "{ROSTER_SELECT} ORDER BY s.section, s.last_name, s.first_name, s.seq"
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map([], roster_entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = entries.len(), "loaded roster");
    Ok(entries)
}

/// Overwrite a student's compliance facts and stamp today's date as the last
/// verification. Value ranges are the caller's responsibility.
pub fn update_compliance(
    conn: &Connection,
    id: StudentId,
    update: &ComplianceUpdate,
) -> Result<ComplianceRecord> {
    let verified = today();
    let updated = conn.execute(
        "UPDATE compliance
         SET credit_hours = ?1, gpa = ?2, dues_paid = ?3, last_verified = ?4
         WHERE student_id = ?5",
        params![
            update.credit_hours,
            update.gpa,
            update.dues_paid,
            verified,
            id
        ],
    )?;

    if updated == 0 {
        return Err(BandError::student_not_found(id));
    }

    info!(
        student_id = id,
        credit_hours = update.credit_hours,
        gpa = update.gpa,
        dues_paid = update.dues_paid,
        "updated compliance"
    );

    Ok(ComplianceRecord {
        student_id: id,
        credit_hours: update.credit_hours,
        gpa: update.gpa,
        dues_paid: update.dues_paid,
        last_verified: verified,
    })
}

pub(crate) fn student_exists(conn: &Connection, id: StudentId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM students WHERE student_id = ?1",
            [id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn roster_entry_from_row(row: &Row<'_>) -> rusqlite::Result<RosterEntry> {
    let id: StudentId = row.get(0)?;
    Ok(RosterEntry {
        student: Student {
            id,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            classification: row.get(3)?,
            section: row.get(4)?,
            shirt_size: row.get(5)?,
            shoe_size: row.get(6)?,
        },
        compliance: ComplianceRecord {
            student_id: id,
            credit_hours: row.get(7)?,
            gpa: row.get(8)?,
            dues_paid: row.get(9)?,
            last_verified: row.get(10)?,
        },
    })
}

/// A constraint violation on insert means another writer enrolled the same
/// ID between our check and the insert.
fn map_duplicate_student(err: SqlError, id: StudentId) -> BandError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        BandError::DuplicateKey(id)
    } else {
        err.into()
    }
}

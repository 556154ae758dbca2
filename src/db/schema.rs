//! Versioned schema. Each migration is additive and runs once, tracked through
//! `PRAGMA user_version`, so opening an up-to-date store is a no-op.

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::info;

use crate::models::Section;

/// A single schema step. `version` is the `user_version` stored once the step
/// has been applied.
pub(crate) struct Migration {
    pub(crate) version: i64,
    pub(crate) description: &'static str,
    pub(crate) sql: &'static str,
}

/// All migrations in the order they must run.
pub(crate) const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create roster and compliance tables",
        sql: "
            CREATE TABLE IF NOT EXISTS students (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id INTEGER NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                classification TEXT NOT NULL DEFAULT '',
                section TEXT NOT NULL
                    CHECK (section IN ('WOODWIND','BRASS','PERCUSSION','AUXILIARY','DM')),
                shirt_size TEXT,
                shoe_size TEXT
            );

            CREATE TABLE IF NOT EXISTS compliance (
                student_id INTEGER PRIMARY KEY,
                credit_hours INTEGER NOT NULL DEFAULT 0 CHECK (credit_hours >= 0),
                gpa REAL NOT NULL DEFAULT 0.0,
                dues_paid INTEGER NOT NULL DEFAULT 0 CHECK (dues_paid IN (0, 1)),
                last_verified TEXT NOT NULL,
                FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
            );
        ",
    },
    Migration {
        version: 2,
        description: "create inventory tables",
        sql: "
            CREATE TABLE IF NOT EXISTS instrument_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                section TEXT NOT NULL
                    CHECK (section IN ('WOODWIND','BRASS','PERCUSSION','AUXILIARY','DM'))
            );

            CREATE TABLE IF NOT EXISTS instruments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_id INTEGER NOT NULL,
                serial TEXT,
                condition_notes TEXT,
                checked_out_to INTEGER UNIQUE,
                checked_out_date TEXT,
                FOREIGN KEY (type_id) REFERENCES instrument_types(id),
                FOREIGN KEY (checked_out_to) REFERENCES students(student_id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS uniforms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                coat_size TEXT,
                pant_size TEXT,
                coat_number TEXT,
                pant_number TEXT,
                condition_notes TEXT,
                checked_out_to INTEGER UNIQUE,
                checked_out_date TEXT,
                FOREIGN KEY (checked_out_to) REFERENCES students(student_id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS shakos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                size TEXT,
                condition_notes TEXT,
                checked_out_to INTEGER UNIQUE,
                checked_out_date TEXT,
                FOREIGN KEY (checked_out_to) REFERENCES students(student_id) ON DELETE SET NULL
            );

            -- The SET NULL action leaves the checkout date behind; release
            -- both columns before the student row goes away.
            CREATE TRIGGER IF NOT EXISTS students_release_items
            BEFORE DELETE ON students
            BEGIN
                UPDATE instruments SET checked_out_to = NULL, checked_out_date = NULL
                    WHERE checked_out_to = OLD.student_id;
                UPDATE uniforms SET checked_out_to = NULL, checked_out_date = NULL
                    WHERE checked_out_to = OLD.student_id;
                UPDATE shakos SET checked_out_to = NULL, checked_out_date = NULL
                    WHERE checked_out_to = OLD.student_id;
            END;
        ",
    },
    Migration {
        version: 3,
        description: "create section leaders table",
        sql: "
            CREATE TABLE IF NOT EXISTS section_leaders (
                section TEXT PRIMARY KEY
                    CHECK (section IN ('WOODWIND','BRASS','PERCUSSION','AUXILIARY','DM')),
                student_id INTEGER NOT NULL,
                FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
            );
        ",
    },
];

/// Bootstrap instrument catalog. Read-only once seeded.
pub(crate) const INSTRUMENT_CATALOG: &[(&str, Section)] = &[
    ("PICCOLO", Section::Woodwind),
    ("CLARINET", Section::Woodwind),
    ("SAXOPHONE", Section::Woodwind),
    ("TRUMPET", Section::Brass),
    ("TROMBONE", Section::Brass),
    ("SOUSAPHONE", Section::Brass),
    ("MELLOPHONE", Section::Brass),
    ("PERCUSSION", Section::Percussion),
    ("COLOR_GUARD", Section::Auxiliary),
];

/// Version of the newest migration.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Read the schema version currently stored in the database.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Apply every migration newer than the stored version. Each step runs in its
/// own immediate transaction and re-reads the version inside it, so two
/// processes opening the same file apply a step only once.
pub(crate) fn migrate(conn: &mut Connection) -> rusqlite::Result<i64> {
    for migration in MIGRATIONS {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if schema_version(&tx)? >= migration.version {
            continue;
        }
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        info!(
            version = migration.version,
            "applied migration: {}", migration.description
        );
    }

    schema_version(conn)
}

/// Insert the instrument catalog, ignoring entries that already exist.
pub(crate) fn seed_instrument_types(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO instrument_types (name, section) VALUES (?1, ?2)")?;
    for (name, section) in INSTRUMENT_CATALOG {
        stmt.execute(params![name, section])?;
    }
    Ok(())
}

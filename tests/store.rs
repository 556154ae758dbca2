mod common;

use marching_band::db::{
    instrument_types, latest_version, list_students, schema_version, Store,
};
use marching_band::models::Section;
use tempfile::TempDir;

use common::enroll;

#[test]
fn file_store_is_migrated_and_reopens_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("band.sqlite");

    let store = Store::open(&path).unwrap();
    assert_eq!(schema_version(store.conn()).unwrap(), latest_version());
    enroll(&store, 11, "Ada", "Lovelace", Section::Brass);
    store.close().unwrap();

    let reopened = Store::open(&path).unwrap();
    assert_eq!(schema_version(reopened.conn()).unwrap(), latest_version());
    assert_eq!(instrument_types(reopened.conn()).unwrap().len(), 9);
    assert_eq!(list_students(reopened.conn()).unwrap().len(), 1);
}

#[test]
fn file_store_uses_wal_journaling() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&dir.path().join("band.sqlite")).unwrap();
    let mode: String = store
        .conn()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn foreign_keys_are_enforced() {
    let store = Store::open_in_memory().unwrap();
    let enabled: i64 = store
        .conn()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

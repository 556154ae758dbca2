mod common;

use std::fs;

use crossterm::event::KeyCode;
use marching_band::db::{checkout, update_compliance};
use marching_band::export::{
    export_all, inventory_file_name, write_compliance, write_inventory, write_roster,
    COMPLIANCE_FILE_NAME, ROSTER_FILE_NAME,
};
use marching_band::models::{ComplianceUpdate, ResourceKind, Section};
use marching_band::App;
use tempfile::TempDir;

use common::{add_instrument, add_shako, enroll, store};

fn lines(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn roster_rows_follow_section_then_name() {
    let store = store();
    enroll(&store, 3, "Zoe", "Adams", Section::Woodwind);
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    enroll(&store, 2, "Bea", "Adams", Section::Brass);

    let mut out = Vec::new();
    write_roster(store.conn(), &mut out).unwrap();

    assert_eq!(
        lines(out),
        vec![
            "Student ID,First,Last,Class,Section,Shirt,Shoe",
            "2,Bea,Adams,Freshman,BRASS,,",
            "1,Ada,Lovelace,Freshman,BRASS,,",
            "3,Zoe,Adams,Freshman,WOODWIND,,",
        ]
    );
}

#[test]
fn compliance_sheet_lists_ineligible_students_first() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    enroll(&store, 2, "Bea", "Moss", Section::Brass);
    update_compliance(
        store.conn(),
        1,
        &ComplianceUpdate {
            credit_hours: 15,
            gpa: 3.5,
            dues_paid: true,
        },
    )
    .unwrap();

    let mut out = Vec::new();
    write_compliance(store.conn(), &mut out).unwrap();
    let rows = lines(out);

    assert_eq!(
        rows[0],
        "Student ID,First,Last,Class,Section,Credits,GPA,Dues Paid,Eligible,Last Verified"
    );
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("2,Bea,Moss,Freshman,BRASS,0,0.00,No,No,"));
    assert!(rows[2].starts_with("1,Ada,Lovelace,Freshman,BRASS,15,3.50,Yes,Yes,"));
}

#[test]
fn inventory_sheet_names_the_holder() {
    let store = store();
    enroll(&store, 7, "Kim", "Park", Section::Brass);
    let spare = add_instrument(&store, "TRUMPET", Some("A-1"));
    let held = add_instrument(&store, "TRUMPET", Some("A-2"));
    checkout(store.conn(), ResourceKind::Instrument, held.id, 7).unwrap();

    let mut out = Vec::new();
    write_inventory(store.conn(), ResourceKind::Instrument, &mut out).unwrap();
    let rows = lines(out);

    assert_eq!(
        rows[0],
        "ID,Type,Section,Serial,Condition,Assigned To,Date,Available"
    );
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with(&format!("{},TRUMPET,BRASS,A-2,,Kim Park (7),", held.id)));
    assert!(rows[1].ends_with(",No"));
    assert_eq!(rows[2], format!("{},TRUMPET,BRASS,A-1,,,,Yes", spare.id));
}

#[test]
fn export_all_writes_every_sheet_into_a_fresh_directory() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    add_shako(&store, "M");
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("exports");

    let written = export_all(store.conn(), &target).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let mut expected = vec![ROSTER_FILE_NAME.to_string(), COMPLIANCE_FILE_NAME.to_string()];
    expected.extend(ResourceKind::ALL.into_iter().map(inventory_file_name));
    assert_eq!(names, expected);

    let shakos = fs::read_to_string(target.join("shakos.csv")).unwrap();
    assert_eq!(
        shakos.lines().collect::<Vec<_>>(),
        vec![
            "ID,Size,Condition,Assigned To,Date,Available",
            "1,M,,,,Yes",
        ]
    );
}

#[test]
fn export_key_writes_reports_from_the_app() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("exports");

    let mut app = App::new(store, target.clone()).unwrap();
    assert!(!app.handle_key(KeyCode::Char('x')).unwrap());

    let roster = fs::read_to_string(target.join(ROSTER_FILE_NAME)).unwrap();
    assert_eq!(roster.lines().nth(1), Some("1,Ada,Lovelace,Freshman,BRASS,,"));
    assert!(target.join(COMPLIANCE_FILE_NAME).exists());
}

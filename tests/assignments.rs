mod common;

use marching_band::db::{
    checkout, find_item, give_back, holdings, instrument_type_by_name, issue, list_all,
    list_leaders, set_leader, student_record,
};
use marching_band::models::{NewItem, ResourceKind, Section};
use marching_band::BandError;

use common::{add_instrument, add_shako, add_uniform, enroll, store};

#[test]
fn one_item_per_kind_but_kinds_are_independent() {
    let store = store();
    enroll(&store, 101, "Ada", "Lovelace", Section::Brass);
    let trumpet = add_instrument(&store, "TRUMPET", None);
    let shako = add_shako(&store, "M");
    let trombone = add_instrument(&store, "TROMBONE", None);
    assert_eq!(trumpet.id, 1);
    assert_eq!(shako.id, 1);

    let held = checkout(store.conn(), ResourceKind::Instrument, trumpet.id, 101).unwrap();
    assert_eq!(held.slot.checked_out_to, Some(101));
    assert!(held.slot.checked_out_date.is_some());

    checkout(store.conn(), ResourceKind::Shako, shako.id, 101).unwrap();

    let err = checkout(store.conn(), ResourceKind::Instrument, trombone.id, 101).unwrap_err();
    assert!(matches!(
        err,
        BandError::AlreadyHolding {
            kind: ResourceKind::Instrument,
            student_id: 101,
            item_id
        } if item_id == trumpet.id
    ));
    assert!(find_item(store.conn(), ResourceKind::Instrument, trombone.id)
        .unwrap()
        .is_available());
}

#[test]
fn returning_an_available_item_changes_nothing() {
    let store = store();
    let uniform = add_uniform(&store, "40R", "32");

    let err = give_back(store.conn(), ResourceKind::Uniform, uniform.id).unwrap_err();
    assert!(matches!(err, BandError::NotCheckedOut { .. }));

    let after = find_item(store.conn(), ResourceKind::Uniform, uniform.id).unwrap();
    assert_eq!(after, uniform);
    assert!(after.is_available());
}

#[test]
fn checkout_return_cycle_repeats() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    enroll(&store, 2, "Grace", "Hopper", Section::Brass);
    let horn = add_instrument(&store, "MELLOPHONE", Some("M-9"));

    for student in [1, 2, 1] {
        checkout(store.conn(), ResourceKind::Instrument, horn.id, student).unwrap();
        let returned = give_back(store.conn(), ResourceKind::Instrument, horn.id).unwrap();
        assert!(returned.is_available());
        assert_eq!(returned.slot.checked_out_date, None);
    }
}

#[test]
fn held_item_cannot_be_checked_out_again() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    enroll(&store, 2, "Grace", "Hopper", Section::Brass);
    let shako = add_shako(&store, "L");
    checkout(store.conn(), ResourceKind::Shako, shako.id, 1).unwrap();

    let err = checkout(store.conn(), ResourceKind::Shako, shako.id, 2).unwrap_err();
    assert!(matches!(err, BandError::ItemUnavailable { .. }));

    let same_student = checkout(store.conn(), ResourceKind::Shako, shako.id, 1).unwrap_err();
    assert!(matches!(same_student, BandError::ItemUnavailable { .. }));

    let item = find_item(store.conn(), ResourceKind::Shako, shako.id).unwrap();
    assert_eq!(item.slot.checked_out_to, Some(1));
}

#[test]
fn checkout_failures_name_their_cause() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    let shako = add_shako(&store, "L");

    assert!(matches!(
        checkout(store.conn(), ResourceKind::Shako, shako.id, 99),
        Err(BandError::NotFound { what: "student", id: 99 })
    ));
    assert!(matches!(
        checkout(store.conn(), ResourceKind::Shako, 42, 1),
        Err(BandError::NotFound { what: "shako", id: 42 })
    ));
    assert!(matches!(
        give_back(store.conn(), ResourceKind::Shako, 42),
        Err(BandError::NotFound { what: "shako", id: 42 })
    ));
}

#[test]
fn issue_creates_and_binds_in_one_step() {
    let store = store();
    enroll(&store, 5, "Lin", "Chen", Section::Woodwind);
    let item = NewItem::Uniform {
        coat_size: Some("38S".into()),
        pant_size: Some("30".into()),
        coat_number: Some("17".into()),
        pant_number: Some("17".into()),
    };

    let issued = issue(store.conn(), &item, Some("new"), 5).unwrap();
    assert_eq!(issued.slot.checked_out_to, Some(5));
    assert_eq!(issued.condition_notes.as_deref(), Some("new"));

    let again = issue(store.conn(), &item, None, 5).unwrap_err();
    assert!(matches!(again, BandError::AlreadyHolding { item_id, .. } if item_id == issued.id));
    assert_eq!(list_all(store.conn(), ResourceKind::Uniform).unwrap().len(), 1);

    let nobody = issue(store.conn(), &item, None, 77).unwrap_err();
    assert!(matches!(nobody, BandError::NotFound { what: "student", .. }));
    assert_eq!(list_all(store.conn(), ResourceKind::Uniform).unwrap().len(), 1);
}

#[test]
fn issue_with_unknown_type_creates_nothing() {
    let store = store();
    enroll(&store, 5, "Lin", "Chen", Section::Woodwind);
    let item = NewItem::Instrument {
        type_id: 1234,
        serial: None,
    };
    assert!(matches!(
        issue(store.conn(), &item, None, 5),
        Err(BandError::NotFound { what: "instrument type", .. })
    ));
    assert!(list_all(store.conn(), ResourceKind::Instrument)
        .unwrap()
        .is_empty());
}

#[test]
fn holdings_list_one_item_per_kind() {
    let store = store();
    enroll(&store, 8, "Sam", "Sousa", Section::Brass);
    let sousaphone = instrument_type_by_name(store.conn(), "SOUSAPHONE")
        .unwrap()
        .unwrap();
    issue(
        store.conn(),
        &NewItem::Instrument {
            type_id: sousaphone.id,
            serial: Some("S-1".into()),
        },
        None,
        8,
    )
    .unwrap();
    let shako = add_shako(&store, "M");
    checkout(store.conn(), ResourceKind::Shako, shako.id, 8).unwrap();

    let held = holdings(store.conn(), 8).unwrap();
    let kinds: Vec<ResourceKind> = held.iter().map(|item| item.kind()).collect();
    assert_eq!(kinds, vec![ResourceKind::Instrument, ResourceKind::Shako]);

    assert!(matches!(
        holdings(store.conn(), 9),
        Err(BandError::NotFound { .. })
    ));
}

#[test]
fn removing_a_student_releases_items_and_cascades() {
    let store = store();
    enroll(&store, 3, "Kim", "Park", Section::Percussion);
    let drum = add_instrument(&store, "PERCUSSION", None);
    checkout(store.conn(), ResourceKind::Instrument, drum.id, 3).unwrap();
    set_leader(store.conn(), Section::Percussion, 3).unwrap();

    store
        .conn()
        .execute("DELETE FROM students WHERE student_id = ?1", [3])
        .unwrap();

    let released = find_item(store.conn(), ResourceKind::Instrument, drum.id).unwrap();
    assert_eq!(released.slot.checked_out_to, None);
    assert_eq!(released.slot.checked_out_date, None);
    assert!(matches!(
        student_record(store.conn(), 3),
        Err(BandError::NotFound { .. })
    ));
    assert!(list_leaders(store.conn()).unwrap().is_empty());

    let compliance_rows: i64 = store
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM compliance WHERE student_id = 3",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(compliance_rows, 0);
}

#[test]
fn holder_must_reference_an_existing_student() {
    let store = store();
    let shako = add_shako(&store, "M");
    let result = store.conn().execute(
        "UPDATE shakos SET checked_out_to = 500 WHERE id = ?1",
        [shako.id],
    );
    assert!(result.is_err());
}

#[test]
fn returned_rows_match_what_was_committed() {
    let store = store();
    enroll(&store, 4, "Ray", "Ortiz", Section::Brass);
    let horn = add_instrument(&store, "TROMBONE", Some("T-2"));

    let held = checkout(store.conn(), ResourceKind::Instrument, horn.id, 4).unwrap();
    assert_eq!(held.slot.checked_out_to, Some(4));
    assert_eq!(
        held,
        find_item(store.conn(), ResourceKind::Instrument, horn.id).unwrap()
    );

    let returned = give_back(store.conn(), ResourceKind::Instrument, horn.id).unwrap();
    assert!(returned.is_available());
    assert_eq!(
        returned,
        find_item(store.conn(), ResourceKind::Instrument, horn.id).unwrap()
    );

    let shako = NewItem::Shako {
        size: Some("S".into()),
    };
    let issued = issue(store.conn(), &shako, None, 4).unwrap();
    assert_eq!(issued.slot.checked_out_to, Some(4));
    assert!(issued.slot.checked_out_date.is_some());
    assert_eq!(
        issued,
        find_item(store.conn(), ResourceKind::Shako, issued.id).unwrap()
    );
}

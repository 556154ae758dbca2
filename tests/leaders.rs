mod common;

use marching_band::db::{leader_for, list_leaders, set_leader};
use marching_band::models::Section;
use marching_band::BandError;

use common::{enroll, store};

#[test]
fn setting_a_leader_replaces_the_previous_one() {
    let store = store();
    enroll(&store, 1, "Ada", "Lovelace", Section::Brass);
    enroll(&store, 2, "Grace", "Hopper", Section::Brass);

    set_leader(store.conn(), Section::Brass, 1).unwrap();
    set_leader(store.conn(), Section::Brass, 2).unwrap();

    let leader = leader_for(store.conn(), Section::Brass).unwrap().unwrap();
    assert_eq!(leader.student_id, 2);
    assert_eq!(leader.leader_name, "Grace Hopper");
    assert_eq!(list_leaders(store.conn()).unwrap().len(), 1);
}

#[test]
fn leader_need_not_belong_to_the_section() {
    let store = store();
    enroll(&store, 9, "Sam", "Sousa", Section::Brass);
    set_leader(store.conn(), Section::Woodwind, 9).unwrap();
    set_leader(store.conn(), Section::DrumMajor, 9).unwrap();

    let sections: Vec<Section> = list_leaders(store.conn())
        .unwrap()
        .into_iter()
        .map(|leader| leader.section)
        .collect();
    assert_eq!(sections, vec![Section::DrumMajor, Section::Woodwind]);
}

#[test]
fn unknown_student_cannot_lead() {
    let store = store();
    let err = set_leader(store.conn(), Section::Percussion, 404).unwrap_err();
    assert!(matches!(err, BandError::NotFound { id: 404, .. }));
    assert!(leader_for(store.conn(), Section::Percussion)
        .unwrap()
        .is_none());
}

#![allow(dead_code)]

use marching_band::db::{add_item, create_student, instrument_type_by_name, Store};
use marching_band::models::{NewItem, NewStudent, ResourceItem, Section, Student, StudentId};

pub fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

pub fn new_student(id: StudentId, first: &str, last: &str, section: Section) -> NewStudent {
    NewStudent {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        classification: "Freshman".to_string(),
        section,
        shirt_size: None,
        shoe_size: None,
    }
}

pub fn enroll(store: &Store, id: StudentId, first: &str, last: &str, section: Section) -> Student {
    create_student(store.conn(), &new_student(id, first, last, section)).expect("enroll student")
}

pub fn add_instrument(store: &Store, type_name: &str, serial: Option<&str>) -> ResourceItem {
    let instrument_type = instrument_type_by_name(store.conn(), type_name)
        .expect("catalog lookup")
        .expect("type is seeded");
    let item = NewItem::Instrument {
        type_id: instrument_type.id,
        serial: serial.map(str::to_string),
    };
    add_item(store.conn(), &item, None).expect("add instrument")
}

pub fn add_shako(store: &Store, size: &str) -> ResourceItem {
    let item = NewItem::Shako {
        size: Some(size.to_string()),
    };
    add_item(store.conn(), &item, None).expect("add shako")
}

pub fn add_uniform(store: &Store, coat: &str, pant: &str) -> ResourceItem {
    let item = NewItem::Uniform {
        coat_size: Some(coat.to_string()),
        pant_size: Some(pant.to_string()),
        coat_number: None,
        pant_number: None,
    };
    add_item(store.conn(), &item, None).expect("add uniform")
}

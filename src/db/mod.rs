//! Persistence module split across logical submodules. Every operation takes
//! the connection owned by [`Store`] so callers decide its lifetime.

mod assignments;
mod catalog;
mod connection;
mod leaders;
mod roster;
mod schema;

use chrono::{Local, NaiveDate};

pub use assignments::{checkout, give_back, holdings, issue};
pub use catalog::{
    add_item, find_item, instrument_type_by_name, instrument_types, list_all, list_available,
    list_checked_out,
};
pub use connection::Store;
pub use leaders::{leader_for, list_leaders, set_leader};
pub use roster::{create_student, find_student, list_students, student_record, update_compliance};
pub use schema::{latest_version, schema_version};

/// Calendar date used for checkout and verification stamps.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

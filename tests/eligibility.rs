mod common;

use marching_band::db::{list_students, student_record, update_compliance};
use marching_band::eligibility::{is_eligible, report, Eligibility};
use marching_band::models::{ComplianceUpdate, Section};

use common::{enroll, store};

fn comply(credit_hours: u32, gpa: f64, dues_paid: bool) -> ComplianceUpdate {
    ComplianceUpdate {
        credit_hours,
        gpa,
        dues_paid,
    }
}

#[test]
fn unpaid_dues_flip_eligibility_only() {
    let store = store();
    enroll(&store, 202, "Lin", "Chen", Section::Woodwind);

    update_compliance(store.conn(), 202, &comply(12, 3.0, true)).unwrap();
    let before = student_record(store.conn(), 202).unwrap().compliance;
    assert!(is_eligible(&before));

    update_compliance(store.conn(), 202, &comply(12, 3.0, false)).unwrap();
    let after = student_record(store.conn(), 202).unwrap().compliance;
    assert!(!is_eligible(&after));
    assert_eq!(after.credit_hours, 12);
    assert_eq!(after.gpa, 3.0);

    let eligibility = Eligibility::of(&after);
    assert!(eligibility.hours_ok && eligibility.gpa_ok && !eligibility.dues_ok);
}

#[test]
fn report_lists_ineligible_students_first() {
    let store = store();
    enroll(&store, 1, "Ann", "Able", Section::Brass);
    enroll(&store, 2, "Ben", "Baker", Section::Brass);
    enroll(&store, 3, "Cat", "Cole", Section::Auxiliary);
    enroll(&store, 4, "Dan", "Dunn", Section::Woodwind);
    update_compliance(store.conn(), 1, &comply(15, 3.8, true)).unwrap();
    update_compliance(store.conn(), 4, &comply(12, 3.0, true)).unwrap();

    let rows = report(list_students(store.conn()).unwrap());
    let ids: Vec<i64> = rows.iter().map(|row| row.entry.student.id).collect();
    // Ineligible: Cole (AUXILIARY), Baker (BRASS); eligible: Able (BRASS), Dunn (WOODWIND).
    assert_eq!(ids, vec![3, 2, 1, 4]);
    assert!(!rows[0].eligibility.eligible());
    assert!(rows[3].eligibility.eligible());
}

#[test]
fn report_of_empty_roster_is_empty() {
    let store = store();
    assert!(report(list_students(store.conn()).unwrap()).is_empty());
}

//! Participation eligibility, derived from compliance facts on every read.
//! Nothing here touches the database.

use crate::models::{ComplianceRecord, RosterEntry};

/// Minimum enrolled credit hours.
pub const MIN_CREDIT_HOURS: u32 = 12;
/// Minimum grade point average.
pub const MIN_GPA: f64 = 3.0;

/// The three participation criteria evaluated separately so reports can show
/// which one a student is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub hours_ok: bool,
    pub gpa_ok: bool,
    pub dues_ok: bool,
}

impl Eligibility {
    pub fn of(record: &ComplianceRecord) -> Self {
        Self {
            hours_ok: record.credit_hours >= MIN_CREDIT_HOURS,
            gpa_ok: record.gpa >= MIN_GPA,
            dues_ok: record.dues_paid,
        }
    }

    pub fn eligible(&self) -> bool {
        self.hours_ok && self.gpa_ok && self.dues_ok
    }
}

pub fn is_eligible(record: &ComplianceRecord) -> bool {
    Eligibility::of(record).eligible()
}

/// One line of the eligibility report.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRow {
    pub entry: RosterEntry,
    pub eligibility: Eligibility,
}

/// Order a roster for the eligibility report: ineligible students first, then
/// eligible ones. The sort is stable, so each group keeps the roster's
/// section / last name / first name order.
pub fn report(roster: Vec<RosterEntry>) -> Vec<EligibilityRow> {
    let mut rows: Vec<EligibilityRow> = roster
        .into_iter()
        .map(|entry| EligibilityRow {
            eligibility: Eligibility::of(&entry.compliance),
            entry,
        })
        .collect();
    rows.sort_by_key(|row| row.eligibility.eligible());
    rows
}

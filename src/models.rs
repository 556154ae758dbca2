//! Domain models that mirror the SQLite schema and get passed between the
//! persistence layer and the TUI. They stay plain data holders; the rules that
//! bind them together live in `db` and `eligibility`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::error::BandError;

/// Operator-assigned student number.
pub type StudentId = i64;
/// Auto-assigned inventory number, unique within one resource kind.
pub type ItemId = i64;

/// The five fixed subunits of the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Woodwind,
    Brass,
    Percussion,
    Auxiliary,
    DrumMajor,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Woodwind,
        Section::Brass,
        Section::Percussion,
        Section::Auxiliary,
        Section::DrumMajor,
    ];

    /// Canonical upper-case name, identical to the value stored in SQLite.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Woodwind => "WOODWIND",
            Section::Brass => "BRASS",
            Section::Percussion => "PERCUSSION",
            Section::Auxiliary => "AUXILIARY",
            Section::DrumMajor => "DM",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = BandError;

    /// Accepts the canonical names in any case with surrounding whitespace,
    /// which is how operators type them at the prompt.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| BandError::InvalidSection(s.trim().to_string()))
    }
}

impl ToSql for Section {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Section {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: BandError| FromSqlError::Other(Box::new(err)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    /// Free text such as "Freshman" or "Senior".
    pub classification: String,
    pub section: Section,
    pub shirt_size: Option<String>,
    pub shoe_size: Option<String>,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Operator input for a new roster entry.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub classification: String,
    pub section: Section,
    pub shirt_size: Option<String>,
    pub shoe_size: Option<String>,
}

/// Academic and financial facts tracked per student. Eligibility is derived
/// from these on every read and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceRecord {
    pub student_id: StudentId,
    pub credit_hours: u32,
    pub gpa: f64,
    pub dues_paid: bool,
    pub last_verified: NaiveDate,
}

/// New compliance values. Ranges are checked by the input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceUpdate {
    pub credit_hours: u32,
    pub gpa: f64,
    pub dues_paid: bool,
}

/// A student joined with its compliance row, as listed on the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub student: Student,
    pub compliance: ComplianceRecord,
}

/// The three physical resource kinds. Each kind has its own table, and the
/// single-holder rule is enforced per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instrument,
    Uniform,
    Shako,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Instrument,
        ResourceKind::Uniform,
        ResourceKind::Shako,
    ];

    pub(crate) fn table(self) -> &'static str {
        match self {
            ResourceKind::Instrument => "instruments",
            ResourceKind::Uniform => "uniforms",
            ResourceKind::Shako => "shakos",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Instrument => "instrument",
            ResourceKind::Uniform => "uniform",
            ResourceKind::Shako => "shako",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entry of the read-only instrument type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentType {
    pub id: i64,
    pub name: String,
    pub section: Section,
}

/// Who holds an item and since when. Both fields are set or both are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSlot {
    pub checked_out_to: Option<StudentId>,
    pub checked_out_date: Option<NaiveDate>,
}

impl CheckoutSlot {
    pub fn is_available(&self) -> bool {
        self.checked_out_to.is_none()
    }
}

/// Kind-specific descriptive fields of an inventory item.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Instrument {
        instrument_type: InstrumentType,
        serial: Option<String>,
    },
    Uniform {
        coat_size: Option<String>,
        pant_size: Option<String>,
        coat_number: Option<String>,
        pant_number: Option<String>,
    },
    Shako {
        size: Option<String>,
    },
}

impl Descriptor {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Descriptor::Instrument { .. } => ResourceKind::Instrument,
            Descriptor::Uniform { .. } => ResourceKind::Uniform,
            Descriptor::Shako { .. } => ResourceKind::Shako,
        }
    }

    /// One-line summary used in lists ("TRUMPET #A123", "coat 40R / pant 32").
    pub fn summary(&self) -> String {
        fn or_dash(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("-")
        }
        match self {
            Descriptor::Instrument {
                instrument_type,
                serial,
            } => match serial {
                Some(serial) => format!("{} #{serial}", instrument_type.name),
                None => instrument_type.name.clone(),
            },
            Descriptor::Uniform {
                coat_size,
                pant_size,
                coat_number,
                pant_number,
            } => format!(
                "coat {} ({}) / pant {} ({})",
                or_dash(coat_size),
                or_dash(coat_number),
                or_dash(pant_size),
                or_dash(pant_number)
            ),
            Descriptor::Shako { size } => format!("size {}", or_dash(size)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceItem {
    pub id: ItemId,
    pub descriptor: Descriptor,
    pub condition_notes: Option<String>,
    pub slot: CheckoutSlot,
}

impl ResourceItem {
    pub fn kind(&self) -> ResourceKind {
        self.descriptor.kind()
    }

    pub fn is_available(&self) -> bool {
        self.slot.is_available()
    }
}

/// Descriptor input for a freshly added inventory item. Instruments reference
/// the catalog by type ID.
#[derive(Debug, Clone, PartialEq)]
pub enum NewItem {
    Instrument {
        type_id: i64,
        serial: Option<String>,
    },
    Uniform {
        coat_size: Option<String>,
        pant_size: Option<String>,
        coat_number: Option<String>,
        pant_number: Option<String>,
    },
    Shako {
        size: Option<String>,
    },
}

impl NewItem {
    pub fn kind(&self) -> ResourceKind {
        match self {
            NewItem::Instrument { .. } => ResourceKind::Instrument,
            NewItem::Uniform { .. } => ResourceKind::Uniform,
            NewItem::Shako { .. } => ResourceKind::Shako,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionLeader {
    pub section: Section,
    pub student_id: StudentId,
    pub leader_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_parses_operator_input() {
        assert_eq!(" brass ".parse::<Section>().unwrap(), Section::Brass);
        assert_eq!("dm".parse::<Section>().unwrap(), Section::DrumMajor);
        assert_eq!("AUXILIARY".parse::<Section>().unwrap(), Section::Auxiliary);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = "FLAG CORP".parse::<Section>().unwrap_err();
        assert!(matches!(err, BandError::InvalidSection(ref name) if name == "FLAG CORP"));
    }

    #[test]
    fn section_names_round_trip_through_display() {
        for section in Section::ALL {
            assert_eq!(section.to_string().parse::<Section>().unwrap(), section);
        }
    }

    #[test]
    fn uniform_summary_fills_missing_fields() {
        let descriptor = Descriptor::Uniform {
            coat_size: Some("40R".into()),
            pant_size: None,
            coat_number: Some("12".into()),
            pant_number: None,
        };
        assert_eq!(descriptor.summary(), "coat 40R (12) / pant - (-)");
    }
}

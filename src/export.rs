//! CSV reports for the band office: the roster, the compliance sheet with
//! eligibility, and one inventory sheet per resource kind.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use rusqlite::Connection;
use tracing::info;

use crate::db::{list_all, list_students};
use crate::eligibility::report;
use crate::models::{Descriptor, ResourceItem, ResourceKind, RosterEntry, StudentId};

pub const ROSTER_FILE_NAME: &str = "students.csv";
pub const COMPLIANCE_FILE_NAME: &str = "compliance_report.csv";

const ROSTER_HEADER: [&str; 7] = [
    "Student ID",
    "First",
    "Last",
    "Class",
    "Section",
    "Shirt",
    "Shoe",
];

const COMPLIANCE_HEADER: [&str; 10] = [
    "Student ID",
    "First",
    "Last",
    "Class",
    "Section",
    "Credits",
    "GPA",
    "Dues Paid",
    "Eligible",
    "Last Verified",
];

/// File name of the inventory sheet for `kind`.
pub fn inventory_file_name(kind: ResourceKind) -> String {
    format!("{}.csv", kind.table())
}

/// Roster in section / last name / first name order.
pub fn write_roster<W: Write>(conn: &Connection, out: W) -> Result<()> {
    let roster = list_students(conn).context("failed to load roster")?;
    let mut writer = Writer::from_writer(out);
    writer.write_record(ROSTER_HEADER)?;
    for RosterEntry { student, .. } in &roster {
        writer.write_record([
            student.id.to_string(),
            student.first_name.clone(),
            student.last_name.clone(),
            student.classification.clone(),
            student.section.to_string(),
            text(&student.shirt_size),
            text(&student.shoe_size),
        ])?;
    }
    writer.flush().context("failed to write roster")?;
    Ok(())
}

/// Compliance facts and the derived verdict, ineligible students first.
pub fn write_compliance<W: Write>(conn: &Connection, out: W) -> Result<()> {
    let roster = list_students(conn).context("failed to load roster")?;
    let mut writer = Writer::from_writer(out);
    writer.write_record(COMPLIANCE_HEADER)?;
    for row in report(roster) {
        let student = &row.entry.student;
        let compliance = &row.entry.compliance;
        writer.write_record([
            student.id.to_string(),
            student.first_name.clone(),
            student.last_name.clone(),
            student.classification.clone(),
            student.section.to_string(),
            compliance.credit_hours.to_string(),
            format!("{:.2}", compliance.gpa),
            yes_no(compliance.dues_paid).to_string(),
            yes_no(row.eligibility.eligible()).to_string(),
            compliance.last_verified.to_string(),
        ])?;
    }
    writer.flush().context("failed to write compliance report")?;
    Ok(())
}

/// Every item of one kind, checked-out items first. Holders are written by
/// name and student ID.
pub fn write_inventory<W: Write>(conn: &Connection, kind: ResourceKind, out: W) -> Result<()> {
    let items = list_all(conn, kind)
        .with_context(|| format!("failed to load {} inventory", kind.label()))?;
    let names: HashMap<StudentId, String> = list_students(conn)
        .context("failed to load roster")?
        .into_iter()
        .map(|entry| (entry.student.id, entry.student.display_name()))
        .collect();

    let mut writer = Writer::from_writer(out);
    writer.write_record(inventory_header(kind))?;
    for item in &items {
        let mut record = vec![item.id.to_string()];
        record.extend(descriptor_fields(&item.descriptor));
        record.push(text(&item.condition_notes));
        record.extend(slot_fields(item, &names));
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {} inventory", kind.label()))?;
    Ok(())
}

/// Write every report into `dir`, creating it when missing. Returns the files
/// written, roster first.
pub fn export_all(conn: &Connection, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let mut written = Vec::new();
    let roster_path = dir.join(ROSTER_FILE_NAME);
    write_roster(conn, create(&roster_path)?)?;
    written.push(roster_path);

    let compliance_path = dir.join(COMPLIANCE_FILE_NAME);
    write_compliance(conn, create(&compliance_path)?)?;
    written.push(compliance_path);

    for kind in ResourceKind::ALL {
        let path = dir.join(inventory_file_name(kind));
        write_inventory(conn, kind, create(&path)?)?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "exported reports");
    Ok(written)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn inventory_header(kind: ResourceKind) -> Vec<&'static str> {
    let mut header = vec!["ID"];
    header.extend_from_slice(match kind {
        ResourceKind::Instrument => &["Type", "Section", "Serial"][..],
        ResourceKind::Uniform => &["Coat", "Pant", "Coat #", "Pant #"][..],
        ResourceKind::Shako => &["Size"][..],
    });
    header.extend_from_slice(&["Condition", "Assigned To", "Date", "Available"]);
    header
}

fn descriptor_fields(descriptor: &Descriptor) -> Vec<String> {
    match descriptor {
        Descriptor::Instrument {
            instrument_type,
            serial,
        } => vec![
            instrument_type.name.clone(),
            instrument_type.section.to_string(),
            text(serial),
        ],
        Descriptor::Uniform {
            coat_size,
            pant_size,
            coat_number,
            pant_number,
        } => vec![
            text(coat_size),
            text(pant_size),
            text(coat_number),
            text(pant_number),
        ],
        Descriptor::Shako { size } => vec![text(size)],
    }
}

fn slot_fields(item: &ResourceItem, names: &HashMap<StudentId, String>) -> [String; 3] {
    let holder = match item.slot.checked_out_to {
        Some(id) => match names.get(&id) {
            Some(name) => format!("{name} ({id})"),
            None => id.to_string(),
        },
        None => String::new(),
    };
    let date = item
        .slot
        .checked_out_date
        .map(|date| date.to_string())
        .unwrap_or_default();
    [holder, date, yes_no(item.is_available()).to_string()]
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_headers_share_the_checkout_columns() {
        for kind in ResourceKind::ALL {
            let header = inventory_header(kind);
            assert_eq!(header[0], "ID");
            assert_eq!(
                &header[header.len() - 4..],
                &["Condition", "Assigned To", "Date", "Available"]
            );
        }
        assert_eq!(inventory_header(ResourceKind::Shako).len(), 6);
        assert_eq!(inventory_file_name(ResourceKind::Uniform), "uniforms.csv");
    }
}

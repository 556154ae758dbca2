use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{
    ComplianceUpdate, InstrumentType, NewItem, NewStudent, ResourceItem, ResourceKind,
    RosterEntry, Section, StudentId,
};

/// Highest credit-hour load the compliance form accepts.
pub(crate) const MAX_CREDIT_HOURS: u32 = 30;
/// GPA scale ceiling.
pub(crate) const MAX_GPA: f64 = 4.0;

/// Characters a field accepts while typing.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Digits,
    Decimal,
    Text,
}

#[derive(Clone)]
pub(crate) struct Field {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    input: Input,
    required: bool,
}

impl Field {
    fn required(label: &'static str, input: Input) -> Self {
        Self {
            label,
            value: String::new(),
            input,
            required: true,
        }
    }

    fn optional(label: &'static str, input: Input) -> Self {
        Self {
            required: false,
            ..Self::required(label, input)
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn accepts(&self, ch: char) -> bool {
        match self.input {
            Input::Digits => ch.is_ascii_digit(),
            Input::Decimal => ch.is_ascii_digit() || (ch == '.' && !self.value.contains('.')),
            Input::Text => !ch.is_control(),
        }
    }
}

/// Result of feeding one key to a form.
pub(crate) enum FormAction {
    Continue,
    Submit,
    Cancel,
}

/// A vertical list of labelled text fields with one focused entry. Every
/// modal form in the app is built from this.
#[derive(Clone)]
pub(crate) struct FieldForm {
    pub(crate) fields: Vec<Field>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl FieldForm {
    fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub(crate) fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Append a character to the focused field if its input kind allows it.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.fields.get_mut(self.active) {
            Some(field) if field.accepts(ch) => {
                field.value.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.trim())
            .unwrap_or("")
    }

    fn optional(&self, index: usize) -> Option<String> {
        let value = self.value(index);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn require(&self, index: usize) -> Result<&str> {
        let value = self.value(index);
        if value.is_empty() {
            let label = self.fields.get(index).map(|f| f.label).unwrap_or("Field");
            return Err(anyhow!("{label} is required."));
        }
        Ok(value)
    }

    /// Render every field as `Label: value`, highlighting the focused one.
    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let is_active = index == self.active;
                let display = if field.value.is_empty() {
                    if field.required { "<required>" } else { "<optional>" }.to_string()
                } else {
                    field.value.clone()
                };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else if field.value.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{}: ", field.label)),
                    Span::styled(display, style),
                ])
            })
            .collect()
    }

    /// Column and row offset of the cursor inside the form body.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        match self.fields.get(self.active) {
            Some(field) => (
                (field.label.chars().count() + 2 + field.value.chars().count()) as u16,
                self.active as u16,
            ),
            None => (0, 0),
        }
    }
}

/// Enrollment form for a new student.
pub(crate) struct StudentForm {
    pub(crate) form: FieldForm,
}

impl StudentForm {
    pub(crate) fn new() -> Self {
        Self {
            form: FieldForm::new(vec![
                Field::required("Student ID", Input::Digits),
                Field::required("First name", Input::Text),
                Field::required("Last name", Input::Text),
                Field::optional("Class", Input::Text),
                Field::required("Section", Input::Text),
                Field::optional("Shirt size", Input::Text),
                Field::optional("Shoe size", Input::Text),
            ]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<NewStudent> {
        let form = &self.form;
        let id = parse_student_id(form.require(0)?)?;
        let first_name = form.require(1)?.to_string();
        let last_name = form.require(2)?.to_string();
        let classification = form.value(3).to_string();
        let section = form
            .require(4)?
            .parse::<Section>()
            .context("Section must be WOODWIND, BRASS, PERCUSSION, AUXILIARY or DM.")?;
        Ok(NewStudent {
            id,
            first_name,
            last_name,
            classification,
            section,
            shirt_size: form.optional(5),
            shoe_size: form.optional(6),
        })
    }
}

/// Compliance editor, prefilled with the student's current facts.
pub(crate) struct ComplianceForm {
    pub(crate) student_id: StudentId,
    pub(crate) student_name: String,
    pub(crate) form: FieldForm,
}

impl ComplianceForm {
    pub(crate) fn from_entry(entry: &RosterEntry) -> Self {
        let compliance = &entry.compliance;
        Self {
            student_id: entry.student.id,
            student_name: entry.student.display_name(),
            form: FieldForm::new(vec![
                Field::required("Credit hours", Input::Digits)
                    .with_value(compliance.credit_hours.to_string()),
                Field::required("GPA", Input::Decimal).with_value(format!("{:.2}", compliance.gpa)),
                Field::required("Dues paid (y/n)", Input::Text)
                    .with_value(if compliance.dues_paid { "y" } else { "n" }),
            ]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<ComplianceUpdate> {
        Ok(ComplianceUpdate {
            credit_hours: parse_credit_hours(self.form.require(0)?)?,
            gpa: parse_gpa(self.form.require(1)?)?,
            dues_paid: parse_yes_no(self.form.require(2)?)?,
        })
    }
}

/// Inventory form. With `issue_to_student` set, an extra field names the
/// student who receives the new item right away.
pub(crate) struct ItemForm {
    pub(crate) kind: ResourceKind,
    pub(crate) issue_to_student: bool,
    pub(crate) form: FieldForm,
}

impl ItemForm {
    pub(crate) fn new(kind: ResourceKind, issue_to_student: bool) -> Self {
        let mut fields = match kind {
            ResourceKind::Instrument => vec![
                Field::required("Type (name or #)", Input::Text),
                Field::optional("Serial", Input::Text),
            ],
            ResourceKind::Uniform => vec![
                Field::optional("Coat size", Input::Text),
                Field::optional("Pant size", Input::Text),
                Field::optional("Coat number", Input::Text),
                Field::optional("Pant number", Input::Text),
            ],
            ResourceKind::Shako => vec![Field::optional("Size", Input::Text)],
        };
        fields.push(Field::optional("Condition notes", Input::Text));
        if issue_to_student {
            fields.push(Field::required("Student ID", Input::Digits));
        }
        Self {
            kind,
            issue_to_student,
            form: FieldForm::new(fields),
        }
    }

    /// Resolve the typed fields into an inventory item, its notes, and the
    /// receiving student when issuing.
    pub(crate) fn parse_inputs(
        &self,
        catalog: &[InstrumentType],
    ) -> Result<(NewItem, Option<String>, Option<StudentId>)> {
        let form = &self.form;
        let (item, notes_index) = match self.kind {
            ResourceKind::Instrument => {
                let instrument_type = resolve_instrument_type(form.require(0)?, catalog)?;
                (
                    NewItem::Instrument {
                        type_id: instrument_type.id,
                        serial: form.optional(1),
                    },
                    2,
                )
            }
            ResourceKind::Uniform => (
                NewItem::Uniform {
                    coat_size: form.optional(0),
                    pant_size: form.optional(1),
                    coat_number: form.optional(2),
                    pant_number: form.optional(3),
                },
                4,
            ),
            ResourceKind::Shako => (
                NewItem::Shako {
                    size: form.optional(0),
                },
                1,
            ),
        };

        let student_id = if self.issue_to_student {
            Some(parse_student_id(form.require(notes_index + 1)?)?)
        } else {
            None
        };

        Ok((item, form.optional(notes_index), student_id))
    }
}

/// Ask which student receives an existing item.
pub(crate) struct CheckoutForm {
    pub(crate) kind: ResourceKind,
    pub(crate) item: ResourceItem,
    pub(crate) form: FieldForm,
}

impl CheckoutForm {
    /// `borrower` prefills the student ID when the screen is focused on one.
    pub(crate) fn new(kind: ResourceKind, item: ResourceItem, borrower: Option<StudentId>) -> Self {
        let student_field = Field::required("Student ID", Input::Digits);
        let student_field = match borrower {
            Some(id) => student_field.with_value(id.to_string()),
            None => student_field,
        };
        Self {
            kind,
            item,
            form: FieldForm::new(vec![student_field]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<StudentId> {
        parse_student_id(self.form.require(0)?)
    }
}

/// Ask who is borrowing before picking an item for them.
pub(crate) struct BorrowerForm {
    pub(crate) form: FieldForm,
}

impl BorrowerForm {
    pub(crate) fn new() -> Self {
        Self {
            form: FieldForm::new(vec![Field::required("Student ID", Input::Digits)]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<StudentId> {
        parse_student_id(self.form.require(0)?)
    }
}

pub(crate) struct LeaderForm {
    pub(crate) form: FieldForm,
}

impl LeaderForm {
    pub(crate) fn new(section: Option<Section>) -> Self {
        let section_field = Field::required("Section", Input::Text);
        let section_field = match section {
            Some(section) => section_field.with_value(section.as_str()),
            None => section_field,
        };
        Self {
            form: FieldForm::new(vec![
                section_field,
                Field::required("Leader student ID", Input::Digits),
            ]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(Section, StudentId)> {
        let section = self
            .form
            .require(0)?
            .parse::<Section>()
            .context("Section must be WOODWIND, BRASS, PERCUSSION, AUXILIARY or DM.")?;
        let student_id = parse_student_id(self.form.require(1)?)?;
        Ok((section, student_id))
    }
}

/// Confirmation state before an item goes back to inventory.
pub(crate) struct ConfirmReturn {
    pub(crate) kind: ResourceKind,
    pub(crate) item: ResourceItem,
}

pub(crate) fn parse_student_id(raw: &str) -> Result<StudentId> {
    raw.trim()
        .parse::<StudentId>()
        .context("Student ID must be a whole number.")
}

pub(crate) fn parse_credit_hours(raw: &str) -> Result<u32> {
    let hours = raw
        .trim()
        .parse::<u32>()
        .context("Credit hours must be a whole number.")?;
    if hours > MAX_CREDIT_HOURS {
        return Err(anyhow!("Credit hours must be between 0 and {MAX_CREDIT_HOURS}."));
    }
    Ok(hours)
}

pub(crate) fn parse_gpa(raw: &str) -> Result<f64> {
    let gpa = raw
        .trim()
        .parse::<f64>()
        .context("GPA must be a number.")?;
    if !(0.0..=MAX_GPA).contains(&gpa) {
        return Err(anyhow!("GPA must be between 0.00 and 4.00."));
    }
    Ok(gpa)
}

pub(crate) fn parse_yes_no(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "1" => Ok(true),
        "n" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("Dues paid must be y or n.")),
    }
}

/// Match a catalog entry by its number or, case-insensitively, by name.
pub(crate) fn resolve_instrument_type(
    raw: &str,
    catalog: &[InstrumentType],
) -> Result<InstrumentType> {
    let raw = raw.trim();
    let found = match raw.parse::<i64>() {
        Ok(id) => catalog.iter().find(|t| t.id == id),
        Err(_) => catalog.iter().find(|t| t.name.eq_ignore_ascii_case(raw)),
    };
    found
        .cloned()
        .ok_or_else(|| anyhow!("Unknown instrument type '{raw}'."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<InstrumentType> {
        vec![
            InstrumentType {
                id: 1,
                name: "PICCOLO".into(),
                section: Section::Woodwind,
            },
            InstrumentType {
                id: 4,
                name: "TRUMPET".into(),
                section: Section::Brass,
            },
        ]
    }

    fn type_into(form: &mut FieldForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn credit_hours_are_bounded() {
        assert_eq!(parse_credit_hours("12").unwrap(), 12);
        assert_eq!(parse_credit_hours("0").unwrap(), 0);
        assert!(parse_credit_hours("31").is_err());
        assert!(parse_credit_hours("twelve").is_err());
    }

    #[test]
    fn gpa_is_bounded() {
        assert_eq!(parse_gpa("3.25").unwrap(), 3.25);
        assert_eq!(parse_gpa("4").unwrap(), 4.0);
        assert!(parse_gpa("4.01").is_err());
        assert!(parse_gpa("-1").is_err());
    }

    #[test]
    fn yes_no_accepts_console_style_answers() {
        assert!(parse_yes_no("Y").unwrap());
        assert!(parse_yes_no("1").unwrap());
        assert!(!parse_yes_no("no").unwrap());
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn instrument_type_resolves_by_name_or_number() {
        let catalog = catalog();
        assert_eq!(resolve_instrument_type("trumpet", &catalog).unwrap().id, 4);
        assert_eq!(resolve_instrument_type("1", &catalog).unwrap().name, "PICCOLO");
        assert!(resolve_instrument_type("KAZOO", &catalog).is_err());
    }

    fn spare_shako() -> ResourceItem {
        ResourceItem {
            id: 1,
            descriptor: crate::models::Descriptor::Shako { size: None },
            condition_notes: None,
            slot: Default::default(),
        }
    }

    #[test]
    fn digit_fields_reject_letters() {
        let mut form = CheckoutForm::new(ResourceKind::Shako, spare_shako(), None);
        assert!(!form.form.push_char('a'));
        assert!(form.form.push_char('7'));
        assert_eq!(form.parse_inputs().unwrap(), 7);
    }

    #[test]
    fn checkout_form_starts_with_the_chosen_borrower() {
        let form = CheckoutForm::new(ResourceKind::Shako, spare_shako(), Some(42));
        assert_eq!(form.form.fields[0].value, "42");
        assert_eq!(form.parse_inputs().unwrap(), 42);

        let mut borrower = BorrowerForm::new();
        assert!(borrower.parse_inputs().is_err());
        type_into(&mut borrower.form, "42");
        assert_eq!(borrower.parse_inputs().unwrap(), 42);
    }

    #[test]
    fn student_form_requires_a_known_section() {
        let mut student = StudentForm::new();
        let answers = ["101", "Ada", "Lovelace", "Senior", "tuba"];
        for answer in answers {
            type_into(&mut student.form, answer);
            student.form.next_field();
        }
        assert!(student.parse_inputs().is_err());

        student.form.active = 4;
        student.form.fields[4].value.clear();
        type_into(&mut student.form, "brass");
        let parsed = student.parse_inputs().unwrap();
        assert_eq!(parsed.id, 101);
        assert_eq!(parsed.section, Section::Brass);
        assert_eq!(parsed.shirt_size, None);
    }

    #[test]
    fn issue_form_reads_student_after_notes() {
        let mut item = ItemForm::new(ResourceKind::Instrument, true);
        type_into(&mut item.form, "trumpet");
        item.form.next_field();
        type_into(&mut item.form, "SN-1");
        item.form.next_field();
        item.form.next_field();
        type_into(&mut item.form, "202");

        let (new_item, notes, student) = item.parse_inputs(&catalog()).unwrap();
        assert_eq!(
            new_item,
            NewItem::Instrument {
                type_id: 4,
                serial: Some("SN-1".into())
            }
        );
        assert_eq!(notes, None);
        assert_eq!(student, Some(202));
    }
}

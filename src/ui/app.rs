use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::{debug, error, info};

use crate::db::{
    add_item, checkout, create_student, find_student, give_back, holdings, instrument_types, issue,
    leader_for, set_leader, student_record, update_compliance, Store,
};
use crate::eligibility::{is_eligible, Eligibility};
use crate::export::export_all;
use crate::models::{InstrumentType, ResourceItem, ResourceKind, RosterEntry, SectionLeader};

use super::forms::{
    BorrowerForm, CheckoutForm, ComplianceForm, ConfirmReturn, FieldForm, FormAction, ItemForm,
    LeaderForm, StudentForm,
};
use super::helpers::{centered_rect, criteria_spans, item_line, student_label, surface_error};
use super::screens::{EligibilityScreen, InventoryScreen, LeadersScreen, Listing, RosterScreen};

/// Tab titles, in Tab-key order.
const TABS: [&str; 6] = [
    "Students",
    "Instruments",
    "Uniforms",
    "Shakos",
    "Eligibility",
    "Leaders",
];
const TAB_BAR_HEIGHT: u16 = 2;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// The view behind the active tab.
enum Screen {
    Roster(RosterScreen),
    Inventory(InventoryScreen),
    Eligibility(EligibilityScreen),
    Leaders(LeadersScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    AddingStudent(StudentForm),
    EditingCompliance(ComplianceForm),
    AddingItem(ItemForm),
    ChoosingBorrower(BorrowerForm),
    CheckingOut(CheckoutForm),
    ConfirmReturn(ConfirmReturn),
    SettingLeader(LeaderForm),
    ViewingStudent(StudentDetail),
}

/// Everything shown in the student detail popup.
struct StudentDetail {
    entry: RosterEntry,
    holdings: Vec<ResourceItem>,
    section_leader: Option<SectionLeader>,
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: Store,
    tab: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    catalog: Vec<InstrumentType>,
    export_dir: PathBuf,
}

impl App {
    /// `export_dir` receives the CSV reports written with the `x` key.
    pub fn new(store: Store, export_dir: PathBuf) -> Result<Self> {
        let catalog =
            instrument_types(store.conn()).context("failed to load instrument catalog")?;
        let screen = Screen::Roster(RosterScreen::load(store.conn())?);
        Ok(Self {
            store,
            tab: 0,
            screen,
            mode: Mode::Normal,
            status: None,
            catalog,
            export_dir,
        })
    }

    /// Hand the store back so the caller can close it.
    pub fn into_store(self) -> Store {
        self.store
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingStudent(form) => self.handle_add_student(code, form)?,
            Mode::EditingCompliance(form) => self.handle_edit_compliance(code, form)?,
            Mode::AddingItem(form) => self.handle_add_item(code, form)?,
            Mode::ChoosingBorrower(form) => self.handle_choose_borrower(code, form)?,
            Mode::CheckingOut(form) => self.handle_checkout(code, form)?,
            Mode::ConfirmReturn(confirm) => self.handle_confirm_return(code, confirm)?,
            Mode::SettingLeader(form) => self.handle_set_leader(code, form)?,
            Mode::ViewingStudent(detail) => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
                KeyCode::Char('c') => {
                    Mode::EditingCompliance(ComplianceForm::from_entry(&detail.entry))
                }
                _ => Mode::ViewingStudent(detail),
            },
        };

        Ok(exit)
    }

    /// Reload the active screen, reporting failures in the footer.
    pub fn refresh(&mut self) {
        match self.reload_screen() {
            Ok(()) => self.set_status("Refreshed.", StatusKind::Info),
            Err(err) => {
                error!(error = %err, "refresh failed");
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.open_tab((self.tab + 1) % TABS.len())?;
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.open_tab((self.tab + TABS.len() - 1) % TABS.len())?;
                return Ok(Mode::Normal);
            }
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.export_reports();
                return Ok(Mode::Normal);
            }
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home
            | KeyCode::End => {
                self.navigate(code);
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match &mut self.screen {
            Screen::Roster(roster) => match code {
                KeyCode::Char('+') => {
                    self.clear_status();
                    return Ok(Mode::AddingStudent(StudentForm::new()));
                }
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    if let Some(entry) = roster.listing.current() {
                        let form = ComplianceForm::from_entry(entry);
                        self.clear_status();
                        return Ok(Mode::EditingCompliance(form));
                    }
                    self.set_status("No student selected.", StatusKind::Error);
                }
                KeyCode::Enter => {
                    if let Some(id) = roster.listing.current().map(|e| e.student.id) {
                        return self.open_student_detail(id);
                    }
                    self.set_status("No student selected.", StatusKind::Error);
                }
                _ => {}
            },
            Screen::Eligibility(eligibility) => match code {
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    if let Some(row) = eligibility.listing.current() {
                        let form = ComplianceForm::from_entry(&row.entry);
                        self.clear_status();
                        return Ok(Mode::EditingCompliance(form));
                    }
                }
                KeyCode::Enter => {
                    if let Some(id) = eligibility.listing.current().map(|r| r.entry.student.id) {
                        return self.open_student_detail(id);
                    }
                }
                _ => {}
            },
            Screen::Leaders(leaders) => {
                if code == KeyCode::Char('+') {
                    let section = leaders.listing.current().map(|l| l.section);
                    self.clear_status();
                    return Ok(Mode::SettingLeader(LeaderForm::new(section)));
                }
            }
            Screen::Inventory(inventory) => {
                let kind = inventory.kind;
                match code {
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingItem(ItemForm::new(kind, false)));
                    }
                    KeyCode::Char('i') | KeyCode::Char('I') => {
                        self.clear_status();
                        return Ok(Mode::AddingItem(ItemForm::new(kind, true)));
                    }
                    KeyCode::Char('f') | KeyCode::Char('F') => {
                        self.clear_status();
                        return Ok(Mode::ChoosingBorrower(BorrowerForm::new()));
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => match inventory.listing.current() {
                        Some(item) if item.is_available() => {
                            let borrower = inventory.borrower.as_ref().map(|s| s.id);
                            let form = CheckoutForm::new(kind, item.clone(), borrower);
                            self.clear_status();
                            return Ok(Mode::CheckingOut(form));
                        }
                        Some(item) => {
                            let text = format!("{kind} {} is already checked out.", item.id);
                            self.set_status(text, StatusKind::Error);
                        }
                        None => self.set_status("No item selected.", StatusKind::Error),
                    },
                    KeyCode::Char('r') | KeyCode::Char('R') => match inventory.listing.current() {
                        Some(item) if !item.is_available() => {
                            let confirm = ConfirmReturn {
                                kind,
                                item: item.clone(),
                            };
                            self.clear_status();
                            return Ok(Mode::ConfirmReturn(confirm));
                        }
                        Some(item) => {
                            let text = format!("{kind} {} is not checked out.", item.id);
                            self.set_status(text, StatusKind::Error);
                        }
                        None => self.set_status("No item selected.", StatusKind::Error),
                    },
                    KeyCode::Char('v') | KeyCode::Char('V') => {
                        inventory.cycle_view(self.store.conn())?;
                        self.clear_status();
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        if kind == ResourceKind::Instrument {
                            inventory.cycle_section(self.store.conn())?;
                            self.clear_status();
                        } else {
                            debug!(%kind, "section filter ignored");
                            let text = format!("{}s are not grouped by section.", kind.label());
                            self.set_status(text, StatusKind::Error);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Mode::Normal)
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::AddingStudent(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let outcome = form.parse_inputs().and_then(|new| {
                    create_student(self.store.conn(), &new).context("failed to enroll student")
                });
                match outcome {
                    Ok(student) => {
                        self.reload_screen()?;
                        self.set_status(
                            format!("Enrolled {} ({}).", student.display_name(), student.id),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::AddingStudent(form))
                    }
                }
            }
        }
    }

    fn handle_edit_compliance(&mut self, code: KeyCode, mut form: ComplianceForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::EditingCompliance(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let outcome = form.parse_inputs().and_then(|update| {
                    update_compliance(self.store.conn(), form.student_id, &update)
                        .context("failed to update compliance")
                });
                match outcome {
                    Ok(record) => {
                        self.reload_screen()?;
                        let verdict = if is_eligible(&record) {
                            "eligible"
                        } else {
                            "not eligible"
                        };
                        self.set_status(
                            format!("Updated {}: {verdict}.", form.student_name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::EditingCompliance(form))
                    }
                }
            }
        }
    }

    fn handle_add_item(&mut self, code: KeyCode, mut form: ItemForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::AddingItem(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let conn = self.store.conn();
                let outcome = form.parse_inputs(&self.catalog).and_then(|(item, notes, student)| {
                    let notes = notes.as_deref();
                    match student {
                        Some(student_id) => issue(conn, &item, notes, student_id)
                            .context("failed to issue item"),
                        None => add_item(conn, &item, notes).context("failed to add item"),
                    }
                });
                match outcome {
                    Ok(item) => {
                        self.reload_screen()?;
                        let text = match item.slot.checked_out_to {
                            Some(holder) => format!(
                                "Issued {} {} to student {holder}.",
                                item.kind(),
                                item.id
                            ),
                            None => format!("Added {} {}.", item.kind(), item.id),
                        };
                        self.set_status(text, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::AddingItem(form))
                    }
                }
            }
        }
    }

    fn handle_checkout(&mut self, code: KeyCode, mut form: CheckoutForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::CheckingOut(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let outcome = form.parse_inputs().and_then(|student_id| {
                    checkout(self.store.conn(), form.kind, form.item.id, student_id)
                        .context("checkout failed")
                });
                match outcome {
                    Ok(item) => {
                        if let Screen::Inventory(inventory) = &mut self.screen {
                            inventory.borrower = None;
                        }
                        self.reload_screen()?;
                        let holder = item.slot.checked_out_to.unwrap_or_default();
                        self.set_status(
                            format!("Checked out {} {} to student {holder}.", form.kind, item.id),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::CheckingOut(form))
                    }
                }
            }
        }
    }

    fn handle_choose_borrower(&mut self, code: KeyCode, mut form: BorrowerForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::ChoosingBorrower(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let conn = self.store.conn();
                let outcome = form.parse_inputs().and_then(|student_id| {
                    find_student(conn, student_id).context("failed to load student")
                });
                match outcome {
                    Ok(student) => {
                        let text = format!(
                            "Showing what {} can check out. Press o on an item.",
                            student.display_name()
                        );
                        if let Screen::Inventory(inventory) = &mut self.screen {
                            inventory.focus_on(conn, student)?;
                        }
                        self.set_status(text, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::ChoosingBorrower(form))
                    }
                }
            }
        }
    }

    fn handle_confirm_return(&mut self, code: KeyCode, confirm: ConfirmReturn) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match give_back(self.store.conn(), confirm.kind, confirm.item.id) {
                    Ok(item) => {
                        self.set_status(
                            format!("Returned {} {}.", confirm.kind, item.id),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        let err = anyhow::Error::from(err);
                        self.set_status(surface_error(&err), StatusKind::Error);
                    }
                }
                self.reload_screen()?;
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Return cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmReturn(confirm)),
        }
    }

    fn handle_set_leader(&mut self, code: KeyCode, mut form: LeaderForm) -> Result<Mode> {
        match form_action(&mut form.form, code) {
            FormAction::Continue => Ok(Mode::SettingLeader(form)),
            FormAction::Cancel => Ok(Mode::Normal),
            FormAction::Submit => {
                let outcome = form.parse_inputs().and_then(|(section, student_id)| {
                    set_leader(self.store.conn(), section, student_id)
                        .context("failed to assign section leader")?;
                    Ok(section)
                });
                match outcome {
                    Ok(section) => {
                        self.reload_screen()?;
                        self.set_status(format!("{section} leader updated."), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.form.error = Some(surface_error(&err));
                        Ok(Mode::SettingLeader(form))
                    }
                }
            }
        }
    }

    /// Write every CSV report, reporting the outcome in the footer.
    fn export_reports(&mut self) {
        match export_all(self.store.conn(), &self.export_dir) {
            Ok(written) => {
                info!(files = written.len(), "reports exported from the TUI");
                let text = format!(
                    "Exported {} reports to {}.",
                    written.len(),
                    self.export_dir.display()
                );
                self.set_status(text, StatusKind::Info);
            }
            Err(err) => {
                error!(error = %err, "export failed");
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    fn open_student_detail(&mut self, student_id: i64) -> Result<Mode> {
        let conn = self.store.conn();
        let entry = student_record(conn, student_id).context("failed to load student")?;
        let holdings = holdings(conn, student_id).context("failed to load holdings")?;
        let section_leader =
            leader_for(conn, entry.student.section).context("failed to load section leader")?;
        self.clear_status();
        Ok(Mode::ViewingStudent(StudentDetail {
            entry,
            holdings,
            section_leader,
        }))
    }

    fn open_tab(&mut self, tab: usize) -> Result<()> {
        self.screen = self.load_screen(tab)?;
        self.tab = tab;
        self.clear_status();
        Ok(())
    }

    fn load_screen(&self, tab: usize) -> Result<Screen> {
        let conn = self.store.conn();
        let screen = match tab {
            0 => Screen::Roster(RosterScreen::load(conn)?),
            1 => Screen::Inventory(InventoryScreen::load(conn, ResourceKind::Instrument)?),
            2 => Screen::Inventory(InventoryScreen::load(conn, ResourceKind::Uniform)?),
            3 => Screen::Inventory(InventoryScreen::load(conn, ResourceKind::Shako)?),
            4 => Screen::Eligibility(EligibilityScreen::load(conn)?),
            _ => Screen::Leaders(LeadersScreen::load(conn)?),
        };
        Ok(screen)
    }

    /// Re-read the active screen after a write, keeping filters and cursor.
    fn reload_screen(&mut self) -> Result<()> {
        let conn = self.store.conn();
        match &mut self.screen {
            Screen::Roster(roster) => roster.reload(conn),
            Screen::Inventory(inventory) => inventory.reload(conn),
            Screen::Eligibility(eligibility) => {
                let selected = eligibility.listing.selected;
                *eligibility = EligibilityScreen::load(conn)?;
                eligibility.listing.move_selection(selected as isize);
                Ok(())
            }
            Screen::Leaders(leaders) => {
                let selected = leaders.listing.selected;
                *leaders = LeadersScreen::load(conn)?;
                leaders.listing.move_selection(selected as isize);
                Ok(())
            }
        }
    }

    fn navigate(&mut self, code: KeyCode) {
        match &mut self.screen {
            Screen::Roster(s) => move_cursor(&mut s.listing, code),
            Screen::Inventory(s) => move_cursor(&mut s.listing, code),
            Screen::Eligibility(s) => move_cursor(&mut s.listing, code),
            Screen::Leaders(s) => move_cursor(&mut s.listing, code),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        if area.height <= TAB_BAR_HEIGHT + FOOTER_HEIGHT {
            self.draw_footer(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let tabs = Tabs::new(TABS)
            .select(self.tab)
            .block(Block::default().borders(Borders::BOTTOM))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        match &self.screen {
            Screen::Roster(roster) => self.draw_roster(frame, chunks[1], roster),
            Screen::Inventory(inventory) => self.draw_inventory(frame, chunks[1], inventory),
            Screen::Eligibility(report) => self.draw_eligibility(frame, chunks[1], report),
            Screen::Leaders(leaders) => self.draw_leaders(frame, chunks[1], leaders),
        }

        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::AddingStudent(form) => self.draw_form(frame, area, "Enroll Student", &form.form),
            Mode::EditingCompliance(form) => {
                let title = format!("Compliance: {}", form.student_name);
                self.draw_form(frame, area, &title, &form.form)
            }
            Mode::AddingItem(form) => {
                let verb = if form.issue_to_student { "Issue" } else { "Add" };
                let title = format!("{verb} {}", form.kind.label());
                self.draw_form(frame, area, &title, &form.form)
            }
            Mode::ChoosingBorrower(form) => {
                self.draw_form(frame, area, "Check out for student", &form.form)
            }
            Mode::CheckingOut(form) => {
                let title = format!(
                    "Check out {} {} ({})",
                    form.kind.label(),
                    form.item.id,
                    form.item.descriptor.summary()
                );
                self.draw_form(frame, area, &title, &form.form)
            }
            Mode::ConfirmReturn(confirm) => self.draw_confirm_return(frame, area, confirm),
            Mode::SettingLeader(form) => {
                self.draw_form(frame, area, "Assign Section Leader", &form.form)
            }
            Mode::ViewingStudent(detail) => self.draw_student_detail(frame, area, detail),
        }
    }

    fn draw_roster(&self, frame: &mut Frame, area: Rect, roster: &RosterScreen) {
        let items = roster
            .listing
            .items
            .iter()
            .map(|entry| {
                let compliance = &entry.compliance;
                ListItem::new(Line::from(vec![
                    Span::raw(student_label(&entry.student)),
                    Span::styled(
                        format!(
                            "  {}h  {:.2}  {}",
                            compliance.credit_hours,
                            compliance.gpa,
                            if compliance.dues_paid { "paid" } else { "unpaid" }
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();
        let title = format!("Roster ({} students)", roster.listing.items.len());
        draw_list(
            frame,
            area,
            &title,
            items,
            &roster.listing,
            "No students enrolled yet. Press + to add one.",
        );
    }

    fn draw_inventory(&self, frame: &mut Frame, area: Rect, inventory: &InventoryScreen) {
        let items = inventory
            .listing
            .items
            .iter()
            .map(|item| ListItem::new(item_line(item)))
            .collect();
        draw_list(
            frame,
            area,
            &inventory.title(),
            items,
            &inventory.listing,
            "Nothing to show. Press + to add an item or v to change the view.",
        );
    }

    fn draw_eligibility(&self, frame: &mut Frame, area: Rect, report: &EligibilityScreen) {
        let items = report
            .listing
            .items
            .iter()
            .map(|row| {
                let (verdict, color) = if row.eligibility.eligible() {
                    ("ELIGIBLE  ", Color::Green)
                } else {
                    ("INELIGIBLE", Color::Red)
                };
                let mut spans = vec![
                    Span::styled(verdict, Style::default().fg(color)),
                    Span::raw("  "),
                    Span::raw(student_label(&row.entry.student)),
                ];
                spans.extend(criteria_spans(&row.eligibility));
                ListItem::new(Line::from(spans))
            })
            .collect();
        let title = format!("Eligibility ({} ineligible)", report.ineligible_count());
        draw_list(
            frame,
            area,
            &title,
            items,
            &report.listing,
            "No students enrolled yet.",
        );
    }

    fn draw_leaders(&self, frame: &mut Frame, area: Rect, leaders: &LeadersScreen) {
        let items = leaders
            .listing
            .items
            .iter()
            .map(|leader| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<11}", leader.section.as_str()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(format!("{} ({})", leader.leader_name, leader.student_id)),
                ]))
            })
            .collect();
        draw_list(
            frame,
            area,
            "Section Leaders",
            items,
            &leaders.listing,
            "No section leaders assigned. Press + to assign one.",
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(status) => Line::from(Span::styled(status.text.clone(), status.kind.style())),
            None => Line::from(""),
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, &self.screen) {
            (Mode::ConfirmReturn(_), _) => &[("[y]", "Return"), ("[n]", "Keep")],
            (Mode::ViewingStudent(_), _) => &[("[c]", "Compliance"), ("[Esc]", "Close")],
            (Mode::Normal, Screen::Roster(_)) => &[
                ("[Tab]", "Next tab"),
                ("[+]", "Enroll"),
                ("[c]", "Compliance"),
                ("[Enter]", "Details"),
                ("[x]", "Export"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Screen::Inventory(_)) => &[
                ("[Tab]", "Next tab"),
                ("[+]", "Add"),
                ("[i]", "Issue new"),
                ("[f]", "For student"),
                ("[o]", "Check out"),
                ("[r]", "Return"),
                ("[v]", "View"),
                ("[s]", "Section"),
                ("[x]", "Export"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Screen::Eligibility(_)) => &[
                ("[Tab]", "Next tab"),
                ("[c]", "Compliance"),
                ("[Enter]", "Details"),
                ("[x]", "Export"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Screen::Leaders(_)) => &[
                ("[Tab]", "Next tab"),
                ("[+]", "Assign"),
                ("[x]", "Export"),
                ("[q]", "Quit"),
            ],
            _ => &[
                ("[Enter]", "Save"),
                ("[Tab]", "Next field"),
                ("[Esc]", "Cancel"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &FieldForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        match &form.error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Enter to save, Tab to switch fields, Esc to cancel",
                Style::default().fg(Color::Gray),
            ))),
        }
        frame.render_widget(Paragraph::new(lines), inner);

        let (dx, dy) = form.cursor_offset();
        frame.set_cursor_position((
            (inner.x + dx).min(inner.right().saturating_sub(1)),
            inner.y + dy,
        ));
    }

    fn draw_confirm_return(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmReturn) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Return {}", confirm.kind.label()))
            .borders(Borders::ALL);
        let holder = confirm
            .item
            .slot
            .checked_out_to
            .map(|id| format!("student {id}"))
            .unwrap_or_else(|| "nobody".to_string());
        let lines = vec![
            Line::from(format!(
                "Return #{} ({}) from {holder}?",
                confirm.item.id,
                confirm.item.descriptor.summary()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y to confirm, n to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_student_detail(&self, frame: &mut Frame, area: Rect, detail: &StudentDetail) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let student = &detail.entry.student;
        let compliance = &detail.entry.compliance;
        let eligibility = Eligibility::of(compliance);
        let label = Style::default().fg(Color::Cyan);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Section: ", label),
                Span::raw(format!("{}   ", student.section)),
                Span::styled("Class: ", label),
                Span::raw(student.classification.clone()),
            ]),
            Line::from(vec![
                Span::styled("Shirt: ", label),
                Span::raw(format!("{}   ", student.shirt_size.as_deref().unwrap_or("-"))),
                Span::styled("Shoe: ", label),
                Span::raw(student.shoe_size.as_deref().unwrap_or("-").to_string()),
            ]),
            Line::from(vec![
                Span::styled("Compliance: ", label),
                Span::raw(format!(
                    "{} hours, GPA {:.2}, dues {}, verified {}",
                    compliance.credit_hours,
                    compliance.gpa,
                    if compliance.dues_paid { "paid" } else { "unpaid" },
                    compliance.last_verified
                )),
            ]),
        ];

        let mut verdict = vec![Span::styled("Eligible: ", label)];
        verdict.push(if eligibility.eligible() {
            Span::styled("yes ", Style::default().fg(Color::Green))
        } else {
            Span::styled("no ", Style::default().fg(Color::Red))
        });
        verdict.extend(criteria_spans(&eligibility));
        lines.push(Line::from(verdict));

        let leader = match &detail.section_leader {
            Some(leader) if leader.student_id == student.id => "this student".to_string(),
            Some(leader) => format!("{} ({})", leader.leader_name, leader.student_id),
            None => "none".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled("Section leader: ", label),
            Span::raw(leader),
        ]));

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Holding:", label)));
        if detail.holdings.is_empty() {
            lines.push(Line::from(Span::styled(
                "  nothing checked out",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for item in &detail.holdings {
            lines.push(Line::from(format!(
                "  {:<11}#{} {}",
                item.kind().label(),
                item.id,
                item.descriptor.summary()
            )));
        }

        let block = Block::default()
            .title(format!("{} ({})", student.display_name(), student.id))
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }
}

fn form_action(form: &mut FieldForm, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => {
            form.error = None;
            return FormAction::Submit;
        }
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => {
            form.push_char(ch);
        }
        _ => {}
    }
    FormAction::Continue
}

fn move_cursor<T>(listing: &mut Listing<T>, code: KeyCode) {
    match code {
        KeyCode::Up => listing.move_selection(-1),
        KeyCode::Down => listing.move_selection(1),
        KeyCode::PageUp => listing.move_selection(-10),
        KeyCode::PageDown => listing.move_selection(10),
        KeyCode::Home => listing.select_first(),
        KeyCode::End => listing.select_last(),
        _ => {}
    }
}

fn draw_list<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem<'static>>,
    listing: &Listing<T>,
    empty_text: &str,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL);

    if items.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            empty_text.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(listing.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

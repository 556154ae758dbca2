use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{list_all, list_available, list_checked_out, list_leaders, list_students};
use crate::eligibility::{report, EligibilityRow};
use crate::models::{
    Descriptor, ResourceItem, ResourceKind, RosterEntry, Section, SectionLeader, Student,
};

/// Rows of one list view plus the highlighted index.
pub(crate) struct Listing<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> Listing<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Swap in fresh rows, keeping the cursor where it was when possible.
    pub(crate) fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.select_last();
        }
    }
}

pub(crate) struct RosterScreen {
    pub(crate) listing: Listing<RosterEntry>,
}

impl RosterScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let roster = list_students(conn).context("failed to load roster")?;
        Ok(Self {
            listing: Listing::new(roster),
        })
    }

    pub(crate) fn reload(&mut self, conn: &Connection) -> Result<()> {
        let roster = list_students(conn).context("failed to load roster")?;
        self.listing.replace(roster);
        Ok(())
    }
}

/// Which slice of an inventory table the screen shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum InventoryView {
    All,
    Available,
    CheckedOut,
}

impl InventoryView {
    pub(crate) fn next(self) -> Self {
        match self {
            InventoryView::All => InventoryView::Available,
            InventoryView::Available => InventoryView::CheckedOut,
            InventoryView::CheckedOut => InventoryView::All,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            InventoryView::All => "all",
            InventoryView::Available => "available",
            InventoryView::CheckedOut => "checked out",
        }
    }
}

pub(crate) struct InventoryScreen {
    pub(crate) kind: ResourceKind,
    pub(crate) view: InventoryView,
    /// Instrument section filter. Uniforms and shakos have no section.
    pub(crate) section: Option<Section>,
    /// Student the operator is picking an item for, if any.
    pub(crate) borrower: Option<Student>,
    pub(crate) listing: Listing<ResourceItem>,
}

impl InventoryScreen {
    pub(crate) fn load(conn: &Connection, kind: ResourceKind) -> Result<Self> {
        let mut screen = Self {
            kind,
            view: InventoryView::All,
            section: None,
            borrower: None,
            listing: Listing::new(Vec::new()),
        };
        screen.reload(conn)?;
        Ok(screen)
    }

    pub(crate) fn reload(&mut self, conn: &Connection) -> Result<()> {
        let items = match self.view {
            InventoryView::Available => list_available(conn, self.kind, self.section),
            InventoryView::All => list_all(conn, self.kind),
            InventoryView::CheckedOut => list_checked_out(conn, self.kind),
        }
        .with_context(|| format!("failed to load {} inventory", self.kind.label()))?;

        let items = match (self.view, self.section) {
            (InventoryView::Available, _) | (_, None) => items,
            (_, Some(section)) => items
                .into_iter()
                .filter(|item| in_section(item, section))
                .collect(),
        };
        self.listing.replace(items);
        Ok(())
    }

    pub(crate) fn cycle_view(&mut self, conn: &Connection) -> Result<()> {
        self.view = self.view.next();
        self.listing.select_first();
        self.reload(conn)
    }

    /// Step through no filter, then each section in turn, then back.
    pub(crate) fn cycle_section(&mut self, conn: &Connection) -> Result<()> {
        self.section = match self.section {
            None => Some(Section::ALL[0]),
            Some(current) => Section::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|i| Section::ALL.get(i + 1).copied()),
        };
        self.listing.select_first();
        self.reload(conn)
    }

    /// Narrow the list to what `student` can take: available items, and for
    /// instruments only those of the student's own section.
    pub(crate) fn focus_on(&mut self, conn: &Connection, student: Student) -> Result<()> {
        self.view = InventoryView::Available;
        if self.kind == ResourceKind::Instrument {
            self.section = Some(student.section);
        }
        self.borrower = Some(student);
        self.listing.select_first();
        self.reload(conn)
    }

    pub(crate) fn title(&self) -> String {
        let mut title = format!("{}s ({})", capitalize(self.kind.label()), self.view.label());
        if let Some(section) = self.section {
            title.push_str(&format!(" [{section}]"));
        }
        if let Some(student) = &self.borrower {
            title.push_str(&format!(" for {}", student.display_name()));
        }
        title
    }
}

fn in_section(item: &ResourceItem, section: Section) -> bool {
    match &item.descriptor {
        Descriptor::Instrument {
            instrument_type, ..
        } => instrument_type.section == section,
        _ => true,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) struct EligibilityScreen {
    pub(crate) listing: Listing<EligibilityRow>,
}

impl EligibilityScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let roster = list_students(conn).context("failed to load roster")?;
        Ok(Self {
            listing: Listing::new(report(roster)),
        })
    }

    pub(crate) fn ineligible_count(&self) -> usize {
        self.listing
            .items
            .iter()
            .filter(|row| !row.eligibility.eligible())
            .count()
    }
}

pub(crate) struct LeadersScreen {
    pub(crate) listing: Listing<SectionLeader>,
}

impl LeadersScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let leaders = list_leaders(conn).context("failed to load section leaders")?;
        Ok(Self {
            listing: Listing::new(leaders),
        })
    }
}

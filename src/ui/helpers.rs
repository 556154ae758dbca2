use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::eligibility::Eligibility;
use crate::models::{ResourceItem, Student};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// `#id  summary  -> holder (date)` for inventory rows.
pub(crate) fn item_line(item: &ResourceItem) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("#{:<5}", item.id), Style::default().fg(Color::Cyan)),
        Span::raw(item.descriptor.summary()),
    ];
    match (item.slot.checked_out_to, item.slot.checked_out_date) {
        (Some(holder), date) => {
            let since = date.map(|d| format!(" since {d}")).unwrap_or_default();
            spans.push(Span::styled(
                format!("  -> student {holder}{since}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        _ => spans.push(Span::styled("  available", Style::default().fg(Color::Green))),
    }
    if let Some(notes) = &item.condition_notes {
        spans.push(Span::styled(
            format!("  ({notes})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

pub(crate) fn student_label(student: &Student) -> String {
    format!(
        "{:>8}  {:<28} {:<11} {}",
        student.id,
        student.display_name(),
        student.section.as_str(),
        student.classification
    )
}

/// Marks for the three criteria, green when met and red when missing.
pub(crate) fn criteria_spans(eligibility: &Eligibility) -> Vec<Span<'static>> {
    let mark = |label: &'static str, ok: bool| {
        let color = if ok { Color::Green } else { Color::Red };
        Span::styled(format!(" {label}"), Style::default().fg(color))
    };
    vec![
        mark("hours", eligibility.hours_ok),
        mark("gpa", eligibility.gpa_ok),
        mark("dues", eligibility.dues_ok),
    ]
}

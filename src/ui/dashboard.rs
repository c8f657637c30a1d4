//! Dashboard view rendering.
//!
//! Shows the latest diagnosis per machine, with a machine's history listed
//! beneath it when expanded.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::common;
use crate::app::{App, Chip};
use crate::data::dates::format_timestamp;
use crate::data::DiagnosisRow;

/// Render the Dashboard view: filter bar above the diagnosis table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).split(area);

    let page = &app.dashboard;
    let chips: Vec<(String, bool)> = page
        .chips()
        .into_iter()
        .map(|chip| {
            let on = page.chip_enabled(&chip);
            let label = match chip {
                Chip::Machine(m) => m,
                Chip::Fault(f) => f.label().to_string(),
            };
            (label, on)
        })
        .collect();
    common::render_filter_bar(frame, app, chunks[0], &chips, page.chip_index);

    let rows = page.rows();
    if rows.is_empty() {
        common::render_empty(frame, app, chunks[1], "Diagnoses");
        return;
    }

    let header = Row::new(vec![
        Cell::from("Machine"),
        Cell::from("Detected"),
        Cell::from("Status"),
        Cell::from("Fault type"),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows.iter().map(|row| render_row(app, row)).collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(19),
        Constraint::Length(8),
        Constraint::Fill(2),
    ];

    let selected = page.selected.min(rows.len().saturating_sub(1));
    let latest = rows.iter().filter(|r| r.is_latest()).count();
    let title = format!(
        " Diagnoses ({} machines, {} rows) [{}/{}] ",
        latest,
        rows.len(),
        selected + 1,
        rows.len()
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default()
        .with_offset(page.offset)
        .with_selected(Some(selected));

    frame.render_stateful_widget(table, chunks[1], &mut state);

    // Kept so mouse clicks can map screen rows back to table rows
    app.dashboard.offset = state.offset();
}

fn render_row<'a>(app: &App, row: &DiagnosisRow<'a>) -> Row<'a> {
    let record = row.record;
    let fault_style = app.theme.fault_style(record.fault_type);

    let machine = if row.is_latest() {
        let marker = if app.dashboard.filter.is_expanded(&record.machine_name) {
            "▾"
        } else {
            "▸"
        };
        format!("{} {}", marker, record.machine_name)
    } else {
        format!("    {}", record.machine_name)
    };

    let status = if record.fault_type.is_fault() { "Fault" } else { "Normal" };

    let row_style = if row.is_latest() {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    Row::new(vec![
        Cell::from(machine),
        Cell::from(format_timestamp(&record.detected_at)),
        Cell::from(status).style(fault_style),
        Cell::from(record.fault_type.label()).style(fault_style),
    ])
    .style(row_style)
}

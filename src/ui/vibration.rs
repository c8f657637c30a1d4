//! Vibration view rendering.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::common;
use crate::app::App;
use crate::data::dates::format_timestamp;
use crate::data::vibration::machine_tint;

/// Render the Vibration view: machine/sensor selections above the measurements table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).split(area);

    let page = &app.vibration;
    let chips = vec![
        (format!("m machine: {}", page.filter.machine.label()), true),
        (format!("n sensor: {}", page.filter.sensor.label()), true),
    ];
    common::render_filter_bar(frame, app, chunks[0], &chips, usize::MAX);

    let rows = page.rows();
    if rows.is_empty() {
        common::render_empty(frame, app, chunks[1], "Vibration");
        return;
    }

    let header = Row::new(vec![
        Cell::from("Machine"),
        Cell::from("Sensor"),
        Cell::from("Collected"),
        Cell::from("Measured"),
        Cell::from("Normal"),
        Cell::from("Unbalance"),
        Cell::from("Looseness"),
        Cell::from("Unb+Loose"),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.machine_name.clone()),
                Cell::from(r.sensor_no.clone()),
                Cell::from(format_timestamp(&r.collected_at)),
                Cell::from(format!("{:.2}", r.measured_time)),
                Cell::from(format!("{:.3}", r.normal)),
                Cell::from(format!("{:.3}", r.unbalance)),
                Cell::from(format!("{:.3}", r.looseness)),
                Cell::from(format!("{:.3}", r.unbalance_looseness)),
            ])
            .style(app.theme.tint_style(machine_tint(&r.machine_name)))
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Length(19),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
    ];

    let selected = page.selected.min(rows.len().saturating_sub(1));
    let title = format!(
        " Measurements ({}/{}) [{}/{}] ",
        rows.len(),
        page.records.len(),
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
    app.vibration.offset = state.offset();
}

//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, filter bar, status bar,
//! and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, DateField, FetchState, View};
use crate::data::{FaultCounts, FaultType};

/// Render the header bar with the machine fault overview.
///
/// On the dashboard, counts come from the latest row of each visible machine.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" VIBRATION DOCTOR ", Style::default().add_modifier(Modifier::BOLD));

    let mut spans = vec![title, Span::raw("│ ")];
    match app.current_view {
        View::Dashboard => {
            let counts = FaultCounts::from_latest(&app.dashboard.rows());
            let faulty = counts.faulty();
            let icon_style = if faulty > 0 {
                app.theme.fault_style(FaultType::CombinedFault)
            } else {
                app.theme.fault_style(FaultType::Normal)
            };
            spans.push(Span::styled(format!("{}", faulty), icon_style));
            spans.push(Span::raw(format!(" faulty / {} machines │ ", counts.total())));
            for fault in FaultType::ALL {
                let n = counts.get(fault);
                let style = if n > 0 {
                    app.theme.fault_style(fault)
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                spans.push(Span::styled(format!("{}", n), style));
                spans.push(Span::raw(format!(" {} ", fault.short_label())));
            }
        }
        View::Timeline => {
            spans.push(Span::raw(format!(
                "{} of {} machines │ {}",
                app.timeline.selected.len(),
                app.timeline.machines.len(),
                app.timeline.range.label()
            )));
        }
        View::Vibration => {
            spans.push(Span::raw(format!(
                "{} of {} measurements",
                app.vibration.rows().len(),
                app.vibration.records.len()
            )));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Dashboard "),
        Line::from(" 2:Timeline "),
        Line::from(" 3:Vibration "),
    ];

    let selected = match app.current_view {
        View::Dashboard => 0,
        View::Timeline => 1,
        View::Vibration => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render a bordered filter bar: toggle chips followed by the date range.
///
/// `chips` pairs each label with whether it is switched on; `cursor` marks
/// the chip Space would toggle.
pub fn render_filter_bar(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    chips: &[(String, bool)],
    cursor: usize,
) {
    let mut spans = Vec::new();
    for (i, (label, on)) in chips.iter().enumerate() {
        let mut style = if *on { app.theme.chip_on } else { app.theme.chip_off };
        if i == cursor {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }

    if let Some(range) = app.date_range() {
        spans.push(Span::raw("│ "));
        spans.push(date_span(app, DateField::Start, range.start.map(|d| d.to_string())));
        spans.push(Span::raw(" ~ "));
        spans.push(date_span(app, DateField::End, range.end.map(|d| d.to_string())));
    }

    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn date_span(app: &App, field: DateField, value: Option<String>) -> Span<'static> {
    if app.date_input == Some(field) {
        return Span::styled(
            format!("{}_", app.input_text),
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
        );
    }
    Span::raw(value.unwrap_or_else(|| "--".to_string()))
}

/// Render the status bar at the bottom.
///
/// Shows fetch progress, the last error with a retry hint, and the
/// controls of the current view. Temporary status messages take priority.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.date_input.is_some() {
        "Type YYYY-MM-DD | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Dashboard => "←→:chip Space:toggle Enter:history [ ]{ }:dates d/D:type ?:help q:quit",
            View::Timeline => "←→:machine Space:toggle [ ]{ }:dates x:reset ?:help q:quit",
            View::Vibration => "m:machine n:sensor r:reload ?:help q:quit",
        }
    };

    let status = match &app.fetch_state {
        FetchState::Idle => format!(" {} | {}", app.source_description(), controls),
        FetchState::Loading { .. } => format!(
            " Loading... {}s | {}",
            app.loading_seconds().unwrap_or(0),
            app.source_description()
        ),
        FetchState::Loaded { at, rejected } => {
            let skipped = if *rejected > 0 {
                format!(" | {} skipped", rejected)
            } else {
                String::new()
            };
            format!(
                " {} | Loaded {:.0}s ago{} | {}",
                app.source_description(),
                at.elapsed().as_secs_f64(),
                skipped,
                controls
            )
        }
        FetchState::Failed(err) => {
            let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
                .style(Style::default().fg(app.theme.error));
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1/2/3   Switch views"),
        Line::from("  ↑/↓ j/k     Navigate rows"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Filters"),
        Line::from("  ←/→ h/l     Move between chips"),
        Line::from("  Space       Toggle chip"),
        Line::from("  [ / ]       Start date -/+ 1 day"),
        Line::from("  { / }       End date -/+ 1 day"),
        Line::from("  d / D       Type start/end date"),
        Line::from("  x           Reset dates"),
        Line::from("  m / n       Cycle machine/sensor"),
        Line::from("  Enter       Show/hide history"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Reload view"),
        Line::from("  e           Export view to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Centered placeholder used when a view has nothing to show.
pub fn render_empty(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let message = match app.fetch_state {
        FetchState::Loading { .. } => format!(
            "Loading... ({}s)",
            app.loading_seconds().unwrap_or(0)
        ),
        FetchState::Failed(_) => "Failed to load data. Press r to retry.".to_string(),
        _ => "No data".to_string(),
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(message)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(block);
    frame.render_widget(paragraph, area);
}

//! Timeline view rendering.
//!
//! One chart per selected machine. The fault type is drawn as a stepped
//! line in the series' faded color, with change points marked in the strong
//! color on top.

use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::common;
use crate::app::App;
use crate::data::{FaultType, MachineSeries, TimelinePoint};

/// Y-axis bounds; fault codes sit on whole numbers.
const Y_BOUNDS: [f64; 2] = [-0.5, 3.5];

/// Smallest useful chart height, borders included.
const MIN_CHART_HEIGHT: u16 = 6;

/// Render the Timeline view: machine chips above the per-machine charts.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).split(area);

    let page = &app.timeline;
    let chips: Vec<(String, bool)> = page
        .machines
        .iter()
        .map(|m| (m.clone(), page.is_selected(m)))
        .collect();
    common::render_filter_bar(frame, app, chunks[0], &chips, page.chip_index);

    let series = page.series();
    if series.is_empty() {
        common::render_empty(frame, app, chunks[1], "Timeline");
        return;
    }

    // Show as many charts as fit; the rest are reachable by deselecting machines.
    let fit = (chunks[1].height / MIN_CHART_HEIGHT).max(1) as usize;
    let shown = &series[..series.len().min(fit)];
    let constraints = vec![Constraint::Ratio(1, shown.len() as u32); shown.len()];
    let areas = Layout::vertical(constraints).split(chunks[1]);

    let (start, end) = x_window(app, &series);
    for (s, chart_area) in shown.iter().zip(areas.iter()) {
        render_chart(frame, app, *chart_area, s, start, end);
    }
}

/// Time window of the x axis: the selected date range, or the data's extent.
fn x_window(app: &App, series: &[MachineSeries]) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let all = series.iter().flat_map(|s| s.points.iter().map(|p| p.at));
    let first = all.clone().min();
    let last = all.max();

    let start = app.timeline.range.start_instant().or(first);
    let end = app.timeline.range.end_instant().or(last);
    match (start, end) {
        (Some(s), Some(e)) => (s, e),
        // No bounds and no points: any non-empty window will do
        _ => {
            let now = chrono::Utc::now().with_timezone(&crate::data::dates::kst());
            (now - chrono::Duration::days(1), now)
        }
    }
}

fn render_chart(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    series: &MachineSeries,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) {
    let x = |at: &DateTime<FixedOffset>| (*at - start).num_seconds() as f64;
    let x_max = x(&end).max(1.0);

    let line = step_line(&series.points, x);
    let changes: Vec<(f64, f64)> = series
        .change_points()
        .map(|p| (x(&p.at), p.fault_type.code() as f64))
        .collect();

    let faded = app.theme.series_color(series.palette_index, false);
    let strong = app.theme.series_color(series.palette_index, true);

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(faded))
            .data(&line),
        Dataset::default()
            .name(format!("{} changes", changes.len()))
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(strong).add_modifier(Modifier::BOLD))
            .data(&changes),
    ];

    let latest = series
        .points
        .last()
        .map(|p| p.fault_type.label())
        .unwrap_or("no data");
    let title = Span::styled(
        format!(" {} · {} points · latest: {} ", series.label, series.points.len(), latest),
        Style::default().fg(strong).add_modifier(Modifier::BOLD),
    );

    let fmt = |at: DateTime<FixedOffset>| {
        at.with_timezone(&crate::data::dates::kst()).format("%m-%d %H:%M").to_string()
    };
    let middle = start + (end - start) / 2;
    let x_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, x_max])
        .labels(vec![fmt(start), fmt(middle), fmt(end)]);

    let y_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds(Y_BOUNDS)
        .labels(y_labels());

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Labels at every half step from -0.5 to 3.5, named on the whole numbers.
fn y_labels() -> Vec<String> {
    let mut labels = vec![String::new()];
    for fault in FaultType::ALL {
        labels.push(fault.short_label().to_string());
        labels.push(String::new());
    }
    labels
}

/// Turn points into a stepped polyline: each value holds until the next point.
pub fn step_line<F>(points: &[TimelinePoint], x: F) -> Vec<(f64, f64)>
where
    F: Fn(&DateTime<FixedOffset>) -> f64,
{
    let mut line = Vec::with_capacity(points.len() * 2);
    let mut previous_y: Option<f64> = None;
    for point in points {
        let px = x(&point.at);
        let py = point.fault_type.code() as f64;
        if let Some(y) = previous_y {
            line.push((px, y));
        }
        line.push((px, py));
        previous_y = Some(py);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::parse_timestamp;

    fn point(at: &str, fault: u8) -> TimelinePoint {
        TimelinePoint {
            at: parse_timestamp(at).unwrap(),
            fault_type: FaultType::try_from(fault).unwrap(),
            is_change_point: false,
        }
    }

    #[test]
    fn test_step_line_holds_value_until_next_point() {
        let points = vec![
            point("2025-06-10T00:00:00+09:00", 0),
            point("2025-06-10T00:01:00+09:00", 2),
            point("2025-06-10T00:03:00+09:00", 2),
        ];
        let start = points[0].at;
        let line = step_line(&points, |at| (*at - start).num_seconds() as f64);

        assert_eq!(
            line,
            vec![
                (0.0, 0.0),
                (60.0, 0.0),
                (60.0, 2.0),
                (180.0, 2.0),
                (180.0, 2.0),
            ]
        );
    }

    #[test]
    fn test_step_line_empty() {
        assert!(step_line(&[], |_| 0.0).is_empty());
    }

    #[test]
    fn test_y_labels_align_with_codes() {
        let labels = y_labels();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[1], "N");
        assert_eq!(labels[7], "CF");
    }
}

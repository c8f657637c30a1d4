//! Per-machine time series with change-point flags.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::dates::DateRange;
use super::records::{DiagnosisRecord, FaultType};

/// Number of series colors. Colors repeat after this many machines.
pub const PALETTE_SIZE: usize = 5;

/// One point on a machine's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub at: DateTime<FixedOffset>,
    pub fault_type: FaultType,
    /// True when the fault type differs from the previous point in the series.
    pub is_change_point: bool,
}

/// The chart series for one selected machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSeries {
    /// The machine name as it appears in the selection.
    pub label: String,
    /// Position in the selection list modulo [`PALETTE_SIZE`].
    pub palette_index: usize,
    pub points: Vec<TimelinePoint>,
}

impl MachineSeries {
    pub fn change_points(&self) -> impl Iterator<Item = &TimelinePoint> {
        self.points.iter().filter(|p| p.is_change_point)
    }
}

/// Case- and whitespace-insensitive machine key.
pub fn machine_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Build one series per selected machine, in selection order.
///
/// Points are sorted ascending by time (stable) before change points are
/// flagged; the first point of a series is always a change point.
pub fn build_series(
    records: &[DiagnosisRecord],
    selected: &[String],
    range: &DateRange,
) -> Vec<MachineSeries> {
    selected
        .iter()
        .enumerate()
        .map(|(index, machine)| {
            let key = machine_key(machine);

            let mut items: Vec<&DiagnosisRecord> = records
                .iter()
                .filter(|r| machine_key(&r.machine_name) == key && range.contains(&r.detected_at))
                .collect();
            items.sort_by(|a, b| a.detected_at.cmp(&b.detected_at));

            let mut previous: Option<FaultType> = None;
            let points = items
                .into_iter()
                .map(|r| {
                    let is_change_point = previous != Some(r.fault_type);
                    previous = Some(r.fault_type);
                    TimelinePoint {
                        at: r.detected_at,
                        fault_type: r.fault_type,
                        is_change_point,
                    }
                })
                .collect();

            MachineSeries {
                label: machine.clone(),
                palette_index: index % PALETTE_SIZE,
                points,
            }
        })
        .collect()
}

/// Remove the machine if selected, otherwise append it to the end.
///
/// Appending changes the machine's palette slot, since colors follow
/// selection order.
pub fn toggle_selection(selected: &mut Vec<String>, machine: &str) {
    if selected.iter().any(|m| m == machine) {
        selected.retain(|m| m != machine);
    } else {
        selected.push(machine.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::{parse_date, parse_timestamp};

    fn record(machine: &str, at: &str, fault: u8) -> DiagnosisRecord {
        DiagnosisRecord {
            machine_name: machine.to_string(),
            detected_at: parse_timestamp(at).unwrap(),
            fault_type: FaultType::try_from(fault).unwrap(),
        }
    }

    fn june(start: &str, end: &str) -> DateRange {
        DateRange::days(parse_date(start).unwrap(), parse_date(end).unwrap())
    }

    fn flags(series: &MachineSeries) -> Vec<bool> {
        series.points.iter().map(|p| p.is_change_point).collect()
    }

    #[test]
    fn test_two_points_both_change_points() {
        let records = vec![
            record("g1", "2025-06-01T10:00:00+09:00", 0),
            record("g1", "2025-06-01T11:00:00+09:00", 1),
        ];
        let series = build_series(&records, &["g1".to_string()], &june("2025-06-01", "2025-06-01"));

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(flags(&series[0]), vec![true, true]);
    }

    #[test]
    fn test_change_points_follow_previous_point() {
        let records = vec![
            record("g1", "2025-06-01T13:00:00+09:00", 1),
            record("g1", "2025-06-01T10:00:00+09:00", 0),
            record("g1", "2025-06-01T11:00:00+09:00", 0),
            record("g1", "2025-06-01T12:00:00+09:00", 1),
            record("g1", "2025-06-01T14:00:00+09:00", 0),
        ];
        let series = build_series(&records, &["g1".to_string()], &june("2025-06-01", "2025-06-01"));

        let faults: Vec<u8> = series[0].points.iter().map(|p| p.fault_type.code()).collect();
        assert_eq!(faults, vec![0, 0, 1, 1, 0]);
        assert_eq!(flags(&series[0]), vec![true, false, true, false, true]);
        assert_eq!(series[0].change_points().count(), 3);
    }

    #[test]
    fn test_machine_names_match_loosely() {
        let records = vec![
            record("G1 ", "2025-06-01T10:00:00+09:00", 0),
            record("g1", "2025-06-01T11:00:00+09:00", 0),
            record("g2", "2025-06-01T11:00:00+09:00", 0),
        ];
        let series = build_series(&records, &["g1".to_string()], &june("2025-06-01", "2025-06-01"));

        assert_eq!(series[0].points.len(), 2);
        assert_eq!(flags(&series[0]), vec![true, false]);
    }

    #[test]
    fn test_window_is_inclusive_kst_days() {
        let records = vec![
            record("g1", "2025-05-31T23:59:59+09:00", 0),
            record("g1", "2025-06-01T00:00:00+09:00", 1),
            record("g1", "2025-06-02T23:59:59+09:00", 2),
            record("g1", "2025-06-03T00:00:00+09:00", 3),
        ];
        let series = build_series(&records, &["g1".to_string()], &june("2025-06-01", "2025-06-02"));

        let faults: Vec<u8> = series[0].points.iter().map(|p| p.fault_type.code()).collect();
        assert_eq!(faults, vec![1, 2]);
    }

    #[test]
    fn test_palette_follows_selection_order() {
        let selected: Vec<String> = ["g1", "g2", "g3", "g4", "g5", "g6"].iter().map(|s| s.to_string()).collect();
        let series = build_series(&[], &selected, &june("2025-06-01", "2025-06-01"));

        let slots: Vec<usize> = series.iter().map(|s| s.palette_index).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 0]);
        assert!(series.iter().all(|s| s.points.is_empty()));
    }

    #[test]
    fn test_reselecting_moves_machine_to_end() {
        let mut selected: Vec<String> = vec!["g1".into(), "g2".into(), "g3".into()];
        toggle_selection(&mut selected, "g1");
        toggle_selection(&mut selected, "g1");
        assert_eq!(selected, vec!["g2", "g3", "g1"]);

        let series = build_series(&[], &selected, &june("2025-06-01", "2025-06-01"));
        assert_eq!(series[2].label, "g1");
        assert_eq!(series[2].palette_index, 2);
    }
}

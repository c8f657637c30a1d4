//! Latest-plus-history rows for the diagnosis dashboard.
//!
//! Records are grouped per machine in order of first appearance. Each group
//! is filtered, sorted newest first, and contributes its newest record as the
//! "latest" row; the rest follow only while the machine is expanded.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::dates::DateRange;
use super::records::{DiagnosisRecord, FaultType};

/// Machines shown on the dashboard until the user changes the selection.
pub const DEFAULT_MACHINES: [&str; 5] = ["g1", "g2", "g3", "g4", "g5"];

/// User-selected filters for the dashboard table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisFilter {
    /// Included machines, in the order they were selected.
    pub machines: Vec<String>,
    /// Included fault types, in the order they were selected.
    pub fault_types: Vec<FaultType>,
    pub range: DateRange,
    /// Machines whose history rows are shown.
    pub expanded: HashSet<String>,
}

impl Default for DiagnosisFilter {
    fn default() -> Self {
        Self::with_machines(DEFAULT_MACHINES.iter().map(|m| m.to_string()).collect())
    }
}

impl DiagnosisFilter {
    /// All fault types, no date bound, nothing expanded.
    pub fn with_machines(machines: Vec<String>) -> Self {
        Self {
            machines,
            fault_types: FaultType::ALL.to_vec(),
            range: DateRange::unbounded(),
            expanded: HashSet::new(),
        }
    }

    pub fn includes_machine(&self, machine: &str) -> bool {
        self.machines.iter().any(|m| m == machine)
    }

    pub fn includes_fault(&self, fault: FaultType) -> bool {
        self.fault_types.contains(&fault)
    }

    /// Remove the machine if selected, otherwise append it.
    pub fn toggle_machine(&mut self, machine: &str) {
        if self.includes_machine(machine) {
            self.machines.retain(|m| m != machine);
        } else {
            self.machines.push(machine.to_string());
        }
    }

    /// Remove the fault type if selected, otherwise append it.
    pub fn toggle_fault_type(&mut self, fault: FaultType) {
        if self.includes_fault(fault) {
            self.fault_types.retain(|f| *f != fault);
        } else {
            self.fault_types.push(fault);
        }
    }

    pub fn is_expanded(&self, machine: &str) -> bool {
        self.expanded.contains(machine)
    }

    pub fn toggle_expanded(&mut self, machine: &str) {
        if !self.expanded.remove(machine) {
            self.expanded.insert(machine.to_string());
        }
    }

    fn keeps(&self, record: &DiagnosisRecord) -> bool {
        self.range.contains(&record.detected_at) && self.includes_fault(record.fault_type)
    }
}

/// Whether a row is a machine's newest record or part of its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Latest,
    History,
}

/// One rendered row of the dashboard table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisRow<'a> {
    #[serde(flatten)]
    pub record: &'a DiagnosisRecord,
    pub kind: RowKind,
}

impl DiagnosisRow<'_> {
    pub fn is_latest(&self) -> bool {
        self.kind == RowKind::Latest
    }
}

/// Records of one machine, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineGroup<'a> {
    pub machine: &'a str,
    pub records: Vec<&'a DiagnosisRecord>,
}

/// Partition records by machine name, ordered by first appearance.
pub fn group_by_machine(records: &[DiagnosisRecord]) -> Vec<MachineGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<MachineGroup<'_>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.machine_name.as_str()).or_insert_with(|| {
            groups.push(MachineGroup {
                machine: record.machine_name.as_str(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}

/// Build the dashboard rows for the given filter.
///
/// Within a machine, records are sorted newest first with a stable sort, so
/// records sharing a timestamp keep their input order.
pub fn build_rows<'a>(records: &'a [DiagnosisRecord], filter: &DiagnosisFilter) -> Vec<DiagnosisRow<'a>> {
    let mut rows = Vec::new();

    for group in group_by_machine(records) {
        if !filter.includes_machine(group.machine) {
            continue;
        }

        let mut kept: Vec<&DiagnosisRecord> =
            group.records.into_iter().filter(|r| filter.keeps(r)).collect();
        kept.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));

        let mut kept = kept.into_iter();
        let Some(latest) = kept.next() else {
            continue;
        };

        rows.push(DiagnosisRow {
            record: latest,
            kind: RowKind::Latest,
        });

        if filter.is_expanded(group.machine) {
            rows.extend(kept.map(|record| DiagnosisRow {
                record,
                kind: RowKind::History,
            }));
        }
    }

    rows
}

/// Per-fault-type counts over the latest rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultCounts {
    counts: [usize; 4],
}

impl FaultCounts {
    pub fn from_latest(rows: &[DiagnosisRow<'_>]) -> Self {
        let mut counts = Self::default();
        for row in rows.iter().filter(|r| r.is_latest()) {
            counts.counts[row.record.fault_type.code() as usize] += 1;
        }
        counts
    }

    pub fn get(&self, fault: FaultType) -> usize {
        self.counts[fault.code() as usize]
    }

    /// Number of machines whose latest record is a fault.
    pub fn faulty(&self) -> usize {
        self.counts[1..].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
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

    fn sample() -> Vec<DiagnosisRecord> {
        vec![
            record("g2", "2025-06-01T09:00:00+09:00", 0),
            record("g1", "2025-06-01T10:00:00+09:00", 1),
            record("g1", "2025-06-01T12:00:00+09:00", 0),
            record("g2", "2025-06-02T09:00:00+09:00", 3),
            record("g1", "2025-06-01T11:00:00+09:00", 2),
        ]
    }

    fn machines<'a>(rows: &'a [DiagnosisRow<'a>]) -> Vec<&'a str> {
        rows.iter().map(|r| r.record.machine_name.as_str()).collect()
    }

    #[test]
    fn test_group_preserves_first_appearance() {
        let records = sample();
        let groups = group_by_machine(&records);
        let names: Vec<_> = groups.iter().map(|g| g.machine).collect();
        assert_eq!(names, vec!["g2", "g1"]);
        assert_eq!(groups[1].records.len(), 3);
    }

    #[test]
    fn test_latest_is_newest_and_history_collapsed() {
        let records = sample();
        let rows = build_rows(&records, &DiagnosisFilter::default());

        assert_eq!(machines(&rows), vec!["g2", "g1"]);
        assert!(rows.iter().all(|r| r.is_latest()));
        assert_eq!(rows[0].record.fault_type, FaultType::CombinedFault);
        assert_eq!(rows[1].record.fault_type, FaultType::Normal);
    }

    #[test]
    fn test_expanded_machine_shows_history_newest_first() {
        let records = sample();
        let mut filter = DiagnosisFilter::default();
        filter.toggle_expanded("g1");

        let rows = build_rows(&records, &filter);
        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RowKind::Latest, RowKind::Latest, RowKind::History, RowKind::History]
        );
        let g1_faults: Vec<_> = rows[1..].iter().map(|r| r.record.fault_type.code()).collect();
        assert_eq!(g1_faults, vec![0, 2, 1]);
    }

    #[test]
    fn test_toggling_expansion_keeps_latest() {
        let records = sample();
        let mut filter = DiagnosisFilter::default();
        let before: Vec<_> =
            build_rows(&records, &filter).into_iter().filter(|r| r.is_latest()).collect();

        filter.toggle_expanded("g1");
        let after: Vec<_> =
            build_rows(&records, &filter).into_iter().filter(|r| r.is_latest()).collect();
        assert_eq!(before, after);

        filter.toggle_expanded("g1");
        assert!(!filter.is_expanded("g1"));
    }

    #[test]
    fn test_machine_filter_limits_rows() {
        let records = sample();
        let mut filter = DiagnosisFilter::with_machines(vec!["g1".to_string()]);
        filter.expanded.insert("g1".to_string());
        filter.expanded.insert("g2".to_string());

        let rows = build_rows(&records, &filter);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.record.machine_name == "g1"));
    }

    #[test]
    fn test_all_fault_types_keep_every_record() {
        let records = sample();
        let mut filter = DiagnosisFilter::with_machines(vec!["g1".into(), "g2".into()]);
        filter.expanded.extend(["g1".to_string(), "g2".to_string()]);

        assert_eq!(build_rows(&records, &filter).len(), records.len());
    }

    #[test]
    fn test_fault_filter_can_promote_older_record() {
        let records = sample();
        let mut filter = DiagnosisFilter::default();
        filter.toggle_fault_type(FaultType::Normal);

        let rows = build_rows(&records, &filter);
        let g1 = rows.iter().find(|r| r.record.machine_name == "g1").unwrap();
        assert_eq!(g1.record.fault_type, FaultType::SupportFault);
        assert!(!filter.includes_fault(FaultType::Normal));

        filter.toggle_fault_type(FaultType::Normal);
        assert_eq!(filter.fault_types.last(), Some(&FaultType::Normal));
    }

    #[test]
    fn test_date_range_can_empty_a_machine() {
        let records = sample();
        let mut filter = DiagnosisFilter::default();
        filter.range.start = Some(parse_date("2025-06-02").unwrap());

        let rows = build_rows(&records, &filter);
        assert_eq!(machines(&rows), vec!["g2"]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let records = vec![
            record("g1", "2025-06-01T10:00:00+09:00", 1),
            record("g1", "2025-06-01T10:00:00+09:00", 2),
            record("g1", "2025-06-01T10:00:00+09:00", 3),
        ];
        let mut filter = DiagnosisFilter::default();
        filter.toggle_expanded("g1");

        let faults: Vec<_> =
            build_rows(&records, &filter).iter().map(|r| r.record.fault_type.code()).collect();
        assert_eq!(faults, vec![1, 2, 3]);
    }

    #[test]
    fn test_toggle_machine_appends() {
        let mut filter = DiagnosisFilter::default();
        filter.toggle_machine("g1");
        assert!(!filter.includes_machine("g1"));
        filter.toggle_machine("g1");
        assert_eq!(filter.machines.last().map(String::as_str), Some("g1"));
    }

    #[test]
    fn test_fault_counts() {
        let records = sample();
        let rows = build_rows(&records, &DiagnosisFilter::default());
        let counts = FaultCounts::from_latest(&rows);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.faulty(), 1);
        assert_eq!(counts.get(FaultType::CombinedFault), 1);
    }

    #[test]
    fn test_row_serializes_flat() {
        let records = sample();
        let rows = build_rows(&records, &DiagnosisFilter::default());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["machine_name"], "g2");
        assert_eq!(json["fault_type"], 3);
        assert_eq!(json["kind"], "latest");
    }
}

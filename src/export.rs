//! JSON export of derived rows and series.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::data::{
    diagnosis, timeline, vibration, DateRange, DiagnosisFilter, DiagnosisRecord, DiagnosisRow,
    FaultCounts, FaultType, MachineSeries, VibrationFilter, VibrationRecord,
};

/// Dashboard rows with the filter that produced them.
pub fn dashboard_report(rows: &[DiagnosisRow<'_>], filter: &DiagnosisFilter) -> Value {
    let counts = FaultCounts::from_latest(rows);
    let mut expanded: Vec<&String> = filter.expanded.iter().collect();
    expanded.sort();

    json!({
        "filter": {
            "machines": filter.machines,
            "fault_types": filter.fault_types,
            "range": range_json(&filter.range),
            "expanded": expanded,
        },
        "summary": {
            "machines": counts.total(),
            "faulty": counts.faulty(),
            "by_fault_type": FaultType::ALL
                .iter()
                .map(|f| json!({ "fault_type": f, "label": f.label(), "count": counts.get(*f) }))
                .collect::<Vec<_>>(),
        },
        "rows": rows,
    })
}

/// Timeline series with their window.
pub fn timeline_report(series: &[MachineSeries], range: &DateRange) -> Value {
    json!({
        "range": range_json(range),
        "series": series
            .iter()
            .map(|s| json!({
                "machine": s.label,
                "palette_index": s.palette_index,
                "change_points": s.change_points().count(),
                "points": s.points,
            }))
            .collect::<Vec<_>>(),
    })
}

/// Vibration rows with the selections that produced them.
pub fn vibration_report(rows: &[&VibrationRecord], filter: &VibrationFilter) -> Value {
    json!({
        "filter": {
            "machine": filter.machine.label(),
            "sensor": filter.sensor.label(),
        },
        "count": rows.len(),
        "rows": rows,
    })
}

/// All three views with their initial filters, as used by `--export`.
pub fn full_report(
    diagnoses: &[DiagnosisRecord],
    vibrations: &[VibrationRecord],
    machines: &[String],
    today: NaiveDate,
) -> Value {
    let filter = DiagnosisFilter::with_machines(machines.to_vec());
    let rows = diagnosis::build_rows(diagnoses, &filter);

    let selected = crate::data::distinct_in_order(diagnoses.iter().map(|r| r.machine_name.as_str()));
    let range = DateRange::last_two_days(today);
    let series = timeline::build_series(diagnoses, &selected, &range);

    let vibration_filter = VibrationFilter::default();
    let vibration_rows = vibration::filter_rows(vibrations, &vibration_filter);

    json!({
        "dashboard": dashboard_report(&rows, &filter),
        "timeline": timeline_report(&series, &range),
        "vibration": vibration_report(&vibration_rows, &vibration_filter),
    })
}

/// Write a value as pretty JSON.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn range_json(range: &DateRange) -> Value {
    json!({
        "start": range.start_instant().map(|d| d.to_rfc3339()),
        "end": range.end_instant().map(|d| d.to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::{parse_date, parse_timestamp};

    fn diagnosis(machine: &str, at: &str, fault: u8) -> DiagnosisRecord {
        DiagnosisRecord {
            machine_name: machine.to_string(),
            detected_at: parse_timestamp(at).unwrap(),
            fault_type: FaultType::try_from(fault).unwrap(),
        }
    }

    #[test]
    fn test_full_report_shapes() {
        let diagnoses = vec![
            diagnosis("g1", "2025-06-09T10:00:00+09:00", 0),
            diagnosis("g1", "2025-06-10T10:00:00+09:00", 1),
            diagnosis("g9", "2025-06-10T10:00:00+09:00", 3),
        ];
        let machines = vec!["g1".to_string()];
        let report = full_report(&diagnoses, &[], &machines, parse_date("2025-06-10").unwrap());

        let dashboard = &report["dashboard"];
        assert_eq!(dashboard["rows"].as_array().unwrap().len(), 1);
        assert_eq!(dashboard["rows"][0]["fault_type"], 1);
        assert_eq!(dashboard["summary"]["faulty"], 1);
        assert!(dashboard["filter"]["range"]["start"].is_null());

        let series = report["timeline"]["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["machine"], "g1");
        assert_eq!(series[0]["change_points"], 2);
        assert_eq!(series[1]["palette_index"], 1);
        assert_eq!(
            report["timeline"]["range"]["end"],
            "2025-06-10T23:59:59+09:00"
        );

        assert_eq!(report["vibration"]["count"], 0);
        assert_eq!(report["vibration"]["filter"]["machine"], "ALL");
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!({"ok": true})).unwrap();

        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}

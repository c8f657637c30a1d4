//! Equality filters for the vibration table.

use super::records::VibrationRecord;

/// A single-value selection where `All` disables filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => "ALL",
            Selection::Only(value) => value,
        }
    }

    /// Step through `ALL → choices[0] → … → choices[n-1] → ALL`.
    ///
    /// A selection no longer present in `choices` falls back to `All`.
    pub fn cycle(&self, choices: &[String]) -> Selection {
        let next = match self {
            Selection::All => choices.first(),
            Selection::Only(current) => choices
                .iter()
                .position(|c| c == current)
                .and_then(|i| choices.get(i + 1)),
        };
        next.map_or(Selection::All, |c| Selection::Only(c.clone()))
    }
}

/// Machine and sensor selections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VibrationFilter {
    pub machine: Selection,
    pub sensor: Selection,
}

impl VibrationFilter {
    pub fn matches(&self, record: &VibrationRecord) -> bool {
        self.machine.matches(&record.machine_name) && self.sensor.matches(&record.sensor_no)
    }
}

/// Records passing the filter, in input order.
pub fn filter_rows<'a>(records: &'a [VibrationRecord], filter: &VibrationFilter) -> Vec<&'a VibrationRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct machine names in first-appearance order.
pub fn machine_choices(records: &[VibrationRecord]) -> Vec<String> {
    super::distinct_in_order(records.iter().map(|r| r.machine_name.as_str()))
}

/// Distinct sensor ids in first-appearance order.
pub fn sensor_choices(records: &[VibrationRecord]) -> Vec<String> {
    super::distinct_in_order(records.iter().map(|r| r.sensor_no.as_str()))
}

/// Row tint keyed off the machine name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineTint {
    G1,
    G2,
    G3,
}

/// First of `g1`, `g2`, `g3` contained in the machine name, if any.
pub fn machine_tint(machine_name: &str) -> Option<MachineTint> {
    if machine_name.contains("g1") {
        Some(MachineTint::G1)
    } else if machine_name.contains("g2") {
        Some(MachineTint::G2)
    } else if machine_name.contains("g3") {
        Some(MachineTint::G3)
    } else {
        None
    }
}

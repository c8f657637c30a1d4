//! Data models and pure transforms for diagnosis and vibration records.
//!
//! Nothing in this module touches the terminal or the network; every
//! transform is a function of records plus filter state.
//!
//! ## Submodules
//!
//! - [`dates`]: Timestamp parsing and the fixed UTC+9 day window
//! - [`records`]: Wire shapes ([`DiagnosisRecord`], [`VibrationRecord`], [`FaultType`])
//! - [`diagnosis`]: Latest-plus-history rows for the dashboard
//! - [`timeline`]: Per-machine series with change-point flags
//! - [`vibration`]: ALL-or-one equality filters for the vibration table
//!
//! ## Data Flow
//!
//! ```text
//! JSON array (validated per element)
//!        │
//!        ▼
//! Vec<DiagnosisRecord> ──┬──▶ diagnosis::build_rows(filter)   ──▶ dashboard table
//!                        └──▶ timeline::build_series(selected) ──▶ charts
//!
//! Vec<VibrationRecord> ─────▶ vibration::filter_rows(filter)   ──▶ vibration table
//! ```

pub mod dates;
pub mod diagnosis;
pub mod records;
pub mod timeline;
pub mod vibration;

use std::collections::HashSet;

pub use dates::DateRange;
pub use diagnosis::{DiagnosisFilter, DiagnosisRow, FaultCounts, RowKind};
pub use records::{DiagnosisRecord, FaultType, VibrationRecord};
pub use timeline::{MachineSeries, TimelinePoint};
pub use vibration::{Selection, VibrationFilter};

/// Distinct values in order of first appearance.
pub fn distinct_in_order<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_in_order() {
        let values = ["g2", "g1", "g2", "g3", "g1"];
        assert_eq!(distinct_in_order(values), vec!["g2", "g1", "g3"]);
    }
}

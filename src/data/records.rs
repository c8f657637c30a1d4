//! Record shapes returned by the diagnostic API.
//!
//! Records are immutable snapshots. They are deserialized once per fetch and
//! held by the view that requested them until it is unmounted.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::dates::timestamp;

/// Outcome of a vibration diagnosis.
///
/// Encoded on the wire as a small integer (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FaultType {
    Normal,
    MassImbalance,
    SupportFault,
    CombinedFault,
}

impl FaultType {
    /// Every fault type, in wire-code order.
    pub const ALL: [FaultType; 4] = [
        FaultType::Normal,
        FaultType::MassImbalance,
        FaultType::SupportFault,
        FaultType::CombinedFault,
    ];

    /// Wire code for this fault type.
    pub fn code(self) -> u8 {
        match self {
            FaultType::Normal => 0,
            FaultType::MassImbalance => 1,
            FaultType::SupportFault => 2,
            FaultType::CombinedFault => 3,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FaultType::Normal => "Normal",
            FaultType::MassImbalance => "Mass imbalance",
            FaultType::SupportFault => "Support fault",
            FaultType::CombinedFault => "Combined fault",
        }
    }

    /// Short label used in the header bar and filter chips.
    pub fn short_label(self) -> &'static str {
        match self {
            FaultType::Normal => "N",
            FaultType::MassImbalance => "MI",
            FaultType::SupportFault => "SF",
            FaultType::CombinedFault => "CF",
        }
    }

    /// Anything other than [`FaultType::Normal`] is a fault.
    pub fn is_fault(self) -> bool {
        self != FaultType::Normal
    }
}

impl TryFrom<u8> for FaultType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FaultType::Normal),
            1 => Ok(FaultType::MassImbalance),
            2 => Ok(FaultType::SupportFault),
            3 => Ok(FaultType::CombinedFault),
            other => Err(format!("fault_type out of range: {}", other)),
        }
    }
}

impl From<FaultType> for u8 {
    fn from(fault: FaultType) -> Self {
        fault.code()
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single diagnosis result for a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub machine_name: String,
    #[serde(with = "timestamp")]
    pub detected_at: DateTime<FixedOffset>,
    pub fault_type: FaultType,
}

/// A single vibration measurement with per-class scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibrationRecord {
    pub machine_name: String,
    /// Sensor identifier. The API sends either a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    pub sensor_no: String,
    #[serde(with = "timestamp")]
    pub collected_at: DateTime<FixedOffset>,
    pub measured_time: f64,
    pub normal: f64,
    pub unbalance: f64,
    pub looseness: f64,
    pub unbalance_looseness: f64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

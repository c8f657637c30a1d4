//! Response bodies and per-element validation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Endpoint;
use crate::data::{DiagnosisRecord, VibrationRecord};
use crate::error::FetchError;

/// Records that passed validation plus the number that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub records: Vec<T>,
    pub rejected: usize,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Diagnoses(Validated<DiagnosisRecord>),
    Vibrations(Validated<VibrationRecord>),
}

impl Payload {
    /// Number of elements dropped during validation.
    pub fn rejected(&self) -> usize {
        match self {
            Payload::Diagnoses(v) => v.rejected,
            Payload::Vibrations(v) => v.rejected,
        }
    }

    /// Number of records kept.
    pub fn len(&self) -> usize {
        match self {
            Payload::Diagnoses(v) => v.records.len(),
            Payload::Vibrations(v) => v.records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a response body for the given endpoint.
///
/// The body must be a JSON array. Elements that do not match the record
/// shape are dropped and counted rather than failing the whole response.
pub fn decode(endpoint: Endpoint, body: &[u8]) -> Result<Payload, FetchError> {
    let elements: Vec<Value> = serde_json::from_slice(body)?;

    let payload = match endpoint {
        Endpoint::DiagnosisRecent => Payload::Diagnoses(validate(elements)),
        Endpoint::VibrationRange { .. } => Payload::Vibrations(validate(elements)),
    };

    if payload.rejected() > 0 {
        tracing::warn!(
            endpoint = %endpoint.path(),
            rejected = payload.rejected(),
            kept = payload.len(),
            "dropped malformed records"
        );
    }

    Ok(payload)
}

fn validate<T: DeserializeOwned>(elements: Vec<Value>) -> Validated<T> {
    let mut records = Vec::with_capacity(elements.len());
    let mut rejected = 0;

    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(index, error = %e, "invalid record");
                rejected += 1;
            }
        }
    }

    Validated { records, rejected }
}

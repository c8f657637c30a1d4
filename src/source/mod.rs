//! Data source abstraction for fetching diagnosis and vibration records.
//!
//! A view asks its source for one endpoint when it is mounted and later
//! polls for the answer without blocking the UI thread. Every request carries
//! the app's generation number, echoed back in the response, so answers for
//! a view that has since been unmounted can be recognized and dropped.

mod file;
mod http;
mod payload;

pub use file::FileSource;
pub use http::HttpSource;
pub use payload::{decode, Payload, Validated};

use std::fmt::Debug;
use std::time::{Duration, Instant};

use crate::error::FetchError;

/// Remote endpoints served by the diagnostic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Recent diagnosis results, grouped by machine.
    DiagnosisRecent,
    /// Raw vibration measurements, at most `per_group_limit` per group.
    VibrationRange { per_group_limit: u32 },
}

impl Endpoint {
    /// Path and query relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::DiagnosisRecent => "vibration-diagnosis/grouped-recent".to_string(),
            Endpoint::VibrationRange { per_group_limit } => {
                format!("vibration-data/grouped-range?per_group_limit={}", per_group_limit)
            }
        }
    }

    /// File holding this dataset in offline mode.
    pub fn file_name(&self) -> &'static str {
        match self {
            Endpoint::DiagnosisRecent => "diagnosis.json",
            Endpoint::VibrationRange { .. } => "vibration.json",
        }
    }
}

/// A fetch issued on behalf of a mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub endpoint: Endpoint,
}

/// The outcome of a [`FetchRequest`].
#[derive(Debug)]
pub struct FetchResponse {
    pub generation: u64,
    pub endpoint: Endpoint,
    pub result: Result<Payload, FetchError>,
}

/// Trait for fetching records from various backends.
///
/// # Example
///
/// ```no_run
/// use vibration_doctor::source::{DataSource, Endpoint, FetchRequest, FileSource};
///
/// let mut source = FileSource::new("./data");
/// source.request(FetchRequest { generation: 1, endpoint: Endpoint::DiagnosisRecent });
/// if let Some(response) = source.poll() {
///     println!("generation {} -> {:?}", response.generation, response.result.map(|p| p.len()));
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Start fetching. Must not block.
    fn request(&mut self, request: FetchRequest);

    /// Take the next finished response, if any. Must not block.
    fn poll(&mut self) -> Option<FetchResponse>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// Fetch one endpoint and wait for its answer, polling every 20ms.
///
/// Used by the non-interactive export. Responses for other requests that
/// arrive in the meantime are discarded.
pub fn fetch_blocking(
    source: &mut dyn DataSource,
    endpoint: Endpoint,
    generation: u64,
    timeout: Duration,
) -> Result<Payload, FetchError> {
    source.request(FetchRequest {
        generation,
        endpoint,
    });

    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        while let Some(response) = source.poll() {
            if response.generation == generation && response.endpoint == endpoint {
                return response.result;
            }
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    Err(FetchError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(
            Endpoint::DiagnosisRecent.path(),
            "vibration-diagnosis/grouped-recent"
        );
        assert_eq!(
            Endpoint::VibrationRange {
                per_group_limit: 1000
            }
            .path(),
            "vibration-data/grouped-range?per_group_limit=1000"
        );
    }

    #[test]
    fn test_fetch_blocking_with_file_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("diagnosis.json"),
            r#"[{"machine_name":"g1","detected_at":"2025-06-01T10:00:00","fault_type":1}]"#,
        )
        .unwrap();

        let mut source = FileSource::new(dir.path());
        let payload = fetch_blocking(
            &mut source,
            Endpoint::DiagnosisRecent,
            7,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(payload.len(), 1);
    }
}

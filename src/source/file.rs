//! File-based data source.
//!
//! Serves datasets from JSON files in a directory, one file per endpoint.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use super::{decode, DataSource, FetchRequest, FetchResponse, Payload};
use crate::error::FetchError;

/// A data source that reads saved API responses from a directory.
///
/// `diagnosis.json` answers the diagnosis endpoint and `vibration.json` the
/// vibration endpoint. Each file holds the JSON array the API would return.
/// Files are re-read on every request, so editing them and pressing reload
/// shows the new contents.
#[derive(Debug)]
pub struct FileSource {
    dir: PathBuf,
    description: String,
    ready: VecDeque<FetchResponse>,
}

impl FileSource {
    /// Create a new file source for the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let description = format!("dir: {}", dir.display());
        Self {
            dir,
            description,
            ready: VecDeque::new(),
        }
    }

    /// Returns the directory being served.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, request: &FetchRequest) -> Result<Payload, FetchError> {
        let path = self.dir.join(request.endpoint.file_name());
        let content =
            fs::read(&path).map_err(|e| FetchError::Read(format!("{}: {}", path.display(), e)))?;
        decode(request.endpoint, &content)
    }
}

impl DataSource for FileSource {
    fn request(&mut self, request: FetchRequest) {
        let result = self.read(&request);
        if let Err(ref e) = result {
            tracing::error!(error = %e, "failed to load dataset file");
        }
        self.ready.push_back(FetchResponse {
            generation: request.generation,
            endpoint: request.endpoint,
            result,
        });
    }

    fn poll(&mut self) -> Option<FetchResponse> {
        self.ready.pop_front()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Endpoint;

    fn diagnosis_request(generation: u64) -> FetchRequest {
        FetchRequest {
            generation,
            endpoint: Endpoint::DiagnosisRecent,
        }
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/data");
        assert_eq!(source.dir(), Path::new("/tmp/data"));
        assert_eq!(source.description(), "dir: /tmp/data");
    }

    #[test]
    fn test_file_source_answers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("diagnosis.json"),
            r#"[{"machine_name":"g1","detected_at":"2025-06-01T10:00:00","fault_type":0}]"#,
        )
        .unwrap();

        let mut source = FileSource::new(dir.path());
        assert!(source.poll().is_none());

        source.request(diagnosis_request(1));
        source.request(diagnosis_request(2));

        let first = source.poll().unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(first.result.unwrap().len(), 1);
        assert_eq!(source.poll().unwrap().generation, 2);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path());

        source.request(FetchRequest {
            generation: 3,
            endpoint: Endpoint::VibrationRange { per_group_limit: 5 },
        });

        let response = source.poll().unwrap();
        let err = response.result.unwrap_err();
        assert!(matches!(err, FetchError::Read(_)));
        assert!(err.to_string().contains("vibration.json"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diagnosis.json"), "not valid json").unwrap();

        let mut source = FileSource::new(dir.path());
        source.request(diagnosis_request(1));

        let err = source.poll().unwrap().result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}

//! Layered settings: defaults, optional TOML file, then environment.
//!
//! Environment variables use the `VIBRATION_DOCTOR_` prefix and `__` between
//! sections, e.g. `VIBRATION_DOCTOR_API__BASE_URL=http://10.0.0.5:8000`.
//! Lists are comma separated: `VIBRATION_DOCTOR_DASHBOARD__MACHINES=g1,g2`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::diagnosis::DEFAULT_MACHINES;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VIBRATION_DOCTOR";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL the endpoint paths are appended to.
    pub base_url: String,
    pub timeout_secs: u64,
    /// `per_group_limit` sent with the vibration request.
    pub per_group_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Machines offered (and initially selected) on the dashboard.
    pub machines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            per_group_limit: 1000,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            machines: DEFAULT_MACHINES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("vibration-doctor.log"),
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file and the environment.
    ///
    /// A path given explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let env = env
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("dashboard.machines");

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::load_with_env(None, no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api.per_group_limit, 1000);
        assert_eq!(settings.dashboard.machines, vec!["g1", "g2", "g3", "g4", "g5"]);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://10.0.0.5:8000"
per_group_limit = 250

[dashboard]
machines = ["press-1", "press-2"]
"#
        )
        .unwrap();

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(settings.api.per_group_limit, 250);
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.dashboard.machines, vec!["press-1", "press-2"]);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 5\n").unwrap();

        let env = Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::from([
            ("VIBRATION_DOCTOR_API__TIMEOUT_SECS".to_string(), "9".to_string()),
            ("VIBRATION_DOCTOR_DASHBOARD__MACHINES".to_string(), "g7,g8".to_string()),
        ])));

        let settings = Settings::load_with_env(Some(file.path()), env).unwrap();
        assert_eq!(settings.api.timeout_secs, 9);
        assert_eq!(settings.dashboard.machines, vec!["g7", "g8"]);
    }

    #[test]
    fn test_environment_uses_single_underscore_after_prefix() {
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::from([(
            "VIBRATION_DOCTOR_API__BASE_URL".to_string(),
            "http://10.0.0.9:8000".to_string(),
        )])));

        let settings = Settings::load_with_env(None, env).unwrap();
        assert_eq!(settings.api.base_url, "http://10.0.0.9:8000");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = Settings::load_with_env(Some(Path::new("/nonexistent/doctor.toml")), no_env());
        assert!(result.is_err());
    }
}

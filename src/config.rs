use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Domain, Error};

/// Session settings, read from an optional TOML file. Missing keys take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REPL history file
    pub history_file: PathBuf,
    /// Where `export` writes when no path is given
    pub export_path: PathBuf,
    /// Rows shown by `show` and in reports
    pub preview_rows: usize,
    pub default_file_domain: Domain,
    pub default_view_domain: Domain,
    /// Table name a join result is stored under when none is given
    pub join_result_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(".smart_reporter_history"),
            export_path: PathBuf::from("report.csv"),
            preview_rows: 20,
            default_file_domain: Domain::Finance,
            default_view_domain: Domain::Sales,
            join_result_name: "last_result".into(),
        }
    }
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self, Error> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Config::from_toml(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_toml("preview_rows = 5\ndefault_file_domain = \"HR\"\n").unwrap();
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.default_file_domain, Domain::HR);
        assert_eq!(config.export_path, PathBuf::from("report.csv"));
        assert_eq!(config.join_result_name, "last_result");
    }

    #[test]
    fn malformed_files_are_config_errors() {
        assert!(matches!(
            Config::from_toml("preview_rows = \"many\""),
            Err(Error::ConfigError(_))
        ));
    }
}

//! ManagerConfig - タスクマネージャの設定
//!
//! TOML から読み込む。全フィールド省略可（省略時はデフォルト値）。
//!
//! ```toml
//! idle_delay = 7
//! quit_on_empty_queue = false
//! wait_log_interval = 0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration read by the dispatch loop (and handed to config-aware job sources).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Seconds to wait after the source yields "no work".
    pub idle_delay: u64,

    /// Stop the loop on the first "no work" instead of backing off.
    pub quit_on_empty_queue: bool,

    /// Seconds between progress lines while idle. 0 disables them.
    pub wait_log_interval: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            idle_delay: 7,
            quit_on_empty_queue: false,
            wait_log_interval: 0,
        }
    }
}

/// ConfigError は設定ファイルの読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ManagerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = ManagerConfig::default();
        assert_eq!(config.idle_delay, 7);
        assert!(!config.quit_on_empty_queue);
        assert_eq!(config.wait_log_interval, 0);
    }

    #[rstest]
    #[case("", ManagerConfig::default())]
    #[case("idle_delay = 1", ManagerConfig { idle_delay: 1, ..ManagerConfig::default() })]
    #[case(
        "quit_on_empty_queue = true\nwait_log_interval = 5",
        ManagerConfig { quit_on_empty_queue: true, wait_log_interval: 5, ..ManagerConfig::default() }
    )]
    fn partial_toml_falls_back_to_defaults(#[case] raw: &str, #[case] expected: ManagerConfig) {
        let parsed: ManagerConfig = toml::from_str(raw).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "idle_delay = 60").unwrap();

        let config = ManagerConfig::load(file.path()).unwrap();
        assert_eq!(config.idle_delay, 60);
    }

    #[test]
    fn load_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "idle_delay = \"soon\"").unwrap();

        let err = ManagerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ManagerConfig::load(Path::new("/nonexistent/jobloop.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

//! Steward configuration.
//!
//! Loaded from `<root>/steward.toml`. Defaults apply when the file is missing;
//! command-line flags override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use serde::Deserialize;

/// Seconds between inbox polls when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Consecutive failed cycles after which the watcher gives up.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failure-threshold must be at least 1")]
    ZeroThreshold,
}

/// On-disk shape of `steward.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileConfig {
    poll_interval_secs: Option<u64>,
    failure_threshold: Option<u32>,
}

/// Watcher settings after file and flag overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    pub failure_threshold: u32,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Flag values from the command line. `None` means "not given".
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOverrides {
    pub poll_interval_secs: Option<u64>,
    pub failure_threshold: Option<u32>,
}

impl WatchSettings {
    /// Resolve settings: flag, then `steward.toml`, then the built-in default.
    pub fn load(path: &Path, overrides: WatchOverrides) -> Result<Self, ConfigError> {
        let file = read_file_config(path)?;
        let defaults = Self::default();

        let poll_interval = overrides
            .poll_interval_secs
            .or(file.poll_interval_secs)
            .map_or(defaults.poll_interval, Duration::from_secs);

        let failure_threshold = overrides
            .failure_threshold
            .or(file.failure_threshold)
            .unwrap_or(defaults.failure_threshold);

        if failure_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }

        Ok(Self {
            poll_interval,
            failure_threshold,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn config_path(dir: &TempDir) -> PathBuf {
        dir.path().join("steward.toml")
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = WatchSettings::load(&config_path(&dir), WatchOverrides::default()).unwrap();

        assert_eq!(settings, WatchSettings::default());
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.failure_threshold, 10);
    }

    #[test]
    fn file_values_apply() {
        let dir = TempDir::new().unwrap();
        fs::write(
            config_path(&dir),
            "poll-interval-secs = 30\nfailure-threshold = 3\n",
        )
        .unwrap();

        let settings = WatchSettings::load(&config_path(&dir), WatchOverrides::default()).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
        assert_eq!(settings.failure_threshold, 3);
    }

    #[test]
    fn flags_win_over_file() {
        let dir = TempDir::new().unwrap();
        fs::write(config_path(&dir), "poll-interval-secs = 30\n").unwrap();

        let overrides = WatchOverrides {
            poll_interval_secs: Some(1),
            failure_threshold: Some(2),
        };
        let settings = WatchSettings::load(&config_path(&dir), overrides).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.failure_threshold, 2);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let dir = TempDir::new().unwrap();
        let overrides = WatchOverrides {
            failure_threshold: Some(0),
            ..WatchOverrides::default()
        };
        let err = WatchSettings::load(&config_path(&dir), overrides).unwrap_err();

        assert!(matches!(err, ConfigError::ZeroThreshold));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(config_path(&dir), "poll-interval = 5\n").unwrap();

        let err = WatchSettings::load(&config_path(&dir), WatchOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

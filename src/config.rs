//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup. Unknown keys are rejected to catch typos early.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "keybridge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default `env_logger` filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    pub focus: FocusConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            focus: FocusConfig::default(),
        }
    }
}

/// Window the synthesizer raises before sending keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FocusConfig {
    pub enabled: bool,
    /// Executable file names, matched case-insensitively, in priority order.
    pub process_names: Vec<String>,
    pub settle_delay_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            process_names: vec![
                "MyWhooshHD.exe".into(),
                "indieVelo.exe".into(),
                "biketerra.exe".into(),
            ],
            settle_delay_ms: 50,
        }
    }
}

impl FocusConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` if given. Otherwise tries `keybridge.toml` and falls back
    /// to defaults when it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::read(p, true),
            None => Self::read(Path::new(DEFAULT_CONFIG_FILE), false),
        }
    }

    /// Reads and parses `path`. A missing file is an error only when
    /// `required` is set.
    fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
                log::debug!("config: {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, "info");
        assert!(config.focus.enabled);
        assert_eq!(config.focus.process_names.len(), 3);
        assert_eq!(config.focus.settle_delay(), Duration::from_millis(50));
    }

    #[test]
    fn partial_focus_section_keeps_other_defaults() {
        let config = parse(
            r#"
            [focus]
            process_names = ["Zwift.exe"]
            "#,
        )
        .unwrap();
        assert_eq!(config.focus.process_names, vec!["Zwift.exe".to_string()]);
        assert!(config.focus.enabled);
        assert_eq!(config.focus.settle_delay_ms, 50);
    }

    #[test]
    fn full_file_parses() {
        let config = parse(
            r#"
            log_level = "debug"

            [focus]
            enabled = false
            process_names = []
            settle_delay_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.focus.enabled);
        assert!(config.focus.process_names.is_empty());
        assert!(config.focus.settle_delay().is_zero());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse("log_levle = \"debug\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(parse("[focus]\nsettle_delay_ms = \"fast\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/keybridge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let config = Config::read(Path::new("/nonexistent/keybridge.toml"), false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn present_optional_file_is_parsed() {
        let path = std::env::temp_dir().join(format!("keybridge-{}.toml", std::process::id()));
        fs::write(&path, "log_level = \"warn\"\n").unwrap();
        let config = Config::read(&path, false);
        fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().log_level, "warn");
    }
}

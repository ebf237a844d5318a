//! TOML-based configuration for the dongle host.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KvmDongle\config.toml`
//! - Linux:    `~/.config/kvmdongle/config.toml`
//! - macOS:    `~/Library/Application Support/KvmDongle/config.toml`
//!
//! A file given with `--config` replaces the platform path.
//!
//! ```toml
//! [serial]
//! port = "/dev/tty.usbserial-1420"   # optional; discovery is used when absent
//! port_prefix = "tty.usbserial-"
//! baud_rate = 9600
//! write_timeout_ms = 400
//!
//! [input]
//! keymap = "macos"
//! key_up = "clear_all"               # or "carry_modifiers"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = ...)]`, and every section is
//! `#[serde(default)]`, so an empty file and a missing file both produce
//! [`AppConfig::default()`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use kvm_dongle_core::KeymapKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::forward_input::KeyUpPolicy;
use crate::infrastructure::transport::SerialSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial link settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Explicit port path.  When absent, `port_prefix` discovery is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// File-name prefix used to pick a port automatically.
    #[serde(default = "default_port_prefix")]
    pub port_prefix: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Upper bound on a single packet write.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

/// Key translation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Native key table for the host platform.
    #[serde(default)]
    pub keymap: KeymapKind,
    /// What the report after each key-down carries.
    #[serde(default)]
    pub key_up: KeyUpPolicy,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_port_prefix() -> String {
    "tty.usbserial-".to_string()
}
fn default_baud_rate() -> u32 {
    9600
}
fn default_write_timeout_ms() -> u64 {
    400
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            port_prefix: default_port_prefix(),
            baud_rate: default_baud_rate(),
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SerialConfig {
    /// Line settings for opening the port.
    pub fn settings(&self) -> SerialSettings {
        SerialSettings {
            baud_rate: self.baud_rate,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform path, returning the default if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning the default if it does not exist.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory, including the `KvmDongle` part.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KvmDongle"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kvmdongle"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KvmDongle")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kvm_dongle_test_{tag}_{}", std::process::id()))
            .join("config.toml")
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_serial_settings_match_chip() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.serial.port, None);
        assert_eq!(cfg.serial.port_prefix, "tty.usbserial-");
        assert_eq!(cfg.serial.baud_rate, 9600);
        assert_eq!(cfg.serial.write_timeout_ms, 400);
    }

    #[test]
    fn test_default_input_uses_macos_table_and_clear_all() {
        let cfg = InputConfig::default();
        assert_eq!(cfg.keymap, KeymapKind::Macos);
        assert_eq!(cfg.key_up, KeyUpPolicy::ClearAll);
    }

    #[test]
    fn test_default_log_level_is_info() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_serial_settings_conversion() {
        let mut cfg = SerialConfig::default();
        cfg.write_timeout_ms = 250;

        let settings = cfg.settings();

        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.write_timeout, Duration::from_millis(250));
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        // Arrange
        let toml_str = r#"
[serial]
port = "/dev/ttyUSB0"

[input]
key_up = "carry_modifiers"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cfg.serial.baud_rate, 9600);
        assert_eq!(cfg.input.key_up, KeyUpPolicy::CarryModifiers);
        assert_eq!(cfg.input.keymap, KeymapKind::Macos);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_unknown_enum_value_is_a_parse_error() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[input]\nkey_up = \"sometimes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_absent_port_is_omitted_from_output() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(!toml_str.contains("port ="), "None port must be omitted");
        assert!(toml_str.contains("port_prefix"));
    }

    // ── Files ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        // Arrange
        let path = temp_path("roundtrip");
        let mut cfg = AppConfig::default();
        cfg.serial.port = Some("COM4".to_string());
        cfg.logging.level = "debug".to_string();

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_malformed_file_is_a_parse_error() {
        // Arrange
        let path = temp_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}

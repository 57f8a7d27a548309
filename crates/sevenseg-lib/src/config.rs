//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::FileChannel;
use crate::protocol::{DEFAULT_DEVICE_PATH, DEFAULT_IO_TIMEOUT_MS, DEVICE_PATH_ENV};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device file exposed by the driver. Default: "/dev/sevenseg".
    #[serde(default = "default_device_path")]
    pub device_path: String,

    /// Upper bound for one device transaction in milliseconds. 0 = wait forever.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

fn default_device_path() -> String {
    DEFAULT_DEVICE_PATH.into()
}

fn default_io_timeout_ms() -> u64 {
    DEFAULT_IO_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device_path: default_device_path(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `device_path` is empty or whitespace-only.
    EmptyDevicePath,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyDevicePath => write!(f, "device_path cannot be empty"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sevenseg"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Replace `device_path` with a non-empty override.
    pub fn with_device_override(mut self, device: Option<&str>) -> Self {
        if let Some(d) = device.map(str::trim)
            && !d.is_empty()
        {
            self.device_path = d.to_string();
        }
        self
    }

    /// Apply the `SEVENSEG_DEVICE` environment variable, if set.
    pub fn apply_env(self) -> Self {
        let env = std::env::var(DEVICE_PATH_ENV).ok();
        if let Some(ref d) = env {
            log::debug!("{DEVICE_PATH_ENV}={d}");
        }
        self.with_device_override(env.as_deref())
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.device_path.trim().is_empty() {
            errors.push(ValidationError::EmptyDevicePath);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build the device channel this config describes.
    pub fn channel(&self) -> crate::error::Result<FileChannel> {
        if let Err(errors) = self.validate() {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(crate::SevensegError::Config(msgs.join("; ")));
        }
        Ok(FileChannel::new(&self.device_path).with_timeout(self.io_timeout()))
    }
}

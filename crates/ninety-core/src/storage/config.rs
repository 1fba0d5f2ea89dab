//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Ambient audio switch and tone parameters
//! - Runtime speed and polling resolution
//! - An optional replacement for the built-in text catalog
//!
//! Configuration is stored at `~/.config/ninety/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::audio::AmbientTone;
use crate::error::{ConfigError, Result};
use crate::texts::TextCatalog;

/// Ambient audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Off by default; hosts have to opt in to sound.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_hz")]
    pub base_hz: f64,
    #[serde(default = "default_overtone_hz")]
    pub overtone_hz: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_fade_secs")]
    pub fade_secs: u64,
}

/// Real-time runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Wall-clock multiplier. 2.0 runs a session in 45 real seconds.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// How often the runner advances the session clock.
    #[serde(default = "default_resolution_ms")]
    pub resolution_ms: u64,
    /// Return to the start screen as soon as an interruption is flagged.
    #[serde(default = "default_true")]
    pub reset_on_interruption: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ninety/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Replaces the built-in catalog when present.
    #[serde(default)]
    pub texts: Option<TextCatalog>,
}

// Default functions
fn default_base_hz() -> f64 {
    80.0
}
fn default_overtone_hz() -> f64 {
    120.0
}
fn default_gain() -> f64 {
    0.02
}
fn default_fade_secs() -> u64 {
    1
}
fn default_speed() -> f64 {
    1.0
}
/// Upper bound for `runtime.speed`.
pub const MAX_SPEED: f64 = 1_000.0;

fn default_resolution_ms() -> u64 {
    100
}
fn default_true() -> bool {
    true
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_hz: default_base_hz(),
            overtone_hz: default_overtone_hz(),
            gain: default_gain(),
            fade_secs: default_fade_secs(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            resolution_ms: default_resolution_ms(),
            reset_on_interruption: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Unset optional sections take a JSON document.
                    serde_json::Value::Object(_)
                    | serde_json::Value::Array(_)
                    | serde_json::Value::Null => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Reject values a session or runner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.runtime.speed > 0.0 && self.runtime.speed <= MAX_SPEED) {
            return Err(ConfigError::InvalidValue {
                key: "runtime.speed".into(),
                message: format!("must be greater than 0 and at most {MAX_SPEED}"),
            }
            .into());
        }
        if self.runtime.resolution_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "runtime.resolution_ms".into(),
                message: "must be greater than zero".into(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.audio.gain) {
            return Err(ConfigError::InvalidValue {
                key: "audio.gain".into(),
                message: "must be between 0.0 and 1.0".into(),
            }
            .into());
        }
        if let Some(texts) = &self.texts {
            texts.validate()?;
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Update one value in memory. The result is validated as a whole.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Text catalog sessions should draw from.
    pub fn catalog(&self) -> TextCatalog {
        self.texts.clone().unwrap_or_default()
    }

    pub fn tone(&self) -> AmbientTone {
        AmbientTone {
            base_hz: self.audio.base_hz,
            overtone_hz: self.audio.overtone_hz,
            gain: self.audio.gain,
            fade_secs: self.audio.fade_secs,
        }
    }
}

//! Overhead camera settings and the TOML file they live in.
//!
//! Settings are read once at startup. Missing keys take their defaults, a
//! missing file is created with defaults, and a file that fails to parse or
//! validate is left untouched while the defaults are used.

use std::path::Path;
use std::{fmt, fs, io};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Default settings location, relative to the working directory.
pub const SETTINGS_FILE: &str = "assets/config/overhead_camera.config.toml";

#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OverheadSettings {
  /// Pitch below the horizon, in degrees.
  pub camera_angle: f32,
  /// Vertical field of view, in degrees.
  pub camera_fov: f32,
  pub camera_height: f32,
  /// How far the camera may travel towards the team's own end.
  pub home_max_distance: f32,
  /// How far the camera may travel towards the opposing end.
  pub away_max_distance: f32,
  /// Half width of the dead zone around the camera's target.
  pub buffer_zone_size: f32,
  /// Distance the camera trails behind the puck.
  pub camera_offset: f32,
  pub toggle_key: KeyCode,
  pub reset_key: KeyCode,
}

impl Default for OverheadSettings {
  fn default() -> Self {
    Self {
      camera_angle: 75.0,
      camera_fov: 90.0,
      camera_height: 20.0,
      home_max_distance: 40.0,
      away_max_distance: 20.0,
      buffer_zone_size: 3.0,
      camera_offset: 8.36,
      toggle_key: KeyCode::KeyG,
      reset_key: KeyCode::Insert,
    }
  }
}

/// Error reading, writing or validating a settings file.
#[derive(Debug)]
pub enum SettingsError {
  Io(io::Error),
  Parse(toml::de::Error),
  Serialize(toml::ser::Error),
  /// A value is out of its allowed range.
  Invalid(String),
}

impl fmt::Display for SettingsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "I/O error: {e}"),
      Self::Parse(e) => write!(f, "parse error: {e}"),
      Self::Serialize(e) => write!(f, "serialize error: {e}"),
      Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
    }
  }
}

impl std::error::Error for SettingsError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Parse(e) => Some(e),
      Self::Serialize(e) => Some(e),
      Self::Invalid(_) => None,
    }
  }
}

impl From<io::Error> for SettingsError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<toml::de::Error> for SettingsError {
  fn from(err: toml::de::Error) -> Self {
    Self::Parse(err)
  }
}

impl From<toml::ser::Error> for SettingsError {
  fn from(err: toml::ser::Error) -> Self {
    Self::Serialize(err)
  }
}

impl OverheadSettings {
  /// Checks that every value can drive the camera.
  pub fn validate(&self) -> Result<(), SettingsError> {
    let values = [
      ("camera_angle", self.camera_angle),
      ("camera_fov", self.camera_fov),
      ("camera_height", self.camera_height),
      ("home_max_distance", self.home_max_distance),
      ("away_max_distance", self.away_max_distance),
      ("buffer_zone_size", self.buffer_zone_size),
      ("camera_offset", self.camera_offset),
    ];
    if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
      return Err(SettingsError::Invalid(format!(
        "{name} must be finite, got {value}"
      )));
    }

    if self.camera_fov <= 0.0 || self.camera_fov >= 180.0 {
      return Err(SettingsError::Invalid(format!(
        "camera_fov must be between 0 and 180 degrees, got {}",
        self.camera_fov
      )));
    }

    for (name, value) in [
      ("home_max_distance", self.home_max_distance),
      ("away_max_distance", self.away_max_distance),
      ("buffer_zone_size", self.buffer_zone_size),
    ] {
      if value < 0.0 {
        return Err(SettingsError::Invalid(format!(
          "{name} must not be negative, got {value}"
        )));
      }
    }

    Ok(())
  }

  /// Reads and validates a settings file. `Ok(None)` when the file is missing.
  pub fn read(path: &Path) -> Result<Option<Self>, SettingsError> {
    if !path.exists() {
      return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let settings: Self = toml::from_str(&contents)?;
    settings.validate()?;
    Ok(Some(settings))
  }

  /// Writes the settings, creating parent directories as needed.
  pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent)?;
      info!("Created missing settings directory {}", parent.display());
    }
    let contents = toml::to_string_pretty(self)?;
    fs::write(path, contents)?;
    Ok(())
  }

  /// Loads the settings file, falling back to defaults.
  ///
  /// A readable file (or a missing one) is written back so that keys added
  /// since it was last saved show up with their defaults. A broken file is
  /// never overwritten.
  pub fn load_or_create(path: &Path) -> Self {
    let settings = match Self::read(path) {
      Ok(Some(settings)) => {
        info!("Loaded overhead camera settings from {}", path.display());
        settings
      }
      Ok(None) => {
        info!(
          "Settings file {} did not exist, creating it with defaults",
          path.display()
        );
        Self::default()
      }
      Err(e) => {
        warn!("Failed to load {}: {e}, using defaults", path.display());
        return Self::default();
      }
    };

    if let Err(e) = settings.save(path) {
      warn!("Failed to write {}: {e}", path.display());
    }
    settings
  }
}

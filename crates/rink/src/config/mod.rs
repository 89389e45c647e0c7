mod plugin;

use std::path::{Path, PathBuf};

use bevy::{asset::Asset, prelude::*, reflect::TypePath};
use overhead_camera::OverheadSettings;
pub use plugin::ConfigPlugin;
use serde::Deserialize;

/// The settings file, loaded a second time through the asset server so edits
/// are picked up while the game runs.
#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct SettingsAsset(pub OverheadSettings);

#[derive(Resource)]
pub struct SettingsHandle(pub Handle<SettingsAsset>);

/// Where the settings file lives on disk.
#[derive(Resource, Clone, Debug)]
pub struct SettingsPath(pub PathBuf);

/// `file` relative to the asset root, or `None` when it lives outside of it
/// and cannot be hot reloaded.
pub fn asset_path(file: &Path) -> Option<PathBuf> {
  file
    .strip_prefix("assets")
    .ok()
    .filter(|relative| !relative.as_os_str().is_empty())
    .map(Path::to_path_buf)
}

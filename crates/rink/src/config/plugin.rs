use std::path::PathBuf;

use bevy::{asset::AssetEvent, ecs::message::MessageReader, prelude::*};
use bevy_common_assets::toml::TomlAssetPlugin;
use overhead_camera::{OverheadCameraSet, OverheadSettings};

use super::{SettingsAsset, SettingsHandle, SettingsPath, asset_path};

pub struct ConfigPlugin {
  path: PathBuf,
}

impl ConfigPlugin {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app
      .insert_resource(SettingsPath(self.path.clone()))
      .add_systems(PreStartup, load_settings);

    if asset_path(&self.path).is_none() {
      info!(
        "{} is outside the asset folder, settings hot reload disabled",
        self.path.display()
      );
      return;
    }

    app
      .add_plugins(TomlAssetPlugin::<SettingsAsset>::new(&["config.toml"]))
      .add_systems(PreStartup, watch_settings_file)
      .add_systems(Update, watch_settings_changes.before(OverheadCameraSet));
  }
}

fn load_settings(mut commands: Commands, path: Res<SettingsPath>) {
  commands.insert_resource(OverheadSettings::load_or_create(&path.0));
}

fn watch_settings_file(
  mut commands: Commands,
  path: Res<SettingsPath>,
  asset_server: Res<AssetServer>,
) {
  let Some(asset) = asset_path(&path.0) else {
    return;
  };
  let handle: Handle<SettingsAsset> = asset_server.load(asset);
  commands.insert_resource(SettingsHandle(handle));
}

fn watch_settings_changes(
  handle: Res<SettingsHandle>,
  mut messages: MessageReader<AssetEvent<SettingsAsset>>,
  assets: Res<Assets<SettingsAsset>>,
  mut settings: ResMut<OverheadSettings>,
) {
  for event in messages.read() {
    if let AssetEvent::Modified { id } = event
      && handle.0.id() == *id
      && let Some(asset) = assets.get(&handle.0)
    {
      match asset.0.validate() {
        Ok(()) => {
          if settings.set_if_neq(asset.0.clone()) {
            info!("Overhead camera settings reloaded");
          }
        }
        Err(e) => warn!("Ignoring reloaded overhead camera settings: {e}"),
      }
    }
  }
}

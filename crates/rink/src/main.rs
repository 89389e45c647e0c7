mod chat;
mod config;
mod rink;

use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;
use overhead_camera::{OverheadCameraPlugin, SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(name = "rink", about = "Practice rink with an overhead camera")]
struct Cli {
  /// Dedicated server mode: no window, no client-side camera.
  #[arg(long)]
  headless: bool,

  /// Overhead camera settings file.
  #[arg(long, default_value = SETTINGS_FILE)]
  config: PathBuf,
}

fn build_app(cli: &Cli) -> App {
  let mut app = App::new();

  // The overhead camera is a client feature; a server has nothing to render.
  if cli.headless {
    app
      .add_plugins((MinimalPlugins, bevy::log::LogPlugin::default()))
      .add_systems(Startup, || {
        info!("Running headless, overhead camera is client-only and stays disabled");
      });
    return app;
  }

  app
    .add_plugins(DefaultPlugins.set(WindowPlugin {
      primary_window: Some(Window {
        title: "Rink".to_string(),
        ..default()
      }),
      ..default()
    }))
    .add_plugins(config::ConfigPlugin::new(&cli.config))
    .add_plugins(chat::ChatPlugin)
    .add_plugins(rink::RinkPlugin)
    .add_plugins(OverheadCameraPlugin);
  app
}

fn main() {
  let cli = Cli::parse();
  build_app(&cli).run();
}

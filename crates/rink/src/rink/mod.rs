//! A bare practice rink: ice, one local player and a puck skating up and down.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use overhead_camera::{
  ChatFocus, FirstPersonCamera, LocalPlayer, LocalPlayerBody, OverheadCameraSet, Puck, Team,
  TeamChanged,
};

const RINK_LENGTH: f32 = 60.0;
const RINK_WIDTH: f32 = 26.0;
/// How far from center ice the puck travels along Z.
const PUCK_TRAVEL: f32 = 25.0;
const PLAYER_DEPTH: f32 = 20.0;
const EYE_HEIGHT: f32 = 1.7;
/// Debug binding that moves the local player to the other team.
const SWITCH_TEAM_KEY: KeyCode = KeyCode::KeyT;

pub struct RinkPlugin;

impl Plugin for RinkPlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<ChatFocus>()
      .add_message::<TeamChanged>()
      .add_systems(Startup, spawn_rink)
      .add_systems(
        Update,
        (move_puck, switch_team).before(OverheadCameraSet),
      );
  }
}

fn spawn_rink(
  mut commands: Commands,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  commands.spawn((
    Name::new("Ice"),
    Mesh3d(meshes.add(Plane3d::default().mesh().size(RINK_WIDTH, RINK_LENGTH))),
    MeshMaterial3d(materials.add(Color::srgb(0.92, 0.96, 1.0))),
    Transform::default(),
  ));

  commands.spawn((
    DirectionalLight {
      illuminance: 10_000.0,
      shadows_enabled: true,
      ..default()
    },
    Transform::from_xyz(4.0, 30.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
  ));

  let team = Team::Blue;
  let player = commands
    .spawn((
      Name::new("Local Player"),
      LocalPlayer,
      team,
      player_transform(team),
      Visibility::default(),
    ))
    .id();

  let body_mesh = meshes.add(Capsule3d::new(0.4, 1.0));
  let body_material = materials.add(Color::srgb(0.2, 0.35, 0.9));
  commands.entity(player).with_children(|parent| {
    parent.spawn((
      Name::new("Player Body"),
      LocalPlayerBody,
      Mesh3d(body_mesh),
      MeshMaterial3d(body_material),
      Transform::from_xyz(0.0, 0.9, 0.0),
      Visibility::Hidden,
    ));
    parent.spawn((
      Name::new("First Person Camera"),
      FirstPersonCamera { player },
      Camera3d::default(),
      Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
    ));
  });

  commands.spawn((
    Name::new("Puck"),
    Puck,
    Mesh3d(meshes.add(Cylinder::new(0.15, 0.05))),
    MeshMaterial3d(materials.add(Color::srgb(0.05, 0.05, 0.05))),
    Transform::from_translation(puck_position(0.0)),
  ));
}

/// Players stand in front of their own net, facing the far end.
fn player_transform(team: Team) -> Transform {
  let depth = match team {
    Team::Blue => PLAYER_DEPTH,
    Team::Red => -PLAYER_DEPTH,
  };
  Transform::from_xyz(0.0, 0.0, depth).with_rotation(Quat::from_rotation_y(team.facing_yaw()))
}

fn puck_position(elapsed: f32) -> Vec3 {
  Vec3::new(
    5.0 * (elapsed * 0.9).sin(),
    0.025,
    PUCK_TRAVEL * (elapsed * 0.4).sin(),
  )
}

fn move_puck(time: Res<Time>, mut pucks: Query<&mut Transform, With<Puck>>) {
  for mut transform in &mut pucks {
    transform.translation = puck_position(time.elapsed_secs());
  }
}

fn switch_team(
  keys: Res<ButtonInput<KeyCode>>,
  chat: Res<ChatFocus>,
  mut players: Query<(Entity, &mut Team, &mut Transform), With<LocalPlayer>>,
  mut changes: MessageWriter<TeamChanged>,
) {
  if chat.0 || !keys.just_pressed(SWITCH_TEAM_KEY) {
    return;
  }
  for (player, mut team, mut transform) in &mut players {
    let old = *team;
    let new = match old {
      Team::Blue => Team::Red,
      Team::Red => Team::Blue,
    };
    *team = new;
    *transform = player_transform(new);
    info!("Switched local player to {new:?}");
    changes.write(TeamChanged { player, old, new });
  }
}

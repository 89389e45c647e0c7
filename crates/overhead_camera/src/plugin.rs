use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::controller::{FrameInput, LocalPlayerFrame, OverheadCameraController};
use crate::lifecycle::PlayerCamera;
use crate::settings::OverheadSettings;
use crate::sync::BodyMesh;
use crate::team::{Team, TeamChangeBus, TeamChanged};
use crate::toggle::ToggleInput;

/// Marker for the player this client controls.
#[derive(Component)]
pub struct LocalPlayer;

/// A player's first-person camera.
#[derive(Component)]
pub struct FirstPersonCamera {
  pub player: Entity,
}

/// Meshes of the local player's own body, hidden in first-person view.
#[derive(Component)]
pub struct LocalPlayerBody;

#[derive(Component)]
pub struct Puck;

/// The overhead camera entity spawned for one controller camera generation.
#[derive(Component)]
pub struct OverheadCameraView {
  pub generation: u32,
}

/// Set by the host while a text input (the chat box) has keyboard focus.
#[derive(Resource, Default)]
pub struct ChatFocus(pub bool);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverheadCameraSet;

pub struct OverheadCameraPlugin;

impl Plugin for OverheadCameraPlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<OverheadSettings>()
      .init_resource::<ButtonInput<KeyCode>>()
      .init_resource::<ChatFocus>()
      .init_resource::<OverheadCameraController>()
      .init_resource::<TeamChangeBus<OverheadCameraController>>()
      .add_message::<TeamChanged>()
      .add_systems(
        Update,
        (
          dispatch_team_changes,
          tick_overhead_camera,
          apply_camera_state,
        )
          .chain()
          .in_set(OverheadCameraSet),
      );
  }
}

fn dispatch_team_changes(
  mut changes: MessageReader<TeamChanged>,
  bus: Res<TeamChangeBus<OverheadCameraController>>,
  mut controller: ResMut<OverheadCameraController>,
) {
  for change in changes.read() {
    bus.publish(change, &mut controller);
  }
}

/// Samples the world into a [`FrameInput`] and runs the controller.
fn tick_overhead_camera(
  settings: Res<OverheadSettings>,
  keys: Res<ButtonInput<KeyCode>>,
  chat: Res<ChatFocus>,
  mut controller: ResMut<OverheadCameraController>,
  mut bus: ResMut<TeamChangeBus<OverheadCameraController>>,
  players: Query<(Entity, &Team), With<LocalPlayer>>,
  player_cameras: Query<(Entity, &FirstPersonCamera, &Camera)>,
  overhead_cameras: Query<(&OverheadCameraView, &Camera)>,
  pucks: Query<&Transform, With<Puck>>,
) {
  if settings.is_changed() && !settings.is_added() {
    info!("{} Settings changed, re-initializing overhead camera", controller.tag());
    controller.request_reinitialize();
  }

  // Only the local player's own first-person camera drives the controller.
  let local_player = players.single().ok().and_then(|(player, team)| {
    player_cameras
      .iter()
      .find(|(_, first_person, _)| first_person.player == player)
      .map(|(entity, _, camera)| LocalPlayerFrame {
        player,
        team: *team,
        camera: PlayerCamera {
          entity,
          enabled: camera.is_active,
        },
      })
  });

  let generation = controller.lifecycle().overhead().map(|camera| camera.generation);
  let overhead_enabled = overhead_cameras
    .iter()
    .find(|(view, _)| Some(view.generation) == generation)
    .map(|(_, camera)| camera.is_active);

  let frame = FrameInput {
    local_player,
    keys: ToggleInput {
      chat_focused: chat.0,
      toggle_down: keys.pressed(settings.toggle_key),
      reset_just_pressed: keys.just_pressed(settings.reset_key),
    },
    puck: pucks.iter().next().map(|transform| transform.translation),
    overhead_enabled,
  };

  controller.tick(&frame, &settings, &mut bus);
}

/// Mirrors the controller's cameras onto entities and applies queued effects.
fn apply_camera_state(
  mut commands: Commands,
  mut controller: ResMut<OverheadCameraController>,
  mut overhead_cameras: Query<
    (
      Entity,
      &OverheadCameraView,
      &mut Camera,
      &mut Transform,
      &mut Projection,
    ),
    Without<FirstPersonCamera>,
  >,
  mut player_cameras: Query<&mut Camera, (With<FirstPersonCamera>, Without<OverheadCameraView>)>,
  mut bodies: Query<&mut Visibility, With<LocalPlayerBody>>,
) {
  let wanted = controller.lifecycle().overhead().cloned();
  let mut spawned = false;

  for (entity, view, mut camera, mut transform, mut projection) in &mut overhead_cameras {
    match &wanted {
      Some(overhead) if overhead.generation == view.generation => {
        spawned = true;
        if camera.is_active != overhead.enabled {
          camera.is_active = overhead.enabled;
        }
        transform.set_if_neq(overhead.transform);
        let fov_changed =
          matches!(&*projection, Projection::Perspective(p) if p.fov != overhead.fov);
        if fov_changed && let Projection::Perspective(perspective) = projection.as_mut() {
          perspective.fov = overhead.fov;
        }
      }
      _ => {
        debug!("Despawning overhead camera generation {}", view.generation);
        commands.entity(entity).despawn();
      }
    }
  }

  if let Some(overhead) = wanted
    && !spawned
  {
    debug!("Spawning overhead camera generation {}", overhead.generation);
    commands.spawn((
      Name::new("Overhead Camera"),
      OverheadCameraView {
        generation: overhead.generation,
      },
      Camera3d::default(),
      Camera {
        is_active: overhead.enabled,
        order: 1,
        ..default()
      },
      Projection::Perspective(PerspectiveProjection {
        fov: overhead.fov,
        ..default()
      }),
      overhead.transform,
    ));
  }

  if let Some(player) = controller.lifecycle().player_camera()
    && let Ok(mut camera) = player_cameras.get_mut(player.entity)
    && camera.is_active != player.enabled
  {
    camera.is_active = player.enabled;
  }

  let effects = controller.take_effects();
  if let Some(entity) = effects.restore_player_camera
    && let Ok(mut camera) = player_cameras.get_mut(entity)
    && !camera.is_active
  {
    camera.is_active = true;
  }
  if let Some(body) = effects.body {
    let visibility = match body {
      BodyMesh::Show => Visibility::Inherited,
      BodyMesh::Hide => Visibility::Hidden,
    };
    for mut body_visibility in &mut bodies {
      body_visibility.set_if_neq(visibility);
    }
  }
}

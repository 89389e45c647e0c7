//! Ownership of the overhead camera and the borrowed player camera.

use bevy::prelude::*;

use crate::settings::OverheadSettings;
use crate::team::Team;
use crate::CameraError;

/// The overhead camera as the controller sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverheadCamera {
  pub transform: Transform,
  /// Vertical field of view, in radians.
  pub fov: f32,
  pub enabled: bool,
  /// Bumped on every creation, so a camera destroyed and recreated within one
  /// frame is still a different camera.
  pub generation: u32,
}

/// The local player's first-person camera. Not owned, only toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCamera {
  pub entity: Entity,
  pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CameraSlot {
  #[default]
  Absent,
  Present(OverheadCamera),
}

#[derive(Debug, Default)]
pub struct CameraLifecycle {
  overhead: CameraSlot,
  player_camera: Option<PlayerCamera>,
  initialized: bool,
  generations: u32,
}

impl CameraLifecycle {
  /// Creates the overhead camera if it is absent. Returns `true` when a new
  /// camera was created.
  pub fn ensure_exists(&mut self, enabled: bool) -> bool {
    if matches!(self.overhead, CameraSlot::Present(_)) {
      return false;
    }
    self.generations = self.generations.wrapping_add(1);
    self.overhead = CameraSlot::Present(OverheadCamera {
      transform: Transform::default(),
      fov: OverheadSettings::default().camera_fov.to_radians(),
      enabled,
      generation: self.generations,
    });
    true
  }

  /// Binds the player camera, or refreshes its enabled flag if the same camera
  /// is already bound.
  pub fn bind_player_camera(&mut self, camera: PlayerCamera) {
    match &mut self.player_camera {
      Some(bound) if bound.entity == camera.entity => bound.enabled = camera.enabled,
      slot => *slot = Some(camera),
    }
  }

  /// Positions and orients the overhead camera for `team`.
  pub fn initialize(&mut self, team: Team, settings: &OverheadSettings) -> Result<(), CameraError> {
    settings.validate().map_err(CameraError::InvalidSettings)?;
    let camera = self.overhead_mut().ok_or(CameraError::OverheadCameraAbsent)?;

    camera.transform = Transform::from_xyz(0.0, settings.camera_height, 0.0).with_rotation(
      Quat::from_euler(
        EulerRot::YXZ,
        team.facing_yaw(),
        -settings.camera_angle.to_radians(),
        0.0,
      ),
    );
    camera.fov = settings.camera_fov.to_radians();
    self.initialized = true;
    Ok(())
  }

  /// Destroys the overhead camera and forgets everything derived from it.
  ///
  /// Returns the player camera that was bound, so the caller can hand control
  /// back to it.
  pub fn reset(&mut self) -> Option<PlayerCamera> {
    if let CameraSlot::Present(camera) = &self.overhead {
      info!("Destroying overhead camera (generation {})", camera.generation);
    }
    self.overhead = CameraSlot::Absent;
    self.initialized = false;
    self.player_camera.take()
  }

  /// Forces re-initialization on the next tick without destroying anything.
  pub fn invalidate(&mut self) {
    self.initialized = false;
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn slot(&self) -> &CameraSlot {
    &self.overhead
  }

  pub fn overhead(&self) -> Option<&OverheadCamera> {
    match &self.overhead {
      CameraSlot::Present(camera) => Some(camera),
      CameraSlot::Absent => None,
    }
  }

  pub fn overhead_mut(&mut self) -> Option<&mut OverheadCamera> {
    match &mut self.overhead {
      CameraSlot::Present(camera) => Some(camera),
      CameraSlot::Absent => None,
    }
  }

  pub fn player_camera(&self) -> Option<PlayerCamera> {
    self.player_camera
  }

  /// Both cameras, when both are available.
  pub fn cameras_mut(&mut self) -> Result<(&mut OverheadCamera, &mut PlayerCamera), CameraError> {
    match (&mut self.overhead, &mut self.player_camera) {
      (CameraSlot::Present(overhead), Some(player)) => Ok((overhead, player)),
      (CameraSlot::Absent, _) => Err(CameraError::OverheadCameraAbsent),
      (CameraSlot::Present(_), None) => Err(CameraError::PlayerCameraUnbound),
    }
  }
}

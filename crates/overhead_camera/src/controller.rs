//! Per-frame orchestration of the overhead camera.
//!
//! The controller owns all camera state. Each frame the host hands it a
//! [`FrameInput`] snapshot and calls [`OverheadCameraController::tick`]; the
//! controller never fails the frame. Anything that goes wrong ends in a full
//! reset and the camera is rebuilt on the next tick.

use std::fmt;

use bevy::prelude::*;
use rand::Rng;

use crate::lifecycle::{CameraLifecycle, PlayerCamera};
use crate::settings::{OverheadSettings, SettingsError};
use crate::sync::{self, BodyMesh, SyncOutcome};
use crate::team::{Team, TeamChangeBus, TeamChanged};
use crate::toggle::{CameraToggle, ToggleInput, ToggleOutcome};
use crate::tracking;

#[derive(Debug)]
pub enum CameraError {
  /// No puck on the ice, or it has no usable position.
  MissingPuck,
  OverheadCameraAbsent,
  PlayerCameraUnbound,
  InvalidSettings(SettingsError),
}

impl fmt::Display for CameraError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingPuck => write!(f, "no puck to track"),
      Self::OverheadCameraAbsent => write!(f, "overhead camera does not exist"),
      Self::PlayerCameraUnbound => write!(f, "no player camera bound"),
      Self::InvalidSettings(e) => write!(f, "{e}"),
    }
  }
}

impl std::error::Error for CameraError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::InvalidSettings(e) => Some(e),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
  ResetKey,
  TeamChanged,
  InitializationFailed,
  NoActiveCamera,
  LocalPlayerReplaced,
  /// An error nothing else handled.
  Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  /// No local player yet.
  Skipped,
  Tracking,
  Reset(ResetReason),
}

/// The local player and its first-person camera as the host sees them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPlayerFrame {
  pub player: Entity,
  pub team: Team,
  pub camera: PlayerCamera,
}

/// Everything the controller reads from the host for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
  pub local_player: Option<LocalPlayerFrame>,
  pub keys: ToggleInput,
  pub puck: Option<Vec3>,
  /// Whether the host currently renders the overhead camera, if it has spawned
  /// the controller's current one.
  pub overhead_enabled: Option<bool>,
}

/// Changes the host applies outside the two camera records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingEffects {
  pub body: Option<BodyMesh>,
  /// Player camera to switch back on after a reset.
  pub restore_player_camera: Option<Entity>,
}

/// Random tag prefixed to every log line of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTag(String);

impl InstanceTag {
  pub fn random() -> Self {
    Self(format!("OHC_{}", rand::rng().random_range(10000..99999)))
  }

  pub fn new(tag: impl Into<String>) -> Self {
    Self(tag.into())
  }
}

impl fmt::Display for InstanceTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Resource, Debug)]
pub struct OverheadCameraController {
  tag: InstanceTag,
  local_player: Option<Entity>,
  toggle: CameraToggle,
  lifecycle: CameraLifecycle,
  effects: PendingEffects,
  tracking_failed: bool,
}

impl Default for OverheadCameraController {
  fn default() -> Self {
    Self::new()
  }
}

impl OverheadCameraController {
  pub fn new() -> Self {
    Self::with_tag(InstanceTag::random())
  }

  pub fn with_tag(tag: InstanceTag) -> Self {
    Self {
      tag,
      local_player: None,
      toggle: CameraToggle::default(),
      lifecycle: CameraLifecycle::default(),
      effects: PendingEffects::default(),
      tracking_failed: false,
    }
  }

  /// Runs one frame. Never fails; problems end in a reset.
  pub fn tick(
    &mut self,
    frame: &FrameInput,
    settings: &OverheadSettings,
    bus: &mut TeamChangeBus<Self>,
  ) -> TickOutcome {
    let Some(local) = frame.local_player else {
      return TickOutcome::Skipped;
    };
    if let Some(reason) = self.bind_local_player(local.player, bus) {
      return TickOutcome::Reset(reason);
    }

    match self.run(&local, frame, settings) {
      Ok(outcome) => outcome,
      Err(e) => {
        error!("{} Error in camera tick: {e}", self.tag);
        self.reset(ResetReason::Fault);
        TickOutcome::Reset(ResetReason::Fault)
      }
    }
  }

  fn bind_local_player(
    &mut self,
    player: Entity,
    bus: &mut TeamChangeBus<Self>,
  ) -> Option<ResetReason> {
    match self.local_player {
      Some(bound) if bound == player => None,
      Some(previous) => {
        info!("{} Local player changed from {previous} to {player}", self.tag);
        bus.unsubscribe(previous);
        self.local_player = Some(player);
        bus.subscribe(player, Self::on_team_changed);
        self.reset(ResetReason::LocalPlayerReplaced);
        Some(ResetReason::LocalPlayerReplaced)
      }
      None => {
        info!("{} Local player reference established: {player}", self.tag);
        self.local_player = Some(player);
        bus.subscribe(player, Self::on_team_changed);
        None
      }
    }
  }

  fn run(
    &mut self,
    local: &LocalPlayerFrame,
    frame: &FrameInput,
    settings: &OverheadSettings,
  ) -> Result<TickOutcome, CameraError> {
    let mut player_camera = local.camera;
    if self.effects.restore_player_camera == Some(player_camera.entity) {
      // Reset earlier this frame; the host has not switched it back on yet.
      player_camera.enabled = true;
    }
    self.lifecycle.bind_player_camera(player_camera);
    if self.lifecycle.ensure_exists(self.toggle.overhead_active()) {
      info!("{} Creating new overhead camera", self.tag);
    } else if let (Some(enabled), Some(camera)) =
      (frame.overhead_enabled, self.lifecycle.overhead_mut())
    {
      camera.enabled = enabled;
    }

    match self.toggle.update(frame.keys) {
      ToggleOutcome::Idle => {}
      ToggleOutcome::Toggled => {
        debug!(
          "{} Overhead view {}",
          self.tag,
          if self.toggle.overhead_active() { "requested" } else { "dismissed" }
        );
      }
      ToggleOutcome::ResetRequested => {
        info!("{} Manual camera reset requested", self.tag);
        self.reset(ResetReason::ResetKey);
        return Ok(TickOutcome::Reset(ResetReason::ResetKey));
      }
    }

    if !self.lifecycle.is_initialized() {
      info!("{} Initializing overhead camera for team: {:?}", self.tag, local.team);
      if let Err(e) = self.lifecycle.initialize(local.team, settings) {
        error!("{} Failed to initialize overhead camera: {e}", self.tag);
        self.reset(ResetReason::InitializationFailed);
        return Ok(TickOutcome::Reset(ResetReason::InitializationFailed));
      }
      info!("{} Overhead camera initialized successfully", self.tag);
    }

    let camera = self
      .lifecycle
      .overhead_mut()
      .ok_or(CameraError::OverheadCameraAbsent)?;
    match tracking::follow_puck(camera, local.team, frame.puck, settings) {
      Ok(_) => self.tracking_failed = false,
      Err(e) if self.tracking_failed => debug!("{} Puck tracking still failing: {e}", self.tag),
      Err(e) => {
        warn!("{} Puck tracking failed, camera holds position: {e}", self.tag);
        self.tracking_failed = true;
      }
    }

    let overhead_active = self.toggle.overhead_active();
    let (overhead, player) = self.lifecycle.cameras_mut()?;
    match sync::reconcile(overhead, player, overhead_active) {
      SyncOutcome::Unchanged => {}
      SyncOutcome::Switched(body) => {
        self.effects.body = Some(body);
        debug!(
          "{} Camera states updated: overhead={overhead_active}, player={}",
          self.tag, !overhead_active
        );
      }
      SyncOutcome::NoActiveCamera => {
        error!("{} Neither camera is active", self.tag);
        self.reset(ResetReason::NoActiveCamera);
        return Ok(TickOutcome::Reset(ResetReason::NoActiveCamera));
      }
    }

    Ok(TickOutcome::Tracking)
  }

  /// Full reset: destroys the overhead camera, drops back to first-person and
  /// clears the initialization flag. Safe to call at any time.
  pub fn reset(&mut self, reason: ResetReason) {
    if let Some(camera) = self.lifecycle.reset() {
      self.effects.restore_player_camera = Some(camera.entity);
      self.effects.body = Some(BodyMesh::Hide);
    }
    self.toggle.clear();
    self.tracking_failed = false;
    info!("{} Camera system has been reset ({reason:?})", self.tag);
  }

  fn on_team_changed(&mut self, change: &TeamChanged) {
    if self.local_player != Some(change.player) {
      return;
    }
    info!(
      "{} Local player team changed from {:?} to {:?}",
      self.tag, change.old, change.new
    );
    self.reset(ResetReason::TeamChanged);
  }

  /// Re-runs initialization on the next tick, e.g. after settings changed.
  pub fn request_reinitialize(&mut self) {
    self.lifecycle.invalidate();
  }

  /// Drains the effects queued since the last call.
  pub fn take_effects(&mut self) -> PendingEffects {
    std::mem::take(&mut self.effects)
  }

  pub fn overhead_active(&self) -> bool {
    self.toggle.overhead_active()
  }

  pub fn is_initialized(&self) -> bool {
    self.lifecycle.is_initialized()
  }

  pub fn local_player(&self) -> Option<Entity> {
    self.local_player
  }

  pub fn lifecycle(&self) -> &CameraLifecycle {
    &self.lifecycle
  }

  pub fn tag(&self) -> &InstanceTag {
    &self.tag
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lifecycle::CameraSlot;

  /// Plays the host: feeds frames and applies the controller's camera state
  /// back the way the plugin does.
  struct Host {
    world: World,
    controller: OverheadCameraController,
    bus: TeamChangeBus<OverheadCameraController>,
    settings: OverheadSettings,
    player: Entity,
    camera: Entity,
    team: Team,
    puck: Option<Vec3>,
    player_camera_enabled: bool,
    overhead_enabled: Option<bool>,
    effects: Vec<PendingEffects>,
  }

  impl Host {
    fn new() -> Self {
      let mut world = World::new();
      let player = world.spawn_empty().id();
      let camera = world.spawn_empty().id();
      Self {
        world,
        controller: OverheadCameraController::with_tag(InstanceTag::new("OHC_test")),
        bus: TeamChangeBus::default(),
        settings: OverheadSettings {
          camera_offset: 8.0,
          buffer_zone_size: 3.0,
          ..default()
        },
        player,
        camera,
        team: Team::Blue,
        puck: Some(Vec3::ZERO),
        player_camera_enabled: true,
        overhead_enabled: None,
        effects: Vec::new(),
      }
    }

    fn spawn(&mut self) -> Entity {
      self.world.spawn_empty().id()
    }

    fn frame(&self, keys: ToggleInput) -> FrameInput {
      FrameInput {
        local_player: Some(LocalPlayerFrame {
          player: self.player,
          team: self.team,
          camera: PlayerCamera {
            entity: self.camera,
            enabled: self.player_camera_enabled,
          },
        }),
        keys,
        puck: self.puck,
        overhead_enabled: self.overhead_enabled,
      }
    }

    fn step(&mut self, keys: ToggleInput) -> TickOutcome {
      let frame = self.frame(keys);
      let outcome = self.controller.tick(&frame, &self.settings, &mut self.bus);
      self.apply();
      outcome
    }

    fn idle(&mut self) -> TickOutcome {
      self.step(ToggleInput::default())
    }

    fn press_toggle(&mut self) -> TickOutcome {
      self.step(ToggleInput {
        toggle_down: true,
        ..default()
      })
    }

    fn apply(&mut self) {
      let lifecycle = self.controller.lifecycle();
      self.overhead_enabled = lifecycle.overhead().map(|camera| camera.enabled);
      if let Some(camera) = lifecycle.player_camera() {
        self.player_camera_enabled = camera.enabled;
      }
      let effects = self.controller.take_effects();
      if effects.restore_player_camera == Some(self.camera) {
        self.player_camera_enabled = true;
      }
      self.effects.push(effects);
    }

    fn publish(&mut self, change: TeamChanged) {
      self.bus.publish(&change, &mut self.controller);
      self.apply();
    }
  }

  #[test]
  fn random_tags_are_five_digits_below_99999() {
    for _ in 0..2000 {
      let tag = InstanceTag::random().to_string();
      let number: u32 = tag.strip_prefix("OHC_").unwrap().parse().unwrap();
      assert!((10000..99999).contains(&number), "{tag}");
    }
  }

  #[test]
  fn skips_without_local_player() {
    let mut host = Host::new();
    let outcome = host.controller.tick(
      &FrameInput::default(),
      &host.settings,
      &mut host.bus,
    );

    assert_eq!(outcome, TickOutcome::Skipped);
    assert_eq!(*host.controller.lifecycle().slot(), CameraSlot::Absent);
    assert!(host.bus.is_empty());
  }

  #[test]
  fn first_tick_creates_and_initializes_in_first_person() {
    let mut host = Host::new();

    assert_eq!(host.idle(), TickOutcome::Tracking);

    assert!(host.controller.is_initialized());
    assert_eq!(host.overhead_enabled, Some(false));
    assert!(host.player_camera_enabled);
    assert_eq!(host.controller.local_player(), Some(host.player));
  }

  #[test]
  fn subscribes_to_team_changes_once() {
    let mut host = Host::new();
    for _ in 0..5 {
      host.idle();
    }

    assert_eq!(host.bus.len(), 1);
    assert!(host.bus.is_subscribed(host.player));
  }

  #[test]
  fn toggle_switches_views_and_body_visibility() {
    let mut host = Host::new();
    host.idle();

    host.press_toggle();
    assert_eq!(host.overhead_enabled, Some(true));
    assert!(!host.player_camera_enabled);
    assert_eq!(host.effects.last().unwrap().body, Some(BodyMesh::Show));

    host.press_toggle(); // still held
    assert_eq!(host.overhead_enabled, Some(true));
    assert_eq!(host.effects.last().unwrap().body, None);

    host.idle();
    host.press_toggle();
    assert_eq!(host.overhead_enabled, Some(false));
    assert!(host.player_camera_enabled);
    assert_eq!(host.effects.last().unwrap().body, Some(BodyMesh::Hide));
  }

  #[test]
  fn camera_follows_puck_for_blue() {
    let mut host = Host::new();
    host.puck = Some(Vec3::new(0.0, 0.0, -20.0));

    host.idle();

    let camera = host.controller.lifecycle().overhead().unwrap();
    assert_eq!(
      camera.transform.translation,
      Vec3::new(0.0, host.settings.camera_height, -9.0)
    );
  }

  #[test]
  fn missing_puck_is_not_fatal() {
    let mut host = Host::new();
    host.puck = None;

    assert_eq!(host.idle(), TickOutcome::Tracking);
    assert_eq!(host.press_toggle(), TickOutcome::Tracking);

    assert!(host.controller.is_initialized());
    assert!(host.controller.overhead_active());
  }

  #[test]
  fn local_team_change_resets_from_any_state() {
    let mut host = Host::new();
    host.idle();
    host.press_toggle();
    assert!(host.controller.overhead_active());

    host.publish(TeamChanged {
      player: host.player,
      old: Team::Blue,
      new: Team::Red,
    });

    assert!(!host.controller.overhead_active());
    assert!(!host.controller.is_initialized());
    assert_eq!(host.overhead_enabled, None);
    assert!(host.player_camera_enabled, "first-person view restored");
    assert_eq!(host.effects.last().unwrap().body, Some(BodyMesh::Hide));

    // Already reset: a second change still leaves it reset.
    host.publish(TeamChanged {
      player: host.player,
      old: Team::Red,
      new: Team::Blue,
    });
    assert!(!host.controller.overhead_active());
    assert!(!host.controller.is_initialized());
  }

  #[test]
  fn other_players_team_change_is_ignored() {
    let mut host = Host::new();
    host.idle();
    host.press_toggle();
    let other = host.spawn();

    host.publish(TeamChanged {
      player: other,
      old: Team::Blue,
      new: Team::Red,
    });

    assert!(host.controller.overhead_active());
    assert!(host.controller.is_initialized());
  }

  #[test]
  fn team_change_reinitializes_for_new_team() {
    let mut host = Host::new();
    host.idle();
    host.team = Team::Red;
    host.publish(TeamChanged {
      player: host.player,
      old: Team::Blue,
      new: Team::Red,
    });

    assert_eq!(host.idle(), TickOutcome::Tracking);

    let camera = host.controller.lifecycle().overhead().unwrap();
    assert_eq!(camera.generation, 2);
    assert!(camera.transform.forward().z > 0.0);
  }

  #[test]
  fn reset_key_resets_even_while_chatting() {
    let mut host = Host::new();
    host.idle();
    host.press_toggle();

    let outcome = host.step(ToggleInput {
      chat_focused: true,
      toggle_down: false,
      reset_just_pressed: true,
    });

    assert_eq!(outcome, TickOutcome::Reset(ResetReason::ResetKey));
    assert!(!host.controller.overhead_active());
    assert!(host.player_camera_enabled);
    assert_eq!(host.idle(), TickOutcome::Tracking);
  }

  #[test]
  fn both_cameras_disabled_externally_forces_reset() {
    let mut host = Host::new();
    host.idle();
    host.player_camera_enabled = false;
    host.overhead_enabled = Some(false);

    let outcome = host.idle();

    assert_eq!(outcome, TickOutcome::Reset(ResetReason::NoActiveCamera));
    assert!(!host.controller.overhead_active());
    assert!(host.player_camera_enabled);

    assert_eq!(host.idle(), TickOutcome::Tracking);
  }

  #[test]
  fn overhead_disabled_externally_is_reenabled() {
    let mut host = Host::new();
    host.idle();
    host.press_toggle();
    host.overhead_enabled = Some(false);

    assert_eq!(host.idle(), TickOutcome::Tracking);

    assert_eq!(host.overhead_enabled, Some(true));
    assert!(!host.player_camera_enabled);
  }

  #[test]
  fn initialization_failure_resets_and_retries() {
    let mut host = Host::new();
    host.settings.camera_fov = 0.0;

    assert_eq!(
      host.idle(),
      TickOutcome::Reset(ResetReason::InitializationFailed)
    );
    assert_eq!(
      host.idle(),
      TickOutcome::Reset(ResetReason::InitializationFailed)
    );
    assert!(host.player_camera_enabled);

    host.settings.camera_fov = 90.0;
    assert_eq!(host.idle(), TickOutcome::Tracking);
    assert!(host.controller.is_initialized());
  }

  #[test]
  fn replacing_local_player_resets_and_moves_subscription() {
    let mut host = Host::new();
    host.idle();
    let previous = host.player;
    host.player = host.spawn();

    assert_eq!(
      host.idle(),
      TickOutcome::Reset(ResetReason::LocalPlayerReplaced)
    );
    assert!(!host.bus.is_subscribed(previous));
    assert!(host.bus.is_subscribed(host.player));
    assert_eq!(host.idle(), TickOutcome::Tracking);
  }

  #[test]
  fn reinitialize_request_keeps_camera() {
    let mut host = Host::new();
    host.idle();
    host.settings.camera_height = 30.0;

    host.controller.request_reinitialize();
    host.idle();

    let camera = host.controller.lifecycle().overhead().unwrap();
    assert_eq!(camera.generation, 1);
    assert_eq!(camera.transform.translation.y, 30.0);
  }
}

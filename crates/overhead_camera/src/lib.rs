//! Overhead camera - client-side top-down view for a team sport game.
//!
//! The local player toggles between their first-person camera and an
//! overhead camera that hangs above the rink, looks towards the opposing
//! end and trails the puck along the length of the rink. The controller
//! never fails a frame: anything unexpected resets the camera back to
//! first-person and it is rebuilt on the next tick.
//!
//! The core (`controller`, `lifecycle`, `toggle`, `tracking`, `sync`) is
//! engine-free state driven by [`FrameInput`]; [`OverheadCameraPlugin`]
//! binds it to Bevy entities.

pub mod controller;
pub mod lifecycle;
pub mod plugin;
pub mod settings;
pub mod sync;
pub mod team;
pub mod toggle;
pub mod tracking;

pub use controller::{
  CameraError, FrameInput, InstanceTag, LocalPlayerFrame, OverheadCameraController,
  PendingEffects, ResetReason, TickOutcome,
};
pub use lifecycle::{CameraLifecycle, CameraSlot, OverheadCamera, PlayerCamera};
pub use plugin::{
  ChatFocus, FirstPersonCamera, LocalPlayer, LocalPlayerBody, OverheadCameraPlugin,
  OverheadCameraSet, OverheadCameraView, Puck,
};
pub use settings::{OverheadSettings, SETTINGS_FILE, SettingsError};
pub use sync::{BodyMesh, SyncOutcome, reconcile};
pub use team::{Subscription, Team, TeamChangeBus, TeamChangeHandler, TeamChanged};
pub use toggle::{CameraToggle, ToggleInput, ToggleOutcome};
pub use tracking::{follow_puck, track};

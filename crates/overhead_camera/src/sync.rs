use crate::lifecycle::{OverheadCamera, PlayerCamera};

/// What should happen to the local player's own body mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMesh {
  Show,
  Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
  Unchanged,
  Switched(BodyMesh),
  /// Neither camera is rendering.
  NoActiveCamera,
}

/// Makes the two cameras agree with `overhead_active`.
///
/// Only touches the cameras when the overhead camera disagrees with the
/// toggle. The overhead view shows the player's body, first-person hides it.
pub fn reconcile(
  overhead: &mut OverheadCamera,
  player: &mut PlayerCamera,
  overhead_active: bool,
) -> SyncOutcome {
  let mut outcome = SyncOutcome::Unchanged;

  if overhead.enabled != overhead_active {
    overhead.enabled = overhead_active;
    player.enabled = !overhead_active;

    if overhead.enabled {
      outcome = SyncOutcome::Switched(BodyMesh::Show);
    } else if player.enabled {
      outcome = SyncOutcome::Switched(BodyMesh::Hide);
    }
  }

  if !overhead.enabled && !player.enabled {
    return SyncOutcome::NoActiveCamera;
  }
  outcome
}

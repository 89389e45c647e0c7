//! Puck tracking along the length of the rink.
//!
//! The camera trails the puck by `camera_offset` on the team's own side. It
//! only moves once the puck leaves a dead zone of `buffer_zone_size` around
//! that trailing position, and it never leaves the team's clamp bounds.

use bevy::prelude::*;

use crate::lifecycle::OverheadCamera;
use crate::settings::OverheadSettings;
use crate::team::Team;
use crate::CameraError;

/// New camera Z for a puck at `puck_z` and a camera at `camera_z`.
pub fn track(team: Team, puck_z: f32, camera_z: f32, settings: &OverheadSettings) -> f32 {
  let offset = settings.camera_offset;
  let buffer = settings.buffer_zone_size;

  match team {
    Team::Blue => {
      let target_z = camera_z - offset;
      let (min, max) = (-settings.away_max_distance, settings.home_max_distance);
      if puck_z < target_z - buffer {
        saturate(puck_z + offset + buffer, min, max)
      } else if puck_z > target_z + buffer {
        saturate(puck_z + offset - buffer, min, max)
      } else {
        camera_z
      }
    }
    Team::Red => {
      let target_z = camera_z + offset;
      let (min, max) = (-settings.home_max_distance, settings.away_max_distance);
      if puck_z > target_z + buffer {
        saturate(puck_z - offset - buffer, min, max)
      } else if puck_z < target_z - buffer {
        saturate(puck_z - offset + buffer, min, max)
      } else {
        camera_z
      }
    }
  }
}

/// Clamp that tolerates `min > max` (the lower bound wins) instead of
/// panicking like `f32::clamp`.
fn saturate(value: f32, min: f32, max: f32) -> f32 {
  value.min(max).max(min)
}

/// Moves `camera` to follow the puck at fixed height, keeping its rotation.
pub fn follow_puck(
  camera: &mut OverheadCamera,
  team: Team,
  puck: Option<Vec3>,
  settings: &OverheadSettings,
) -> Result<f32, CameraError> {
  let puck = puck.ok_or(CameraError::MissingPuck)?;
  if !puck.z.is_finite() {
    return Err(CameraError::MissingPuck);
  }

  let new_z = track(team, puck.z, camera.transform.translation.z, settings);
  camera.transform.translation = Vec3::new(0.0, settings.camera_height, new_z);
  Ok(new_z)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings() -> OverheadSettings {
    OverheadSettings {
      camera_offset: 8.0,
      buffer_zone_size: 3.0,
      away_max_distance: 20.0,
      home_max_distance: 40.0,
      ..default()
    }
  }

  #[test]
  fn blue_stays_put_inside_dead_zone() {
    // target_z = -8, dead zone [-11, -5]
    assert_eq!(track(Team::Blue, -9.0, 0.0, &settings()), 0.0);
    assert_eq!(track(Team::Blue, -11.0, 0.0, &settings()), 0.0);
    assert_eq!(track(Team::Blue, -5.0, 0.0, &settings()), 0.0);
  }

  #[test]
  fn blue_follows_puck_out_of_dead_zone() {
    assert_eq!(track(Team::Blue, -20.0, 0.0, &settings()), -9.0);
    assert_eq!(track(Team::Blue, 10.0, 0.0, &settings()), 15.0);
  }

  #[test]
  fn red_mirrors_blue() {
    // target_z = 8, dead zone [5, 11]
    assert_eq!(track(Team::Red, 9.0, 0.0, &settings()), 0.0);
    assert_eq!(track(Team::Red, 20.0, 0.0, &settings()), 9.0);
    assert_eq!(track(Team::Red, -10.0, 0.0, &settings()), -15.0);
  }

  #[test]
  fn clamps_saturate_at_team_bounds() {
    let s = settings();
    assert_eq!(track(Team::Blue, -100.0, 0.0, &s), -20.0);
    assert_eq!(track(Team::Blue, 100.0, 0.0, &s), 40.0);
    assert_eq!(track(Team::Red, 100.0, 0.0, &s), 20.0);
    assert_eq!(track(Team::Red, -100.0, 0.0, &s), -40.0);

    for puck_z in [-1000.0, -41.0, -21.0, 0.0, 21.0, 41.0, 1000.0] {
      let blue = track(Team::Blue, puck_z, 0.0, &s);
      assert!((-20.0..=40.0).contains(&blue), "blue {puck_z} -> {blue}");
      let red = track(Team::Red, puck_z, 0.0, &s);
      assert!((-40.0..=20.0).contains(&red), "red {puck_z} -> {red}");
    }
  }

  #[test]
  fn degenerate_bounds_do_not_panic() {
    let s = OverheadSettings {
      home_max_distance: -30.0,
      away_max_distance: 0.0,
      ..settings()
    };
    assert_eq!(track(Team::Blue, 100.0, 0.0, &s), 0.0);
  }

  #[test]
  fn follow_puck_keeps_rotation_and_height() {
    let s = settings();
    let rotation = Quat::from_rotation_x(-1.0);
    let mut camera = OverheadCamera {
      transform: Transform::from_xyz(3.0, 1.0, 0.0).with_rotation(rotation),
      fov: 1.0,
      enabled: true,
      generation: 1,
    };

    let new_z = follow_puck(&mut camera, Team::Blue, Some(Vec3::new(4.0, 0.0, -20.0)), &s).unwrap();

    assert_eq!(new_z, -9.0);
    assert_eq!(
      camera.transform.translation,
      Vec3::new(0.0, s.camera_height, -9.0)
    );
    assert_eq!(camera.transform.rotation, rotation);
  }

  #[test]
  fn missing_puck_leaves_camera_alone() {
    let mut camera = OverheadCamera {
      transform: Transform::from_xyz(0.0, 20.0, 5.0),
      fov: 1.0,
      enabled: false,
      generation: 1,
    };
    let before = camera.clone();

    let result = follow_puck(&mut camera, Team::Red, None, &settings());

    assert!(matches!(result, Err(CameraError::MissingPuck)));
    assert_eq!(camera, before);
  }
}

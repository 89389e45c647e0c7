//! Teams and the team change notification channel.

use std::collections::HashMap;
use std::f32::consts::PI;

use bevy::prelude::*;

/// Which side a player plays for.
///
/// Blue defends the positive Z end of the rink, Red the negative end.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
  Blue,
  Red,
}

impl Team {
  /// Yaw of the overhead camera, in radians. The two teams look down the rink
  /// from opposite ends.
  pub fn facing_yaw(self) -> f32 {
    match self {
      Self::Blue => 0.0,
      Self::Red => PI,
    }
  }
}

/// Sent by the host whenever any player's team changes.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamChanged {
  pub player: Entity,
  pub old: Team,
  pub new: Team,
}

/// Callback run for every published team change.
pub type TeamChangeHandler<C> = fn(&mut C, &TeamChanged);

/// Result of [`TeamChangeBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
  Added,
  /// The player already had a handler; nothing was registered.
  AlreadySubscribed,
}

/// Team change subscriptions, at most one handler per monitored player.
///
/// `C` is the state handlers get mutable access to when a change is
/// published.
#[derive(Resource)]
pub struct TeamChangeBus<C: Send + Sync + 'static> {
  handlers: HashMap<Entity, TeamChangeHandler<C>>,
}

impl<C: Send + Sync + 'static> Default for TeamChangeBus<C> {
  fn default() -> Self {
    Self {
      handlers: HashMap::new(),
    }
  }
}

impl<C: Send + Sync + 'static> TeamChangeBus<C> {
  pub fn subscribe(&mut self, player: Entity, handler: TeamChangeHandler<C>) -> Subscription {
    if self.handlers.contains_key(&player) {
      debug!("Player {player} is already subscribed to team changes");
      return Subscription::AlreadySubscribed;
    }
    self.handlers.insert(player, handler);
    info!("Subscribed to team changed events for player {player}");
    Subscription::Added
  }

  /// Removes the player's handler. Returns whether one was registered.
  pub fn unsubscribe(&mut self, player: Entity) -> bool {
    let removed = self.handlers.remove(&player).is_some();
    if removed {
      info!("Unsubscribed from team changed events for player {player}");
    }
    removed
  }

  pub fn is_subscribed(&self, player: Entity) -> bool {
    self.handlers.contains_key(&player)
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }

  /// Runs every registered handler for `change`.
  pub fn publish(&self, change: &TeamChanged, context: &mut C) {
    debug!(
      "Player {} team changed from {:?} to {:?}",
      change.player, change.old, change.new
    );
    for handler in self.handlers.values() {
      handler(context, change);
    }
  }
}

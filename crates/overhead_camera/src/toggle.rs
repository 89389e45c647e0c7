//! Edge-triggered toggle and reset keys.

/// Raw key state sampled for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleInput {
  /// A text box (the chat) has keyboard focus.
  pub chat_focused: bool,
  /// Toggle key is currently held.
  pub toggle_down: bool,
  /// Reset key went down this tick.
  pub reset_just_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
  Idle,
  /// `overhead_active` flipped.
  Toggled,
  ResetRequested,
}

#[derive(Debug, Default)]
pub struct CameraToggle {
  overhead_active: bool,
  toggle_key_was_pressed: bool,
}

impl CameraToggle {
  /// Processes one tick of input.
  ///
  /// The toggle flips once per press of the toggle key and is ignored while the
  /// chat has focus. The key state is remembered either way, so a key released
  /// behind the chat box does not fire once the chat closes. The reset key is
  /// honoured even while the chat has focus and wins over a toggle in the same
  /// tick.
  pub fn update(&mut self, input: ToggleInput) -> ToggleOutcome {
    let rising_edge = input.toggle_down && !self.toggle_key_was_pressed;
    self.toggle_key_was_pressed = input.toggle_down;

    if input.reset_just_pressed {
      return ToggleOutcome::ResetRequested;
    }
    if input.chat_focused || !rising_edge {
      return ToggleOutcome::Idle;
    }

    self.overhead_active = !self.overhead_active;
    ToggleOutcome::Toggled
  }

  pub fn overhead_active(&self) -> bool {
    self.overhead_active
  }

  /// Back to first-person. Part of a full reset; the key edge state survives
  /// so a key held through the reset does not toggle again.
  pub fn clear(&mut self) {
    self.overhead_active = false;
  }
}

//! Minimal chat box. While its text field has focus the camera keys are
//! ignored.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use overhead_camera::ChatFocus;

const MAX_LINES: usize = 50;

pub struct ChatPlugin;

impl Plugin for ChatPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
      app.add_plugins(EguiPlugin::default());
    }
    app
      .init_resource::<ChatFocus>()
      .init_resource::<ChatLog>()
      .add_systems(EguiPrimaryContextPass, chat_window);
  }
}

#[derive(Resource, Default)]
struct ChatLog {
  lines: Vec<String>,
  draft: String,
}

impl ChatLog {
  fn submit(&mut self) {
    let message = self.draft.trim();
    if !message.is_empty() {
      self.lines.push(format!("You: {message}"));
      if self.lines.len() > MAX_LINES {
        let excess = self.lines.len() - MAX_LINES;
        self.lines.drain(..excess);
      }
    }
    self.draft.clear();
  }
}

fn chat_window(mut contexts: EguiContexts, mut log: ResMut<ChatLog>, mut focus: ResMut<ChatFocus>) {
  let Ok(ctx) = contexts.ctx_mut() else {
    return;
  };

  let mut focused = false;
  egui::Window::new("Chat")
    .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
    .default_width(280.0)
    .resizable(false)
    .show(ctx, |ui| {
      egui::ScrollArea::vertical()
        .max_height(120.0)
        .stick_to_bottom(true)
        .show(ui, |ui| {
          for line in &log.lines {
            ui.label(line);
          }
        });

      let response = ui.text_edit_singleline(&mut log.draft);
      if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        log.submit();
        response.request_focus();
      }
      focused = response.has_focus();
    });

  if focus.0 != focused {
    focus.0 = focused;
  }
}

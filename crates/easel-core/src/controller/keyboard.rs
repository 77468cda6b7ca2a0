//! Keyboard shortcuts.

use super::CanvasController;
use crate::input::{Key, KeyInput};
use crate::surface::{Cursor, Surface};
use crate::tools::ToolKind;

impl<S: Surface> CanvasController<S> {
    /// Handle a key press. Returns true when the key was consumed and the
    /// host should suppress its default action.
    pub async fn key_down(&mut self, input: KeyInput) -> bool {
        if self.surface.is_none() {
            return false;
        }
        let editing = self.is_editing_text();
        let modifiers = input.modifiers;

        if input.key == Key::Space && !editing {
            if !input.repeat {
                self.space_held = true;
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_cursor(Cursor::Grab);
                }
            }
            return true;
        }

        if modifiers.command() {
            // Typing owns the keyboard while a text object is being edited.
            if editing {
                return false;
            }
            return match input.key.char() {
                Some('c') => {
                    self.copy();
                    true
                }
                Some('x') => {
                    self.cut();
                    true
                }
                Some('v') => {
                    self.paste();
                    true
                }
                Some('z') if modifiers.shift => {
                    self.redo().await;
                    true
                }
                Some('z') => {
                    self.undo().await;
                    true
                }
                Some('y') => {
                    self.redo().await;
                    true
                }
                _ => false,
            };
        }

        match input.key {
            Key::Escape => {
                if editing {
                    self.exit_text_editing();
                } else if let Some(surface) = self.surface.as_mut() {
                    surface.discard_active();
                    self.process_events();
                }
                true
            }
            Key::Delete | Key::Backspace if !editing => {
                self.delete_selected();
                true
            }
            Key::Character(c) if !editing && !modifiers.alt => match ToolKind::from_shortcut(c) {
                Some(tool) => {
                    self.set_tool(tool);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn key_up(&mut self, input: &KeyInput) {
        if input.key != Key::Space || !self.space_held {
            return;
        }
        self.space_held = false;
        let panning = matches!(self.gesture, super::Gesture::Panning { .. });
        if let Some(surface) = self.surface.as_mut() {
            if !panning {
                surface.set_cursor(Cursor::Default);
            }
        }
    }
}

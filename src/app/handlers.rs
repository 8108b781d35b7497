//! Keyboard handling for the App.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, PAGE_SCROLL};
use crate::traits::Transport;

impl<T: Transport> App<T> {
    /// Apply one key event. Only presses count.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.mark_dirty();

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('d') if ctrl => self.disconnect(),
            KeyCode::Esc => self.quit(),

            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),

            KeyCode::Enter => {
                if self.focus.is_connect_field() {
                    self.connect();
                } else {
                    self.send();
                }
            }

            KeyCode::PageUp => self.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.scroll_down(PAGE_SCROLL),

            KeyCode::Backspace => self.focused_field_mut().backspace(),
            KeyCode::Delete => self.focused_field_mut().delete(),
            KeyCode::Left => self.focused_field_mut().move_left(),
            KeyCode::Right => self.focused_field_mut().move_right(),
            KeyCode::Home => self.focused_field_mut().move_home(),
            KeyCode::End => self.focused_field_mut().move_end(),
            KeyCode::Char(c) if !ctrl => self.focused_field_mut().insert_char(c),
            _ => {}
        }
    }
}

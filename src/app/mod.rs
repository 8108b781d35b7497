//! Application state.
//!
//! [`App`] holds the form fields and the [`SessionController`]. It is only
//! ever touched from the UI task: key presses and session reports both end
//! up here through the main loop.

mod handlers;
pub mod input;
mod types;

pub use input::InputField;
pub use types::Focus;

use tokio::sync::mpsc;

use crate::adapters::SocketIoTransport;
use crate::config::ClientConfig;
use crate::event_log::LogEntry;
use crate::session::{SessionController, SessionEvent, SessionState};
use crate::traits::Transport;

/// Lines moved per PageUp / PageDown.
pub const PAGE_SCROLL: usize = 10;

pub struct App<T: Transport = SocketIoTransport> {
    pub controller: SessionController<T>,
    /// Session reports; taken by the main loop.
    pub message_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    pub url: InputField,
    pub token: InputField,
    pub event_name: InputField,
    pub data: InputField,
    pub focus: Focus,
    /// Lines scrolled up from the newest entry; 0 follows the tail.
    pub log_scroll: usize,
    pub should_quit: bool,
    pub needs_redraw: bool,
}

impl<T: Transport> App<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        let (controller, rx) = SessionController::new(transport, config.transports.clone());
        Self {
            controller,
            message_rx: Some(rx),
            url: InputField::new(config.url.clone()),
            token: InputField::new(config.token.clone()),
            event_name: InputField::new(config.event_name.clone()),
            data: InputField::default(),
            focus: Focus::default(),
            log_scroll: 0,
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn entries(&self) -> &[LogEntry] {
        self.controller.entries()
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn focused_field(&self) -> &InputField {
        match self.focus {
            Focus::Url => &self.url,
            Focus::Token => &self.token,
            Focus::EventName => &self.event_name,
            Focus::Data => &self.data,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut InputField {
        match self.focus {
            Focus::Url => &mut self.url,
            Focus::Token => &mut self.token,
            Focus::EventName => &mut self.event_name,
            Focus::Data => &mut self.data,
        }
    }

    pub fn connect(&mut self) {
        self.controller
            .connect(self.url.value().trim(), self.token.value());
        self.log_scroll = 0;
        self.mark_dirty();
    }

    pub fn disconnect(&mut self) {
        self.controller.disconnect();
        self.log_scroll = 0;
        self.mark_dirty();
    }

    pub fn send(&mut self) {
        self.controller
            .send(self.event_name.value(), self.data.value());
        self.log_scroll = 0;
        self.mark_dirty();
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        self.controller.handle_event(event);
        self.mark_dirty();
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.focused_field_mut().insert_str(text);
        self.mark_dirty();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.entries().len().saturating_sub(1);
        self.log_scroll = (self.log_scroll + lines).min(max);
        self.mark_dirty();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(lines);
        self.mark_dirty();
    }
}

//! UI rendering.
//!
//! Layout, top to bottom:
//! - Status line with the session state
//! - Connect form (URL, token)
//! - Event log
//! - Send form (event name, data)
//! - Keybind hints

mod form;
mod log_view;
mod theme;

pub use log_view::{category_color, entry_line, visible_range};
pub use theme::{
    COLOR_ACCENT, COLOR_BORDER, COLOR_CONNECT, COLOR_DIM, COLOR_FAILURE, COLOR_TRAFFIC,
};

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Focus};
use crate::session::SessionState;
use crate::traits::Transport;
use form::{render_form, FieldRow};
use log_view::render_log;
use theme::{COLOR_STATE_CONNECTED, COLOR_STATE_ERROR, COLOR_STATE_IDLE, COLOR_STATE_PENDING};

/// Render the whole screen.
pub fn render<T: Transport>(frame: &mut Frame, app: &App<T>) {
    let [status, connect, log, send, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Min(3),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_status(frame, status, app);

    render_form(
        frame,
        connect,
        "Connect",
        &[
            FieldRow {
                label: "URL",
                field: &app.url,
                focused: app.focus == Focus::Url,
                placeholder: "http://localhost:3000",
            },
            FieldRow {
                label: "Token",
                field: &app.token,
                focused: app.focus == Focus::Token,
                placeholder: "(none)",
            },
        ],
    );

    render_log(frame, log, app.entries(), app.log_scroll);

    render_form(
        frame,
        send,
        "Send",
        &[
            FieldRow {
                label: "Event",
                field: &app.event_name,
                focused: app.focus == Focus::EventName,
                placeholder: "message",
            },
            FieldRow {
                label: "Data",
                field: &app.data,
                focused: app.focus == Focus::Data,
                placeholder: "text or {\"json\": true}",
            },
        ],
    );

    frame.render_widget(Paragraph::new(build_keybinds(app.focus)), hints);
}

fn state_color(state: SessionState) -> Color {
    match state {
        SessionState::Connected => COLOR_STATE_CONNECTED,
        SessionState::Connecting => COLOR_STATE_PENDING,
        SessionState::Idle | SessionState::Disconnected => COLOR_STATE_IDLE,
        SessionState::Errored => COLOR_STATE_ERROR,
    }
}

fn render_status<T: Transport>(frame: &mut Frame, area: Rect, app: &App<T>) {
    let state = app.state();
    let mut spans = vec![
        Span::styled(
            " sioprobe ",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("● ", Style::default().fg(state_color(state))),
        Span::styled(state.as_str(), Style::default().fg(state_color(state))),
    ];
    if let Some(id) = app.controller.session().socket_id() {
        spans.push(Span::styled(
            format!("  id {}", id),
            Style::default().fg(COLOR_DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints for the current focus.
pub fn build_keybinds(focus: Focus) -> Line<'static> {
    let enter_action = if focus.is_connect_field() {
        " connect | "
    } else {
        " send | "
    };
    let key = |k: &'static str| Span::styled(k, Style::default().fg(COLOR_ACCENT));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(COLOR_DIM));

    Line::from(vec![
        Span::raw(" "),
        key("[Enter]"),
        text(enter_action),
        key("[Tab]"),
        text(" next field | "),
        key("[Ctrl+D]"),
        text(" disconnect | "),
        key("[PgUp/PgDn]"),
        text(" scroll | "),
        key("[Esc]"),
        text(" quit"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockTransport;
    use crate::config::ClientConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App<MockTransport>, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> (App<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        (App::new(transport.clone(), &ClientConfig::default()), transport)
    }

    #[test]
    fn test_render_initial_screen() {
        let (app, _) = app();
        let screen = draw(&app, 80, 20);
        assert!(screen.contains("sioprobe"));
        assert!(screen.contains("idle"));
        assert!(screen.contains("http://localhost:3000"));
        assert!(screen.contains("Event Log (0)"));
        assert!(screen.contains("message"));
        assert!(screen.contains("connect |"));
    }

    #[test]
    fn test_render_log_entries_and_state() {
        let (mut app, transport) = app();
        app.connect();
        transport.last_socket().unwrap().simulate_connect("sock-42");
        let mut rx = app.message_rx.take().unwrap();
        while let Ok(event) = rx.try_recv() {
            app.handle_session_event(event);
        }

        let screen = draw(&app, 80, 20);
        assert!(screen.contains("Connected: sock-42"));
        assert!(screen.contains("connected"));
        assert!(screen.contains("id sock-42"));
        assert!(screen.contains("Event Log (1)"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let (mut app, _) = app();
        app.send();
        draw(&app, 10, 5);
        draw(&app, 1, 1);
    }

    #[test]
    fn test_keybinds_follow_focus() {
        let line: String = build_keybinds(Focus::Data)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(line.contains("send"));
        assert!(!line.contains("connect |"));
    }
}

//! Event log pane.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::event_log::{LogCategory, LogEntry};

use super::theme::{COLOR_BORDER, COLOR_CONNECT, COLOR_DIM, COLOR_FAILURE, COLOR_TRAFFIC};

pub fn category_color(category: LogCategory) -> ratatui::style::Color {
    match category {
        LogCategory::Connect => COLOR_CONNECT,
        LogCategory::Disconnect | LogCategory::Error => COLOR_FAILURE,
        LogCategory::Inbound | LogCategory::Outbound => COLOR_TRAFFIC,
    }
}

/// `time: text`, colored by category.
pub fn entry_line(entry: &LogEntry) -> Line<'_> {
    Line::from(vec![
        Span::styled(entry.timestamp(), Style::default().fg(COLOR_DIM)),
        Span::styled(": ", Style::default().fg(COLOR_DIM)),
        Span::styled(
            entry.text(),
            Style::default().fg(category_color(entry.category())),
        ),
    ])
}

/// Range of entries visible in `height` rows, `scroll` rows up from the tail.
pub fn visible_range(total: usize, height: usize, scroll: usize) -> (usize, usize) {
    let end = total.saturating_sub(scroll);
    let start = end.saturating_sub(height);
    (start, end)
}

pub fn render_log(frame: &mut Frame, area: Rect, entries: &[LogEntry], scroll: usize) {
    let title = if scroll > 0 {
        format!(" Event Log ({}) [+{}] ", entries.len(), scroll)
    } else {
        format!(" Event Log ({}) ", entries.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (start, end) = visible_range(entries.len(), inner.height as usize, scroll);
    let lines: Vec<Line> = entries[start..end].iter().map(entry_line).collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

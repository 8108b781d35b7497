//! Labeled single-line form fields.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::InputField;

use super::theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_DIM};

const LABEL_WIDTH: u16 = 8;

/// One row of a form block.
pub struct FieldRow<'a> {
    pub label: &'a str,
    pub field: &'a InputField,
    pub focused: bool,
    pub placeholder: &'a str,
}

/// Render a bordered form with one field per row.
///
/// Places the terminal cursor in the focused field, if any.
pub fn render_form(frame: &mut Frame, area: Rect, title: &str, rows: &[FieldRow]) {
    let any_focused = rows.iter().any(|r| r.focused);
    let border_color = if any_focused { COLOR_ACCENT } else { COLOR_BORDER };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(border_color),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let constraints: Vec<Constraint> = rows.iter().map(|_| Constraint::Length(1)).collect();
    let areas = Layout::vertical(constraints).split(inner);

    for (row, row_area) in rows.iter().zip(areas.iter()) {
        render_row(frame, *row_area, row);
    }
}

fn render_row(frame: &mut Frame, area: Rect, row: &FieldRow) {
    let label_style = if row.focused {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_DIM)
    };

    let value = if row.field.is_empty() && !row.focused {
        Span::styled(row.placeholder, Style::default().fg(COLOR_DIM))
    } else {
        Span::raw(row.field.value())
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {:<width$}", row.label, width = (LABEL_WIDTH - 1) as usize),
            label_style,
        ),
        value,
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if row.focused {
        let max_x = area.x + area.width.saturating_sub(1);
        let x = (area.x + LABEL_WIDTH)
            .saturating_add(row.field.cursor_column())
            .min(max_x);
        frame.set_cursor_position((x, area.y));
    }
}

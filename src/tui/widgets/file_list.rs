//! File list widget: virtual-scrolling table of attachments.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::Modifier;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use super::truncate_str;
use crate::i18n;
use crate::model::category::FileCategory;
use crate::tui::app::{App, PanelFocus};
use crate::tui::theme::current_theme;

/// Render the attachment table with virtual scrolling.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = current_theme();

    let is_focused = app.focus == PanelFocus::Files;
    let border_style = if is_focused {
        theme.border.add_modifier(Modifier::BOLD)
    } else {
        theme.border
    };

    let title = match &app.active_dialog {
        Some(dialog) => format!(" {} \u{2014} {} ", i18n::tui_files(), dialog.name),
        None => format!(" {} ", i18n::tui_files()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 {
        return;
    }

    if app.visible.is_empty() {
        let text = if app.loading_messages {
            i18n::tui_loading()
        } else if app.active_dialog.is_none() {
            i18n::tui_select_chat()
        } else {
            i18n::tui_no_files()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {text}"), theme.list_dim)),
            inner,
        );
        return;
    }

    // Header row takes 1 line, rest is data
    let viewport_height = (inner.height as usize).saturating_sub(1);
    app.list_viewport_height = viewport_height;
    app.ensure_selected_visible();

    // Column widths
    let mark_w = 3u16;
    let date_w = 16u16;
    let category_w = 10u16;
    let size_w = 10u16;
    let fixed = mark_w + date_w + category_w + size_w + 4;
    let name_w = inner.width.saturating_sub(fixed);

    let constraints = [
        Constraint::Length(mark_w),
        Constraint::Length(date_w),
        Constraint::Min(name_w),
        Constraint::Length(category_w),
        Constraint::Length(size_w),
    ];

    let header = Row::new(vec![
        String::new(),
        i18n::col_date().to_string(),
        i18n::col_name().to_string(),
        i18n::col_category().to_string(),
        i18n::col_size().to_string(),
    ])
    .style(theme.list_header);

    // Virtual scrolling: only build rows for visible range
    let start = app.file_scroll_offset;
    let end = (start + viewport_height).min(app.visible.len());

    let rows: Vec<Row> = app
        .visible
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(offset, message)| {
            let idx = start + offset;
            let is_selected = idx == app.file_selected;
            let is_marked = app.marked.contains(&message.id);

            let mark = if is_marked { "[x]" } else { "[ ]" };
            let date = message.date.format("%Y-%m-%d %H:%M").to_string();
            let name = truncate_str(message.display_name(), name_w as usize);
            let category = message.category().map(FileCategory::label).unwrap_or_default();
            let size = message
                .size
                .map(|s| humansize::format_size(s, humansize::BINARY))
                .unwrap_or_default();

            let style = if is_selected && is_focused {
                theme.list_selected
            } else if is_marked {
                theme.list_marked
            } else {
                theme.list_normal
            };

            Row::new(vec![mark.to_string(), date, name, category.to_string(), size]).style(style)
        })
        .collect();

    let table = Table::new(rows, constraints)
        .header(header)
        .column_spacing(1);

    frame.render_widget(table, inner);
}

//! Left panel listing groups and channels.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::truncate_str;
use crate::i18n;
use crate::model::dialog::DialogKind;
use crate::tui::app::{App, PanelFocus};
use crate::tui::theme::current_theme;

/// Render the chat list panel.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = current_theme();

    let is_focused = app.focus == PanelFocus::Dialogs;
    let border_style = if is_focused {
        theme.border.add_modifier(Modifier::BOLD)
    } else {
        theme.border
    };

    let title = format!(" {} ({}) ", i18n::tui_chats(), app.dialogs.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 1 || inner.width < 4 {
        return;
    }

    if app.dialogs.is_empty() {
        let text = if app.loading_dialogs || app.connecting {
            i18n::tui_loading()
        } else {
            i18n::tui_no_dialogs()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {text}"), theme.list_dim)),
            inner,
        );
        return;
    }

    // Keep the cursor on screen.
    let height = inner.height as usize;
    if app.dialog_selected < app.dialog_scroll_offset {
        app.dialog_scroll_offset = app.dialog_selected;
    } else if app.dialog_selected >= app.dialog_scroll_offset + height {
        app.dialog_scroll_offset = app.dialog_selected + 1 - height;
    }

    let max_width = inner.width as usize;
    let active_id = app.active_dialog.as_ref().map(|d| d.id);

    let lines: Vec<Line> = app
        .dialogs
        .iter()
        .enumerate()
        .skip(app.dialog_scroll_offset)
        .take(height)
        .map(|(i, dialog)| {
            let icon = match dialog.kind {
                DialogKind::Channel => "#",
                DialogKind::Group => "@",
            };
            let text = format!(" {icon} {}", truncate_str(&dialog.name, max_width.saturating_sub(4)));

            let style = if i == app.dialog_selected && is_focused {
                theme.list_selected
            } else if Some(dialog.id) == active_id {
                theme.dialog_active
            } else {
                theme.list_normal
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

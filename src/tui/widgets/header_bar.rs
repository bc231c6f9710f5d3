//! Top header bar showing the open chat, filters and download folder.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::i18n;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the top header bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let connection = if app.client.is_some() {
        i18n::tui_connected()
    } else {
        i18n::tui_not_connected()
    };

    let mut spans = vec![Span::styled(
        format!(" {} [{connection}]", i18n::app_name()),
        theme.header_bar,
    )];

    if let Some(dialog) = &app.active_dialog {
        spans.push(Span::styled(format!(" | {}", dialog.name), theme.header_bar));
        spans.push(Span::styled(
            format!(" | {}", i18n::files_shown(app.visible.len(), app.messages.len())),
            theme.header_bar,
        ));
    }

    let date = match app.criteria.min_date {
        Some(d) => format!("{} {}", i18n::tui_since(), d.format("%Y-%m-%d")),
        None => i18n::tui_any_date().to_string(),
    };
    spans.push(Span::styled(format!(" | {date}"), theme.header_bar));

    let marked = if app.marked.is_empty() {
        i18n::tui_all_files().to_string()
    } else {
        format!("{} {}", app.marked.len(), i18n::tui_marked())
    };
    spans.push(Span::styled(format!(" | {marked}"), theme.header_bar));

    // Right-aligned download folder
    let left_len: usize = spans.iter().map(|s| s.content.width()).sum();
    let right_text = format!(
        " {}: {} ",
        i18n::tui_save_to(),
        app.config.download_dir().display()
    );
    let total = area.width as usize;
    if total > left_len + right_text.width() {
        let padding = total - left_len - right_text.width();
        spans.push(Span::styled(" ".repeat(padding), theme.header_bar));
        spans.push(Span::styled(right_text, theme.header_bar));
    }

    let bar = Paragraph::new(Line::from(spans)).style(theme.header_bar);
    frame.render_widget(bar, area);
}

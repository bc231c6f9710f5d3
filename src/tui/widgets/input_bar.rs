//! Input bar that replaces the status bar while a value is being typed.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::i18n;
use crate::tui::app::{App, InputMode};
use crate::tui::theme::current_theme;

/// Render the prompt, the typed text and a cursor marker.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let prompt = match app.input_mode {
        Some(InputMode::MinDate) => i18n::tui_input_min_date(),
        Some(InputMode::DownloadDir) => i18n::tui_input_download_dir(),
        None => return,
    };

    let spans: Vec<Span<'static>> = vec![
        Span::styled(format!(" {prompt}: "), theme.key_hint),
        Span::styled(app.input_buffer.clone(), theme.list_normal),
        Span::styled("_", theme.key_hint), // cursor indicator
        Span::styled(format!("   {}", i18n::tui_hints_input()), theme.help_dim),
    ];

    let bar = Paragraph::new(Line::from(spans)).style(theme.status_bar);
    frame.render_widget(bar, area);
}

//! Bottom status bar showing transient messages or context-sensitive keyboard hints.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::i18n;
use crate::tui::app::{App, PanelFocus};
use crate::tui::theme::current_theme;

/// Version string shown at the right edge of the status bar.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render the status bar at the bottom with hints and version.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let version_text = format!("v{VERSION} ");
    let version_width = version_text.len() as u16;

    // Split: hints (flexible) | version (fixed)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(version_width)])
        .split(area);

    // Left side: status message, then batch progress, then hints
    let content = if let Some((msg, _)) = &app.status_message {
        let style = if msg.starts_with(i18n::tui_error()) {
            theme.error.bg(ratatui::style::Color::Rgb(30, 30, 46))
        } else {
            theme.status_bar
        };
        Line::from(Span::styled(format!(" {msg}"), style))
    } else if let Some(progress) = app.batch_status() {
        Line::from(Span::styled(format!(" {progress}"), theme.status_bar))
    } else {
        let hints = if app.batch.is_some() {
            i18n::tui_hints_batch()
        } else {
            match app.focus {
                PanelFocus::Dialogs => i18n::tui_hints_dialogs(),
                PanelFocus::Files => i18n::tui_hints_files(),
            }
        };
        Line::from(Span::styled(format!(" {hints}"), theme.status_bar))
    };

    let bar = Paragraph::new(content).style(theme.status_bar);
    frame.render_widget(bar, chunks[0]);

    // Right side: version
    let version = Paragraph::new(Line::from(Span::styled(version_text, theme.border)))
        .alignment(Alignment::Right)
        .style(theme.status_bar);
    frame.render_widget(version, chunks[1]);
}

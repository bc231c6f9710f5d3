//! Gauge shown while a batch is running.

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Gauge};
use ratatui::Frame;

use crate::i18n;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(batch) = &app.batch else {
        return;
    };
    let theme = current_theme();

    let mut label = i18n::status_downloaded(batch.completed, batch.total);
    if batch.failed > 0 {
        label.push_str(&format!(" ({} {})", batch.failed, i18n::cli_failed_items()));
    }

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(format!(" {} ", i18n::tui_progress())),
        )
        .gauge_style(theme.gauge)
        .ratio(batch.ratio())
        .label(label);

    frame.render_widget(gauge, area);
}

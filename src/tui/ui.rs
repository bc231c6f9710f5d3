//! Main render function that dispatches to widgets.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use super::app::App;
use super::widgets;

/// Render the entire TUI frame.
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let gauge_height = if app.batch.is_some() { 3 } else { 0 };

    // Vertical layout: header (1) + content (flex) + gauge (0 or 3) + status (1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // header bar
            Constraint::Min(5),               // content
            Constraint::Length(gauge_height), // progress gauge
            Constraint::Length(1),            // status bar or input bar
        ])
        .split(size);

    widgets::header_bar::render(frame, app, vertical[0]);

    // Content: chats on the left, files on the right
    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(vertical[1]);
    widgets::dialog_list::render(frame, app, split[0]);
    widgets::file_list::render(frame, app, split[1]);

    if app.batch.is_some() {
        widgets::progress_bar::render(frame, app, vertical[2]);
    }

    if app.input_mode.is_some() {
        widgets::input_bar::render(frame, app, vertical[3]);
    } else {
        widgets::status_bar::render(frame, app, vertical[3]);
    }

    // Popups (rendered on top of everything)
    if app.show_categories {
        widgets::category_popup::render(frame, app);
    }
    if app.show_help {
        widgets::help_popup::render(frame);
    }
}

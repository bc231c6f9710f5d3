//! Popup with one toggle per file category.

use ratatui::layout::Constraint;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table};
use ratatui::Frame;

use super::centered_rect_exact;
use crate::i18n;
use crate::model::category::FileCategory;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the category popup centered on screen.
pub fn render(frame: &mut Frame, app: &App) {
    let theme = current_theme();
    let height = FileCategory::ALL.len() as u16 + 5;
    let area = centered_rect_exact(56, height, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(format!(" {} ", i18n::tui_categories_title()))
        .style(theme.popup);

    let rows: Vec<Row> = FileCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let enabled = app.criteria.categories.contains(category);
            let marker = if i == app.category_selected { ">" } else { " " };
            let check = if enabled { "[x]" } else { "[ ]" };
            let style = if i == app.category_selected {
                theme.list_selected
            } else {
                theme.popup
            };
            Row::new(vec![
                Cell::from(marker).style(style),
                Cell::from(check).style(style),
                Cell::from(category.label()).style(style),
                Cell::from(category.extensions().join(" ")).style(theme.help_dim),
            ])
        })
        .collect();

    let footer_rows = vec![
        Row::new(vec![Cell::from(""), Cell::from(""), Cell::from(""), Cell::from("")]),
        Row::new(vec![
            Cell::from(""),
            Cell::from(""),
            Cell::from(i18n::tui_categories_footer()).style(theme.status_bar),
            Cell::from(""),
        ]),
    ];

    let all_rows: Vec<Row> = rows.into_iter().chain(footer_rows).collect();

    let table = Table::new(
        all_rows,
        [
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .block(block)
    .column_spacing(1);

    frame.render_widget(table, area);
}

//! Help popup showing keyboard shortcuts in multi-column layout.

use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::{centered_rect_exact, truncate_str};
use crate::i18n;
use crate::tui::theme::{current_theme, Theme};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A single shortcut entry.
struct Shortcut {
    key: &'static str,
    desc: &'static str,
}

fn sections() -> [(&'static str, Vec<Shortcut>); 3] {
    let s = |key, desc| Shortcut { key, desc };
    [
        (
            i18n::tui_help_navigation(),
            vec![
                s("j / k", i18n::tui_help_move()),
                s("Tab", i18n::tui_help_switch_panel()),
                s("Enter", i18n::tui_help_open_chat()),
                s("r", i18n::tui_help_refresh()),
            ],
        ),
        (
            i18n::tui_help_files(),
            vec![
                s("Space", i18n::tui_help_mark()),
                s("*", i18n::tui_help_mark_all()),
                s("f", i18n::tui_help_categories()),
                s("t", i18n::tui_help_min_date()),
                s("o", i18n::tui_help_folder()),
                s("d", i18n::tui_help_download()),
                s("x", i18n::tui_help_cancel()),
            ],
        ),
        (
            i18n::tui_help_general(),
            vec![s("?", i18n::tui_help_help()), s("q", i18n::tui_help_quit())],
        ),
    ]
}

/// Render the help popup centered on screen with multi-column shortcuts.
pub fn render(frame: &mut Frame) {
    let theme = current_theme();
    let screen = frame.area();

    let popup_width = (screen.width * 78 / 100).min(screen.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(2) as usize; // borders

    let cols = if inner_width >= 90 {
        3
    } else if inner_width >= 56 {
        2
    } else {
        1
    };
    let col_width = inner_width / cols;
    let sep_width = inner_width.saturating_sub(2);

    let lines = build_lines(cols, col_width, sep_width, &theme);

    let content_height = lines.len() as u16 + 1;
    let popup_height = (content_height + 2).min(screen.height.saturating_sub(2));

    let area = centered_rect_exact(popup_width, popup_height, screen);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(format!(" {} ", i18n::tui_help_title()))
        .style(theme.popup);

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn build_lines(cols: usize, col_width: usize, sep_width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled(format!("  {}", i18n::app_name()), theme.popup_title),
            Span::styled(format!("  v{VERSION}"), theme.help_dim),
        ]),
        Line::from(Span::styled(format!("  {}", i18n::app_about()), theme.help_dim)),
        Line::from(""),
    ];

    for (title, shortcuts) in sections() {
        add_section_header(&mut lines, title, theme, sep_width);
        add_shortcuts_columns(&mut lines, &shortcuts, cols, col_width, theme);
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        format!("  {}", i18n::tui_help_close()),
        theme.help_dim,
    )));
    lines
}

/// Add a section header with a trailing separator line.
fn add_section_header(lines: &mut Vec<Line<'static>>, title: &str, theme: &Theme, width: usize) {
    let title_len = title.width() + 4;
    let remaining = width.saturating_sub(title_len);
    lines.push(Line::from(vec![
        Span::styled(format!("  {title} "), theme.help_section),
        Span::styled("\u{2500}".repeat(remaining), theme.help_dim),
    ]));
}

/// Lay out shortcuts in N columns per row.
fn add_shortcuts_columns(
    lines: &mut Vec<Line<'static>>,
    shortcuts: &[Shortcut],
    cols: usize,
    col_width: usize,
    theme: &Theme,
) {
    let key_w: usize = 8;

    for row in shortcuts.chunks(cols) {
        let mut spans: Vec<Span<'static>> = vec![Span::raw("  ")];

        for s in row {
            let padded_key = format!("{:>width$}", s.key, width = key_w);
            let desc = truncate_str(s.desc, col_width.saturating_sub(key_w + 3));
            let padding = col_width.saturating_sub(key_w + 1 + desc.width()).max(1);

            spans.push(Span::styled(padded_key, theme.key_hint));
            spans.push(Span::styled(format!(" {desc}"), theme.popup));
            spans.push(Span::raw(" ".repeat(padding)));
        }

        lines.push(Line::from(spans));
    }
}

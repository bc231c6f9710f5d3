//! TUI widgets for rendering different UI panels.

pub mod category_popup;
pub mod dialog_list;
pub mod file_list;
pub mod header_bar;
pub mod help_popup;
pub mod input_bar;
pub mod progress_bar;
pub mod status_bar;

use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to fit within `max_width` columns, adding "..." if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    let width = UnicodeWidthStr::width(s);
    if width <= max_width {
        return s.to_string();
    }
    let budget = if max_width <= 3 { max_width } else { max_width - 3 };
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > budget {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    if max_width > 3 {
        result.push_str("...");
    }
    result
}

/// Calculate a centered rectangle with exact dimensions, clamped to `area`.
pub(crate) fn centered_rect_exact(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is two columns wide.
        let out = truncate_str("季度报告汇总.pdf", 9);
        assert_eq!(out, "季度报...");
        assert!(UnicodeWidthStr::width(out.as_str()) <= 9);
    }

    #[test]
    fn test_centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered_rect_exact(60, 4, area);
        assert_eq!(r.width, 40);
        assert_eq!(r.y, 3);
    }
}

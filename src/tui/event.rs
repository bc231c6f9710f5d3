//! Keyboard and input event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, InputMode, PanelFocus};
use crate::i18n;
use crate::model::category::FileCategory;

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    // ── Input bar (captures all keys) ─────────────────────
    if app.input_mode.is_some() {
        handle_input(app, key);
        return Ok(());
    }

    // ── Popup handling (captures all keys) ────────────────
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }

    if app.show_categories {
        handle_category_popup(app, key);
        return Ok(());
    }

    // ── Always-available shortcuts ────────────────────────
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            app.request_quit();
            return Ok(());
        }
        (_, KeyCode::Char('?')) => {
            app.show_help = true;
            return Ok(());
        }
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
            app.focus = match app.focus {
                PanelFocus::Dialogs => PanelFocus::Files,
                PanelFocus::Files => PanelFocus::Dialogs,
            };
            return Ok(());
        }
        (_, KeyCode::Char('r')) => {
            if app.client.is_none() {
                app.connect();
            } else {
                app.refresh_dialogs();
            }
            return Ok(());
        }
        (_, KeyCode::Char('o')) => {
            open_input(app, InputMode::DownloadDir);
            return Ok(());
        }
        (_, KeyCode::Char('x')) => {
            app.cancel_download();
            return Ok(());
        }
        _ => {}
    }

    // ── Panel-specific shortcuts ──────────────────────────
    match app.focus {
        PanelFocus::Dialogs => handle_dialog_keys(app, key),
        PanelFocus::Files => handle_file_keys(app, key),
    }
    Ok(())
}

fn open_input(app: &mut App, mode: InputMode) {
    app.input_buffer = match mode {
        InputMode::MinDate => app
            .criteria
            .min_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        InputMode::DownloadDir => app.config.download_dir().display().to_string(),
    };
    app.input_mode = Some(mode);
}

/// Typing into the input bar.
fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = None;
            app.input_buffer.clear();
        }
        KeyCode::Enter => {
            let text = std::mem::take(&mut app.input_buffer);
            let result = match app.input_mode.take() {
                Some(InputMode::MinDate) => app.set_min_date(&text),
                Some(InputMode::DownloadDir) => app.set_download_dir(&text),
                None => Ok(()),
            };
            if let Err(e) = result {
                app.set_status(&format!("{}: {e}", i18n::tui_error()));
            }
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

fn handle_category_popup(app: &mut App, key: KeyEvent) {
    let count = FileCategory::ALL.len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => app.show_categories = false,
        KeyCode::Char('j') | KeyCode::Down => {
            app.category_selected = (app.category_selected + 1) % count;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.category_selected = (app.category_selected + count - 1) % count;
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_category(FileCategory::ALL[app.category_selected]);
        }
        KeyCode::Char('a') => app.toggle_all_categories(),
        _ => {}
    }
}

/// Key handling when the chat list has focus.
fn handle_dialog_keys(app: &mut App, key: KeyEvent) {
    let count = app.dialogs.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.dialog_selected + 1 < count {
                app.dialog_selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.dialog_selected = app.dialog_selected.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.dialog_selected = 0,
        KeyCode::Char('G') | KeyCode::End => app.dialog_selected = count.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.select_dialog(app.dialog_selected),
        _ => {}
    }
}

/// Key handling when the file list has focus.
fn handle_file_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        // ── Navigation ───────────────────────────────────────
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_file(app.file_selected + 1);
            app.ensure_selected_visible();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_file(app.file_selected.saturating_sub(1));
            app.ensure_selected_visible();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.select_file(0);
            app.ensure_selected_visible();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.select_file(app.visible.len().saturating_sub(1));
            app.ensure_selected_visible();
        }
        KeyCode::PageDown => {
            let page = app.list_viewport_height.max(1);
            let new_idx = (app.file_selected + page).min(app.visible.len().saturating_sub(1));
            app.select_file(new_idx);
            app.ensure_selected_visible();
        }
        KeyCode::PageUp => {
            let page = app.list_viewport_height.max(1);
            app.select_file(app.file_selected.saturating_sub(page));
            app.ensure_selected_visible();
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Esc => app.focus = PanelFocus::Dialogs,

        // ── Actions ──────────────────────────────────────────
        KeyCode::Char(' ') => {
            app.toggle_mark();
            app.select_file(app.file_selected + 1);
            app.ensure_selected_visible();
        }
        KeyCode::Char('*') => app.toggle_mark_all(),
        KeyCode::Char('f') => app.show_categories = true,
        KeyCode::Char('t') => open_input(app, InputMode::MinDate),
        KeyCode::Char('d') => app.start_download(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::SessionFile;
    use crate::config::Config;
    use crate::model::attachment::AttachmentMessage;
    use crate::model::handle::RemoteHandle;
    use chrono::{TimeZone, Utc};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_files(rt: &tokio::runtime::Runtime) -> App {
        let mut app = App::new(
            Config::default(),
            None,
            SessionFile::new("/nonexistent"),
            rt.handle().clone(),
        );
        app.messages = ["a.jpg", "b.pdf", "c.mp4"]
            .iter()
            .enumerate()
            .map(|(i, name)| AttachmentMessage {
                id: i as i32 + 1,
                dialog_id: 1,
                file_name: Some(name.to_string()),
                size: None,
                mime_type: None,
                date: Utc.with_ymd_and_hms(2024, 3, 1 + i as u32, 0, 0, 0).unwrap(),
                handle: RemoteHandle::default(),
            })
            .collect();
        app.apply_filter();
        app.focus = PanelFocus::Files;
        app
    }

    #[test]
    fn test_space_marks_and_advances() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app_with_files(&rt);
        handle_key_event(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.marked.contains(&1));
        assert_eq!(app.file_selected, 1);
    }

    #[test]
    fn test_date_input_applies_filter() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app_with_files(&rt);
        handle_key_event(&mut app, key(KeyCode::Char('t'))).unwrap();
        assert_eq!(app.input_mode, Some(InputMode::MinDate));
        for c in "2024-03-02".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.input_mode, None);
        assert_eq!(app.visible.len(), 2);
    }

    #[test]
    fn test_bad_date_keeps_filter() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app_with_files(&rt);
        handle_key_event(&mut app, key(KeyCode::Char('t'))).unwrap();
        for c in "soon".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.visible.len(), 3);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_category_popup_toggles() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app_with_files(&rt);
        handle_key_event(&mut app, key(KeyCode::Char('f'))).unwrap();
        assert!(app.show_categories);
        // Images is first.
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.visible.len(), 2);
        handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(!app.show_categories);
    }

    #[test]
    fn test_q_quits_when_idle() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app_with_files(&rt);
        handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }
}

//! Terminal UI entry point and event loop.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::io;
use std::time::Duration;

use crossterm::event::{poll as ct_poll, read as ct_read, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;

use self::app::App;
use crate::client::session::SessionFile;
use crate::config::{Config, ConfigStore};

/// Run the TUI application. Blocks until the user quits.
///
/// Network work is spawned on `runtime`; this function itself must not be
/// called from inside an async context.
pub fn run_tui(
    config: Config,
    config_store: Option<ConfigStore>,
    session: SessionFile,
    runtime: Handle,
) -> anyhow::Result<()> {
    let mut app = App::new(config, config_store, session, runtime);
    app.connect();

    // Setup terminal (alternate screen)
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal (always, even on error)
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(last) = &app.last_batch {
        println!("{}", last.summary());
    }

    result
}

/// Main event loop: render → poll → handle → repeat.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Poll for events
        if ct_poll(tick_rate)? {
            if let Event::Key(key) = ct_read()? {
                if key.kind == KeyEventKind::Press {
                    event::handle_key_event(app, key)?;
                }
            }
        }

        // Background results and housekeeping
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

//! snapdock-tui: Terminal client for snapdock
//!
//! Pairs with the companion server via a scannable link, then shows the
//! synced photo gallery with per-item upload status. Selection and the
//! copy action go out over the live channel; the channel reconnects on
//! its own.

mod app;
mod input;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use snapdock_core::startup::Startup;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{App, AppResult};
use crate::input::handle_key;

static STARTUP: Startup = Startup::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // One-shot process setup, guarded so re-entry can never double it.
    STARTUP.ensure_started(|| {
        if let Err(err) = init_logging() {
            eprintln!("logging setup failed: {err}");
        }
    });

    // Load config
    let config = snapdock_core::Config::load().unwrap_or_default();

    // Create app; this spawns the connection task and the pairing fetch
    let mut app = App::new(config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Stop the live channel before restoring the terminal
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Tracing to a cache-dir file (stdout would interfere with the TUI)
fn init_logging() -> anyhow::Result<()> {
    let log_file = dirs::cache_dir()
        .map(|d| d.join("snapdock").join("tui.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp/snapdock-tui.log"));

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(std::path::Path::new("/tmp")),
        log_file
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("snapdock-tui.log")),
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "snapdock=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(file_appender))
        .init();

    Ok(())
}

/// Main application loop
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with timeout (lets async tasks progress)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Check for quit
                if key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
                    if app.state.input_mode == snapdock_core::state::InputMode::Normal {
                        return Ok(());
                    }
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle key input
                match handle_key(app, key) {
                    AppResult::Continue => {}
                    AppResult::Quit => return Ok(()),
                }
            }
        }

        // Drain connection and background events
        app.tick();
    }
}

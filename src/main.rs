//! PromptAlchemy CLI
//!
//! Modes:
//! - (none) / tui: interactive workspace
//! - enhance [DRAFT]: one-shot enhancement to stdout
//! - reset-key: forget the stored key
//!
//! EXIT: Ctrl+C / Ctrl+Q from any state, Esc from the unlock modal

use std::io;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{poll, read, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use promptalchemy::cli::{self, parse_args, Mode};
use promptalchemy::config::Settings;
use promptalchemy::logging;
use promptalchemy::ui::{self, map_key, App, AppState};

/// Input poll interval; also the event-drain cadence
const TICK: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            // --help / --version land here too
            let _ = e.print();
            std::process::exit(if e.use_stderr() {
                cli::EXIT_FAILURE
            } else {
                cli::EXIT_SUCCESS
            });
        }
    };

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(cli::EXIT_CONFIG_ERROR);
        }
    };
    settings.apply_overrides(args.model.clone(), args.log_level.clone());
    if let Err(e) = settings.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(cli::EXIT_CONFIG_ERROR);
    }

    // Held until exit so buffered lines are flushed
    let log_guard = match logging::init(&settings.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };
    info!(model = %settings.llm.model, "promptalchemy starting");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let mode = args.mode();
    if mode != Mode::Tui {
        let exit_code = cli::run_cli_mode(mode, &settings, &runtime);
        drop(log_guard);
        std::process::exit(exit_code);
    }

    // Session tasks are spawned from the UI thread
    let _enter = runtime.enter();

    let credentials = cli::build_credential_store(&settings.session);
    let mut session = match cli::build_session(&settings, credentials) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(cli::EXIT_CONFIG_ERROR);
        }
    };
    session.load_credential();

    let mut app = App::new(session, settings.llm.model.clone());
    if let Err(e) = run_tui_mode(&mut app) {
        error!(error = %e, "terminal UI failed");
        return Err(e).context("terminal UI failed");
    }

    info!("promptalchemy exiting");
    Ok(())
}

/// Set up the terminal, run the loop, always restore the terminal
fn run_tui_mode(app: &mut App) -> ui::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    outcome
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> ui::Result<()> {
    while app.state() != AppState::Quitting {
        ui::render(terminal, app)?;

        if poll(TICK)? {
            match read()? {
                Event::Key(key) => {
                    let action = map_key(key, app.session.is_locked());
                    app.apply(action);
                }
                Event::Paste(text) => app.paste(&text),
                _ => {}
            }
        }

        // Enhancement results and toast expiry from background tasks
        app.tick();
    }
    Ok(())
}

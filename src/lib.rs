use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod persistence;
mod preview;
mod project;
mod session;
mod store;
mod suggest;
mod theme;
mod types;
mod ui;
mod util;
use app::App;
use persistence::default_state_dir;
use ui::draw;

const LOG_FILE: &str = "esmart.log";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliOptions {
    state_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    help: bool,
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => opts.help = true,
            "--state-dir" => {
                let dir = args.next().ok_or("--state-dir needs a directory")?;
                opts.state_dir = Some(PathBuf::from(dir));
            }
            "--export-dir" => {
                let dir = args.next().ok_or("--export-dir needs a directory")?;
                opts.export_dir = Some(PathBuf::from(dir));
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(opts)
}

fn print_usage() {
    println!("Usage: esmart [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --state-dir DIR    Where the project snapshot, preview and log live");
    println!("                     (default: $XDG_CONFIG_HOME/esmart or ~/.config/esmart)");
    println!("  --export-dir DIR   Where Ctrl+S downloads the project (default: current directory)");
    println!("  --help             Show this help message");
}

/// Sends `tracing` output to a log file in the state directory; the
/// terminal belongs to the UI. `RUST_LOG` refines the filter.
fn init_logging(state_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(state_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(state_dir.join(LOG_FILE))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

pub fn run() -> io::Result<()> {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            return Ok(());
        }
    };
    if opts.help {
        print_usage();
        return Ok(());
    }

    let Some(state_dir) = opts.state_dir.or_else(default_state_dir) else {
        eprintln!("Could not determine a state directory; pass --state-dir");
        return Ok(());
    };
    let export_dir = match opts.export_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let state_dir = std::path::absolute(state_dir)?;
    init_logging(&state_dir)?;
    info!(state_dir = %state_dir.display(), export_dir = %export_dir.display(), "starting");

    let app = App::new(state_dir, export_dir)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let enhanced_keys =
        ratatui::crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let result = run_app(terminal, app);

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    if enhanced_keys {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    info!("exiting");

    result
}

fn run_app(mut terminal: Terminal<CrosstermBackend<Stdout>>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(&mut app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            // Drain pending events before the next draw so fast scrolling
            // does not queue a redraw per event.
            loop {
                let ev = event::read()?;
                match ev {
                    Event::Key(key) => {
                        if let Err(err) = app.handle_key(key) {
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = app.handle_mouse(mouse) {
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    _ => {}
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

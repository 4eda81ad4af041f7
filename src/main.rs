mod api;
mod app;
mod blocker_form;
mod calendar;
mod config_menu;
mod configuration;
mod context;
mod coordinator;
mod goto;
mod header;
mod help;
mod settings;
mod shortcuts;
mod sidebar;
mod theme;
mod throttle;
mod transition;
mod view_menu;
use crate::app::App;
use crate::settings::Settings;
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    config: Option<PathBuf>,
    log: Option<PathBuf>,
    server: Option<String>,
    date: Option<Date>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    opts.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('l') | Arg::Long("log") => {
                    opts.log = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('s') | Arg::Long("server") => {
                    opts.server = Some(parser.value()?.string()?);
                }
                Arg::Value(value) if opts.date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => opts.date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                if let Some(path) = &opts.log {
                    init_logging(path)?;
                }
                let mut settings =
                    Settings::load(opts.config.as_deref()).context("failed to load settings")?;
                if let Some(server) = opts.server {
                    settings.server = server;
                }
                tracing::info!(server = %settings.server, "Starting up");
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let runtime = Runtime::new().context("failed to start async runtime")?;
                let mut app = App::new(settings, today, runtime.handle().clone());
                if let Some(date) = opts.date {
                    app = app.start_date(date);
                }
                with_terminal(|terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: coursecal [<options>] [YYYY-MM-DD]");
                println!();
                println!("Terminal week planner for an optimized course schedule");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>   Read settings from the given TOML file");
                println!("  -l, --log <FILE>      Write log messages to the given file");
                println!("  -s, --server <URL>    Use the optimizer at the given base URL");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

/// The terminal belongs to the UI, so log messages only go to a file
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(&mut DefaultTerminal) -> anyhow::Result<T>,
{
    let mut terminal = ratatui::init();
    if let Err(e) = execute!(io::stdout(), EnableMouseCapture) {
        ratatui::restore();
        return Err(e).context("failed to enable mouse capture");
    }
    let r = func(&mut terminal);
    if let Err(e) = execute!(io::stdout(), DisableMouseCapture) {
        tracing::warn!(error = %e, "Failed to disable mouse capture");
    }
    ratatui::restore();
    r
}

use crate::config::Config;
use crate::dispatch::{Dispatcher, Outcome};
use crate::environment::Session;
use crate::errors::display_user_error;
use crate::gateway::{ShellProcess, StdFileSystem};
use crate::history::HistoryLog;
use crate::repl::{InputEngine, Repl};
use crate::terminal::CrosstermTerminal;
use anyhow::{Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod dir_index;
pub mod dirs;
pub mod dispatch;
pub mod environment;
pub mod errors;
pub mod gateway;
pub mod history;
pub mod input;
pub mod repl;
pub mod suggestion;
pub mod terminal;

const LOG_FILE: &str = "qfm.log";
const FALLBACK_LOG_FILE: &str = "./debug.log";
const LOG_ENV: &str = "QFM_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dispatch one line (e.g. `notes.txt::info`) and exit
    #[arg(short, long)]
    pub command: Option<String>,

    /// Session root; jumps are resolved below it. Defaults to the home directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file to use instead of the XDG one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// History file to use instead of the configured one
    #[arg(long)]
    pub history: Option<PathBuf>,
}

pub fn lib_main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    setup_panic_handler();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let root = session_root(cli.root.as_deref())?;
    let history_path = match cli.history {
        Some(path) => path,
        None => config.history_path()?,
    };
    let history = HistoryLog::open(&history_path)?;
    info!("session root {:?}, history {:?}", root, history_path);

    let session = Session::new(&root);
    if !session.dir_index.skipped().is_empty() {
        warn!(
            "{} paths under {:?} could not be indexed",
            session.dir_index.skipped().len(),
            root
        );
    }

    if let Some(line) = cli.command.as_deref() {
        Ok(execute_command(session, history, &config, line))
    } else {
        run_interactive(session, history, config)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn session_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => {
            let expanded = shellexpand::tilde(&root.to_string_lossy()).into_owned();
            std::path::absolute(expanded)?
        }
        None => environment::default_root()?,
    };
    let root = dirs::normalize(&root);
    if !root.is_dir() {
        bail!("session root {} is not a directory", root.display());
    }
    Ok(root)
}

/// Dispatch a single line, print what it produced and exit.
pub fn execute_command(
    mut session: Session,
    mut history: HistoryLog,
    config: &Config,
    line: &str,
) -> ExitCode {
    debug!("run command mode {:?}", line);
    session.refresh(&StdFileSystem);
    if let Err(err) = history.append(line) {
        warn!("failed to record history: {:#}", err);
    }

    let mut dispatcher = Dispatcher::new(&mut session, &StdFileSystem, &ShellProcess, config);
    let result = match line.strip_prefix(config.jump_prefix.as_str()) {
        Some(name) => dispatcher.jump(name),
        None => dispatcher.dispatch(line),
    };
    match result {
        Ok(Outcome::Done(message)) => {
            if !message.is_empty() {
                println!("{message}");
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Output(lines)) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::ClearScreen) | Ok(Outcome::Quit) => ExitCode::SUCCESS,
        Err(err) => {
            display_user_error(&err.into());
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(session: Session, history: HistoryLog, config: Config) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        bail!("stdin is not a terminal; use -c to run a single command");
    }
    let engine = InputEngine::new(session, history, config, StdFileSystem, ShellProcess);
    let terminal = CrosstermTerminal::new()?;
    let mut repl = Repl::new(engine, terminal);
    repl.run()
}

pub fn init_tracing() -> Result<()> {
    let log_path =
        environment::get_state_file(LOG_FILE).unwrap_or_else(|_| PathBuf::from(FALLBACK_LOG_FILE));
    let log_file = match std::fs::File::create(&log_path) {
        Ok(file) => file,
        Err(_) => std::fs::File::create(FALLBACK_LOG_FILE)?,
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Arc::new(log_file))
        .init();
    Ok(())
}

pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        // Restore the terminal before printing anything.
        let _ = crossterm::terminal::disable_raw_mode();

        let payload = panic_info.payload().downcast_ref::<&str>().map_or_else(
            || {
                if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic payload".to_string()
                }
            },
            |s| (*s).to_string(),
        );

        let location = panic_info.location().map_or_else(
            || "Unknown location".to_string(),
            |location| {
                format!(
                    "{}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                )
            },
        );

        let backtrace = std::backtrace::Backtrace::capture();
        let backtrace_str = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => format!("\nBacktrace:\n{backtrace}"),
            std::backtrace::BacktraceStatus::Disabled => {
                "\nBacktrace: disabled (set RUST_BACKTRACE=1 to enable)".to_string()
            }
            _ => "\nBacktrace: unsupported".to_string(),
        };

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC");
        tracing::error!("PANIC OCCURRED: {payload} at {location}{backtrace_str}");

        eprintln!("\n=== quickfm PANIC ===");
        eprintln!("Message: {payload}");
        eprintln!("Location: {location}");
        eprintln!("Timestamp: {timestamp}");
        eprintln!("See {LOG_FILE} in the quickfm state directory for details");
        eprintln!("=====================\n");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["qfm", "--root", "/tmp", "-c", "::currdir"]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.command.as_deref(), Some("::currdir"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_session_root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        assert!(session_root(Some(&file)).is_err());
        assert_eq!(session_root(Some(dir.path())).unwrap(), dir.path());
    }

    #[test]
    fn test_execute_command_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = dir.path().join("history");
        let history = HistoryLog::open(&history_path).unwrap();
        let session = Session::new(dir.path());
        let code = execute_command(session, history, &Config::default(), "x::newdir");
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(dir.path().join("x").is_dir());
        assert_eq!(fs::read_to_string(&history_path).unwrap(), "x::newdir\n");

        let history = HistoryLog::open(&history_path).unwrap();
        let session = Session::new(dir.path());
        let code = execute_command(session, history, &Config::default(), "x::newdir");
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(HistoryLog::open(&history_path).unwrap().len(), 2);
    }
}

//! Terminal access for the interactive loop.
//!
//! The engine only sees [`TerminalIo`]; [`CrosstermTerminal`] is the real
//! implementation and owns the raw-mode guard for the session.

pub mod renderer;

use crate::repl::key_action::{InputEvent, classify_key};
use anyhow::{Context as _, Result};
use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::sys::termios::tcgetattr;
use renderer::TerminalRenderer;
use std::sync::OnceLock;
use tracing::{debug, warn};

const DEFAULT_WIDTH: usize = 80;

pub trait TerminalIo {
    /// Block until the next classified input event. `None` for events the
    /// engine does not handle (resize, focus, mouse).
    fn read_event(&mut self) -> Result<Option<InputEvent>>;
    /// Replace the status line.
    fn write_status(&mut self, line: &str) -> Result<()>;
    /// Print lines above the status line.
    fn write_output(&mut self, lines: &[String]) -> Result<()>;
    fn clear_screen(&mut self) -> Result<()>;
    fn width(&self) -> usize;
}

static SAVED_TERMIOS: OnceLock<libc::termios> = OnceLock::new();

extern "C" fn restore_and_exit(signal: libc::c_int) {
    if let Some(termios) = SAVED_TERMIOS.get() {
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios);
        }
    }
    unsafe { libc::_exit(128 + signal) };
}

/// Remember the cooked terminal settings and restore them if the process is
/// terminated by a signal while raw mode is on.
fn install_termination_handlers() -> Result<()> {
    let termios = tcgetattr(libc::STDIN_FILENO).context("failed to read terminal settings")?;
    let _ = SAVED_TERMIOS.set(termios.into());

    let action = SigAction::new(
        SigHandler::Handler(restore_and_exit),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in [Signal::SIGTERM, Signal::SIGHUP, Signal::SIGQUIT] {
        unsafe {
            sigaction(signal, &action).with_context(|| format!("failed to install {signal}"))?;
        }
    }
    Ok(())
}

/// Keeps the terminal in raw mode for its lifetime.
pub struct RawModeGuard {
    was_enabled: bool,
}

impl RawModeGuard {
    pub fn new() -> Result<Self> {
        let was_enabled = terminal::is_raw_mode_enabled().unwrap_or(false);
        if !was_enabled {
            if let Err(err) = install_termination_handlers() {
                warn!("terminal will not be restored on termination: {:#}", err);
            }
            terminal::enable_raw_mode().context("failed to enable raw mode")?;
        }
        debug!("raw mode on");
        Ok(RawModeGuard { was_enabled })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_enabled {
            terminal::disable_raw_mode().ok();
            debug!("raw mode off");
        }
    }
}

pub struct CrosstermTerminal {
    renderer: TerminalRenderer,
    _raw_mode: RawModeGuard,
}

impl CrosstermTerminal {
    pub fn new() -> Result<Self> {
        Ok(CrosstermTerminal {
            renderer: TerminalRenderer::new(),
            _raw_mode: RawModeGuard::new()?,
        })
    }
}

impl TerminalIo for CrosstermTerminal {
    fn read_event(&mut self) -> Result<Option<InputEvent>> {
        match event::read().context("failed to read terminal event")? {
            Event::Key(key) => Ok(classify_key(&key)),
            other => {
                debug!("ignored event {:?}", other);
                Ok(None)
            }
        }
    }

    fn write_status(&mut self, line: &str) -> Result<()> {
        queue!(
            self.renderer,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.renderer.flush()?;
        Ok(())
    }

    fn write_output(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            queue!(
                self.renderer,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(line),
                Print("\r\n")
            )?;
        }
        self.renderer.flush()?;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        queue!(self.renderer, Clear(ClearType::All), MoveTo(0, 0))?;
        self.renderer.flush()?;
        Ok(())
    }

    fn width(&self) -> usize {
        match terminal::size() {
            Ok((columns, _)) if columns > 0 => columns as usize,
            Ok(_) => DEFAULT_WIDTH,
            Err(err) => {
                warn!("failed to get terminal size: {}, using {}", err, DEFAULT_WIDTH);
                DEFAULT_WIDTH
            }
        }
    }
}

//! The keystroke state machine.
//!
//! [`InputEngine::handle_event`] consumes one [`InputEvent`], updates the
//! mode and buffers, dispatches on Enter, recomputes suggestions and returns
//! what should be drawn. It never blocks on the terminal and never fails:
//! dispatch errors come back as a one-line message.

use super::key_action::InputEvent;
use super::mode::Mode;
use crate::config::Config;
use crate::dirs::short_location;
use crate::dispatch::command::Command;
use crate::dispatch::parse::{ARGUMENT_SEPARATOR, CommandLine};
use crate::dispatch::{Dispatcher, Outcome};
use crate::environment::Session;
use crate::history::HistoryLog;
use crate::suggestion::{RankOrder, rank};
use qfm_types::{ExternalProcess, FileSystemGateway, FmError};
use std::mem;
use tracing::{debug, warn};

/// Everything the renderer needs after one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Lines to print above the status line (listings, command output).
    pub output: Vec<String>,
    /// Outcome or error of the last commit.
    pub message: Option<String>,
    /// Short form of the working directory.
    pub location: String,
    /// The current input line, unsubstituted.
    pub input: String,
    /// Full ranked list; the renderer applies the display limit.
    pub suggestions: Vec<String>,
    pub clear_screen: bool,
    pub quit: bool,
}

pub struct InputEngine<F, P> {
    session: Session,
    mode: Mode,
    history: HistoryLog,
    config: Config,
    suggestions: Vec<String>,
    fs: F,
    process: P,
}

impl<F, P> InputEngine<F, P>
where
    F: FileSystemGateway,
    P: ExternalProcess,
{
    pub fn new(mut session: Session, history: HistoryLog, config: Config, fs: F, process: P) -> Self {
        session.refresh(&fs);
        let mut engine = InputEngine {
            session,
            mode: Mode::default(),
            history,
            config,
            suggestions: Vec::new(),
            fs,
            process,
        };
        engine.refresh_suggestions();
        engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The current input line as typed.
    pub fn line(&self) -> String {
        self.mode.line(&self.config.jump_prefix)
    }

    /// Process one event to completion.
    pub fn handle_event(&mut self, event: InputEvent) -> RenderRequest {
        let mut request = RenderRequest::default();
        match event {
            InputEvent::Char(ch) => self.type_char(ch),
            InputEvent::Sigil => self.mode.push_sigil(),
            InputEvent::Backspace => self.mode.backspace(&self.config.jump_prefix),
            InputEvent::Tab => self.autofill(),
            InputEvent::Enter => self.commit(&mut request),
            InputEvent::HistoryUp => self.recall_back(),
            InputEvent::HistoryDown => self.recall_forward(),
            InputEvent::OtherEscape => {}
            InputEvent::Interrupt => {
                debug!("interrupt, quitting");
                request.quit = true;
            }
        }
        self.refresh_suggestions();
        self.fill(request)
    }

    /// A request describing the current state, with nothing to report.
    pub fn snapshot(&self) -> RenderRequest {
        self.fill(RenderRequest::default())
    }

    fn fill(&self, mut request: RenderRequest) -> RenderRequest {
        request.location = short_location(self.session.working_dir());
        request.input = self.line();
        request.suggestions = self.suggestions.clone();
        request
    }

    fn type_char(&mut self, ch: char) {
        let prefix = &self.config.jump_prefix;
        if self.mode.is_capturing() && ch == ' ' {
            self.mode.finish_capture();
            self.mode.push_char(ch, prefix);
            return;
        }
        self.mode.push_char(ch, prefix);
        if let Some(token) = self.mode.token()
            && self.variable_suggestions(token).is_empty()
        {
            self.mode.finish_capture();
        }
    }

    fn autofill(&mut self) {
        if let Some(first) = self.suggestions.first() {
            debug!("autofill {:?}", first);
            self.mode.replace_active(first);
        }
    }

    fn recall_back(&mut self) {
        if let Some(entry) = self.history.back() {
            self.mode = Mode::from_line(entry, &self.config.jump_prefix);
        }
    }

    fn recall_forward(&mut self) {
        if self.history.at_end() {
            return;
        }
        self.mode = match self.history.forward() {
            Some(entry) => Mode::from_line(entry, &self.config.jump_prefix),
            None => Mode::default(),
        };
    }

    /// Replace a partial command name with its first suggestion. Once an
    /// argument is typed no suggestion is shown, so nothing is completed.
    fn complete_command_name(&mut self) {
        let Mode::CommandEntry { command, .. } = &mut self.mode else {
            return;
        };
        let name = command.as_str().trim();
        if name.is_empty()
            || name.contains(ARGUMENT_SEPARATOR)
            || Command::from_name(name).is_some()
        {
            return;
        }
        let Some(first) = rank(name, Command::names(), self.config.command_order())
            .into_iter()
            .next()
        else {
            return;
        };
        command.reset(&first);
    }

    fn commit(&mut self, request: &mut RenderRequest) {
        self.mode.finish_capture();
        self.complete_command_name();
        let line = self.line();
        let mode = mem::take(&mut self.mode);
        if line.trim().is_empty() {
            return;
        }

        // Recorded before dispatch so failed commands are kept too.
        if let Err(err) = self.history.append(&line) {
            warn!("failed to record history: {:#}", err);
        }

        let mut dispatcher =
            Dispatcher::new(&mut self.session, &self.fs, &self.process, &self.config);
        let result = match &mode {
            Mode::PathEntry { query } => dispatcher.navigate(query.as_str()),
            Mode::CommandEntry { target, command } => dispatcher.execute(
                CommandLine::from_parts(target.as_str(), command.as_str()),
            ),
            Mode::Jump { target } => dispatcher.jump(target.as_str()),
            // Capture was finished above.
            Mode::VariableCapture { .. } => dispatcher.navigate(&line),
        };
        match result {
            Ok(Outcome::Done(message)) => {
                if !message.is_empty() {
                    request.message = Some(message);
                }
            }
            Ok(Outcome::Output(lines)) => request.output = lines,
            Ok(Outcome::ClearScreen) => request.clear_screen = true,
            Ok(Outcome::Quit) => request.quit = true,
            Err(err) => {
                warn!("{:?} failed: {}", line, err);
                if let FmError::AmbiguousJump { candidates, .. } = &err {
                    request.output = candidates
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect();
                }
                request.message = Some(err.to_string());
            }
        }

        self.session.refresh(&self.fs);
        self.history.reset_index();
    }

    fn variable_suggestions(&self, token: &str) -> Vec<String> {
        rank(token, self.session.variables.keys(), RankOrder::Natural)
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = match &self.mode {
            Mode::PathEntry { query } => rank(
                query.as_str(),
                self.session.entries(),
                self.config.path_order(),
            ),
            Mode::CommandEntry { command, .. } if command.as_str().contains(ARGUMENT_SEPARATOR) => {
                Vec::new()
            }
            Mode::CommandEntry { command, .. } => rank(
                command.as_str().trim(),
                Command::names(),
                self.config.command_order(),
            ),
            Mode::Jump { target } => rank(
                target.as_str(),
                self.session.dir_index.leaf_names(),
                RankOrder::Natural,
            ),
            Mode::VariableCapture { token, .. } => self.variable_suggestions(token.as_str()),
        };
    }
}

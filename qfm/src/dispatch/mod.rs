//! Turns committed lines into filesystem and process operations.
//!
//! The interactive engine already knows whether a line is a command and
//! calls [`Dispatcher::execute`] or [`Dispatcher::navigate`] directly.
//! [`Dispatcher::dispatch`] serves plain text lines (`-c`), where a `::`
//! separator marks a command and anything else is navigation.
//! Every failure comes back as an [`FmError`] for the caller to show as a
//! single status line.

pub mod command;
pub mod parse;

use crate::config::Config;
use crate::dir_index::JumpResolution;
use crate::dirs::{leaf_name, resolve};
use crate::environment::Session;
use crate::suggestion::rank;
use chrono::{DateTime, Local};
use command::{Arity, Command};
use parse::{ARGUMENT_SEPARATOR, CommandLine};
use qfm_types::{ExternalProcess, FileSystemGateway, FmError, FmResult};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// What a committed line did, for the engine to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Finished; the message may be empty.
    Done(String),
    /// Lines to print above the status line.
    Output(Vec<String>),
    ClearScreen,
    Quit,
}

impl Outcome {
    fn silent() -> Outcome {
        Outcome::Done(String::new())
    }
}

pub struct Dispatcher<'a, F, P> {
    session: &'a mut Session,
    fs: &'a F,
    process: &'a P,
    config: &'a Config,
}

impl<'a, F, P> Dispatcher<'a, F, P>
where
    F: FileSystemGateway,
    P: ExternalProcess,
{
    pub fn new(session: &'a mut Session, fs: &'a F, process: &'a P, config: &'a Config) -> Self {
        Dispatcher {
            session,
            fs,
            process,
            config,
        }
    }

    /// Run one committed text line.
    pub fn dispatch(&mut self, line: &str) -> FmResult<Outcome> {
        match CommandLine::parse(line) {
            Some(command_line) => self.execute(command_line),
            None => self.navigate(line),
        }
    }

    /// Enter a directory or open a file. A partial name resolves to the first
    /// ranked entry of the working directory.
    pub fn navigate(&mut self, query: &str) -> FmResult<Outcome> {
        let query = self.session.variables.substitute(query.trim());
        if query.is_empty() {
            return Ok(Outcome::silent());
        }
        if query == ".." {
            return self.go_parent();
        }

        let name = rank(&query, self.session.entries(), self.config.path_order())
            .into_iter()
            .next()
            .unwrap_or(query);
        let path = resolve(self.session.working_dir(), &name);
        let stat = self
            .fs
            .stat(&path)
            .map_err(|_| FmError::TargetNotFound(name.clone()))?;

        if stat.is_dir {
            self.session.change_dir(&path, self.fs);
            Ok(Outcome::silent())
        } else {
            self.process.open_with(&self.config.opener, &path)?;
            Ok(Outcome::Done(format!("Opened {name}")))
        }
    }

    pub fn go_parent(&mut self) -> FmResult<Outcome> {
        match self.session.working_dir().parent().map(Path::to_path_buf) {
            Some(parent) => {
                self.session.change_dir(&parent, self.fs);
                Ok(Outcome::silent())
            }
            None => Ok(Outcome::Done("Already at the root directory".to_string())),
        }
    }

    /// Jump to the directory below the session root whose leaf name is `name`.
    pub fn jump(&mut self, name: &str) -> FmResult<Outcome> {
        let name = self.session.variables.substitute(name.trim());
        if name.is_empty() {
            return Err(FmError::MissingTarget);
        }
        match self.session.dir_index.resolve(&name) {
            JumpResolution::Unique(path) if self.fs.is_dir(&path) => {
                self.session.change_dir(&path, self.fs);
                Ok(Outcome::silent())
            }
            JumpResolution::Unique(path) => {
                warn!("index entry {:?} is stale, rescanning", path);
                self.session.dir_index.rescan();
                Err(FmError::JumpNotFound(name))
            }
            JumpResolution::NotFound => Err(FmError::JumpNotFound(name)),
            JumpResolution::Ambiguous(candidates) => {
                Err(FmError::AmbiguousJump { name, candidates })
            }
        }
    }

    /// Validate and run a parsed command.
    pub fn execute(&mut self, line: CommandLine) -> FmResult<Outcome> {
        let command = Command::from_name(&line.command)
            .ok_or_else(|| FmError::InvalidCommand(line.command.clone()))?;
        debug!("dispatch {:?} {:?}", command, line);

        match command.arity() {
            Arity::Session => return self.run_session(command, &line),
            Arity::Special => return self.run_special(command, &line),
            Arity::Target if command == Command::List && line.target.is_empty() => {
                if line.argument.is_some() {
                    return Err(does_not_accept(command));
                }
                let wd = self.session.working_dir().to_path_buf();
                return self.list(&wd);
            }
            Arity::Target | Arity::TargetAndArgument => {}
        }

        let target = self.session.variables.substitute(&line.target);
        if target.is_empty() {
            return Err(FmError::MissingTarget);
        }
        let path = resolve(self.session.working_dir(), &target);
        if !command.creates_target() && !self.fs.exists(&path) {
            return Err(FmError::TargetNotFound(target));
        }

        match (command.arity(), line.argument.as_deref()) {
            (Arity::Target, None) => self.run_on_target(command, &target, &path),
            (Arity::Target, Some(_)) => Err(does_not_accept(command)),
            (_, None) | (_, Some("")) => Err(FmError::MissingArgument {
                command: command.name().to_string(),
            }),
            (_, Some(argument)) if argument.contains(ARGUMENT_SEPARATOR) => {
                Err(does_not_accept(command))
            }
            (_, Some(argument)) => {
                let argument = self.session.variables.substitute(argument);
                self.run_with_argument(command, &path, &argument)
            }
        }
    }

    fn run_session(&mut self, command: Command, line: &CommandLine) -> FmResult<Outcome> {
        if !line.target.is_empty() || line.argument.is_some() {
            return Err(does_not_accept(command));
        }
        match command {
            Command::Quit => Ok(Outcome::Quit),
            Command::Clear => Ok(Outcome::ClearScreen),
            Command::CurrDir => Ok(Outcome::Output(vec![
                self.session.working_dir().display().to_string(),
            ])),
            Command::VarList => Ok(Outcome::Output(
                self.session
                    .variables
                    .iter()
                    .map(|(key, value)| format!("{} = {}", key.trim_start_matches('$'), value))
                    .collect(),
            )),
            other => Err(FmError::InvalidCommand(other.name().to_string())),
        }
    }

    fn run_special(&mut self, command: Command, line: &CommandLine) -> FmResult<Outcome> {
        let missing = || FmError::MissingArgument {
            command: command.name().to_string(),
        };
        let argument = line.argument.as_deref().filter(|a| !a.is_empty());
        match command {
            Command::RunCmd => {
                let command_line = self.session.variables.substitute(argument.ok_or_else(missing)?);
                let output = self
                    .process
                    .run_in_foreground(&command_line, self.session.working_dir())?;
                Ok(Outcome::Output(output.lines().map(str::to_string).collect()))
            }
            Command::Variable => {
                let (name, value) = argument
                    .and_then(|a| a.split_once(ARGUMENT_SEPARATOR))
                    .ok_or_else(missing)?;
                let value = self.session.variables.substitute(value.trim());
                self.session.variables.set(name, &value)?;
                info!("variable ${} = {:?}", name.trim(), value);
                Ok(Outcome::silent())
            }
            other => Err(FmError::InvalidCommand(other.name().to_string())),
        }
    }

    fn run_on_target(&mut self, command: Command, target: &str, path: &Path) -> FmResult<Outcome> {
        match command {
            Command::New => {
                self.fs.create_file(path)?;
                Ok(Outcome::Done(format!("Created file {target}")))
            }
            Command::NewDir => {
                let result = self.fs.create_dir(path);
                self.track_index(true, result)?;
                self.session.dir_index.insert(path);
                Ok(Outcome::Done(format!("Created directory {target}")))
            }
            Command::List => self.list(path),
            Command::Info => self.info(target, path),
            Command::Remove => {
                let is_dir = self.fs.is_dir(path);
                let result = if is_dir {
                    self.fs.remove_dir(path)
                } else {
                    self.fs.remove_file(path)
                };
                self.track_index(is_dir, result)?;
                if is_dir {
                    self.session.dir_index.remove_tree(path);
                }
                Ok(Outcome::Done(format!("Removed {target}")))
            }
            Command::Purge => {
                let is_dir = self.fs.is_dir(path);
                let result = if is_dir {
                    self.fs.remove_tree(path)
                } else {
                    self.fs.remove_file(path)
                };
                self.track_index(is_dir, result)?;
                if is_dir {
                    self.session.dir_index.remove_tree(path);
                }
                Ok(Outcome::Done(format!("Purged {target}")))
            }
            other => Err(FmError::InvalidCommand(other.name().to_string())),
        }
    }

    fn run_with_argument(&mut self, command: Command, path: &Path, argument: &str) -> FmResult<Outcome> {
        let is_dir = self.fs.is_dir(path);
        match command {
            Command::Rename => {
                let dest = resolve(self.session.working_dir(), argument);
                self.ensure_free(&dest)?;
                let result = self.fs.rename(path, &dest);
                self.track_index(is_dir, result)?;
                if is_dir {
                    self.session.dir_index.relocate(path, &dest);
                }
                Ok(Outcome::Done(format!("Renamed {} to {}", leaf_name(path), leaf_name(&dest))))
            }
            Command::MoveTo => {
                let dest = self.destination_for(path, argument);
                self.ensure_free(&dest)?;
                let result = self.fs.move_path(path, &dest);
                self.track_index(is_dir, result)?;
                if is_dir {
                    self.session.dir_index.relocate(path, &dest);
                }
                Ok(Outcome::Done(format!("Moved {} to {}", leaf_name(path), dest.display())))
            }
            Command::CopyTo => {
                let dest = self.destination_for(path, argument);
                if is_dir {
                    self.ensure_free(&dest)?;
                    let result = self.fs.copy_tree(path, &dest);
                    self.track_index(true, result)?;
                    self.session.dir_index.insert_tree(&dest);
                } else {
                    self.fs.copy_file(path, &dest)?;
                }
                Ok(Outcome::Done(format!("Copied {} to {}", leaf_name(path), dest.display())))
            }
            Command::Editor => {
                self.process.open_with(argument, path)?;
                Ok(Outcome::Done(format!("Opened {} with {}", leaf_name(path), argument)))
            }
            other => Err(FmError::InvalidCommand(other.name().to_string())),
        }
    }

    /// `dest` itself, or `dest/<leaf of path>` when `dest` is an existing directory.
    fn destination_for(&self, path: &Path, argument: &str) -> PathBuf {
        let dest = resolve(self.session.working_dir(), argument);
        if self.fs.is_dir(&dest) {
            dest.join(leaf_name(path))
        } else {
            dest
        }
    }

    fn ensure_free(&self, dest: &Path) -> FmResult<()> {
        if self.fs.exists(dest) {
            Err(FmError::DestinationExists(dest.display().to_string()))
        } else {
            Ok(())
        }
    }

    /// Pass `result` through. When an index-mutating operation fails partway
    /// the incremental bookkeeping cannot be trusted, so rescan.
    fn track_index<T>(&mut self, mutates_index: bool, result: FmResult<T>) -> FmResult<T> {
        if mutates_index && result.is_err() {
            warn!("directory operation failed, rescanning index");
            self.session.dir_index.rescan();
        }
        result
    }

    fn list(&self, path: &Path) -> FmResult<Outcome> {
        let mut names = self.fs.list(path)?;
        if self.config.sort_paths {
            names.sort();
        }
        Ok(Outcome::Output(names))
    }

    fn info(&self, target: &str, path: &Path) -> FmResult<Outcome> {
        let stat = self.fs.stat(path)?;
        Ok(Outcome::Output(vec![
            format!("Name:          {}", target),
            format!("Size:          {}", format_size(stat.size)),
            format!("Created:       {}", format_time(stat.created)),
            format!("Modified:      {}", format_time(stat.modified)),
            format!("Last accessed: {}", format_time(stat.accessed)),
        ]))
    }
}

fn does_not_accept(command: Command) -> FmError {
    FmError::CommandDoesNotAcceptArgument {
        command: command.name().to_string(),
    }
}

pub fn format_size(size: u64) -> String {
    let mut size = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown".to_string(),
    }
}

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// quickfm specific error types
///
/// Every variant is recoverable: the input engine turns it into a single
/// status line and keeps the session alive.
#[derive(Error, Debug)]
pub enum FmError {
    #[error("Invalid command: '{0}'")]
    InvalidCommand(String),

    #[error("{command}: missing argument")]
    MissingArgument { command: String },

    #[error("{command}: command doesn't accept an argument")]
    CommandDoesNotAcceptArgument { command: String },

    #[error("Missing file or directory name")]
    MissingTarget,

    #[error("Path doesn't exist: {0}")]
    TargetNotFound(String),

    #[error("Multiple directories named '{name}'. Go to a parent directory to jump precisely")]
    AmbiguousJump {
        name: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Either '{0}' doesn't exist or access is denied")]
    JumpNotFound(String),

    #[error("Cannot use '$' in variable name: '{0}'")]
    VariableNameConflict(String),

    #[error("'{0}' is maintained by the session and cannot be set")]
    ReservedVariable(String),

    #[error("Destination already exists: {0}")]
    DestinationExists(String),

    #[error("{operation} failed on {}: {source}", path.display())]
    IoFailure {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Process execution failed: {message}")]
    Process { message: String },
}

impl FmError {
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        FmError::IoFailure {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type FmResult<T> = std::result::Result<T, FmError>;

/// Metadata reported by `FileSystemGateway::stat`.
///
/// Timestamps are optional because not every filesystem records them.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size: u64,
    pub is_dir: bool,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
}

/// Filesystem capability used by the dispatcher and the input engine.
///
/// Paths handed to the gateway are always absolute.
pub trait FileSystemGateway {
    /// Names (not paths) of the entries of `path`, in enumeration order.
    fn list(&self, path: &Path) -> FmResult<Vec<String>>;
    fn stat(&self, path: &Path) -> FmResult<FileStat>;
    /// Creates an empty file, failing if it already exists.
    fn create_file(&self, path: &Path) -> FmResult<()>;
    fn create_dir(&self, path: &Path) -> FmResult<()>;
    fn remove_file(&self, path: &Path) -> FmResult<()>;
    /// Removes an empty directory.
    fn remove_dir(&self, path: &Path) -> FmResult<()>;
    fn remove_tree(&self, path: &Path) -> FmResult<()>;
    fn move_path(&self, from: &Path, to: &Path) -> FmResult<()>;
    fn copy_file(&self, from: &Path, to: &Path) -> FmResult<()>;
    fn copy_tree(&self, from: &Path, to: &Path) -> FmResult<()>;
    fn rename(&self, from: &Path, to: &Path) -> FmResult<()>;

    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.stat(path).map(|stat| stat.is_dir).unwrap_or(false)
    }
}

/// Blocking access to programs outside the file manager.
pub trait ExternalProcess {
    /// Runs `command_line` through the shell in `working_dir` and returns its
    /// combined output once it exits.
    fn run_in_foreground(&self, command_line: &str, working_dir: &Path) -> FmResult<String>;

    /// Opens `path` with `tool`, handing the terminal over until it exits.
    fn open_with(&self, tool: &str, path: &Path) -> FmResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failure_carries_cause() {
        let err = FmError::io(
            "create directory",
            "/tmp/x",
            io::Error::new(io::ErrorKind::AlreadyExists, "File exists"),
        );
        let msg = err.to_string();
        assert!(msg.contains("create directory"));
        assert!(msg.contains("/tmp/x"));
        assert!(msg.contains("File exists"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn ambiguous_jump_message_names_leaf() {
        let err = FmError::AmbiguousJump {
            name: "logs".to_string(),
            candidates: vec![PathBuf::from("/a/logs"), PathBuf::from("/b/logs")],
        };
        assert!(err.to_string().contains("'logs'"));
    }
}

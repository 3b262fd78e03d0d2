//! Session state shared by the input engine and the dispatcher.
//!
//! - [`variables`] - variable storage and `$NAME` substitution
//!
//! The session owns the working directory, the session root, the listing of
//! the working directory used for path suggestions, the directory index used
//! for jumps, and the variable store. It is passed by reference to whatever
//! needs it; nothing here is global.

pub mod variables;

use crate::dir_index::DirectoryIndex;
use anyhow::Context as _;
use anyhow::Result;
use qfm_types::FileSystemGateway;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use variables::VariableStore;

pub const APP_NAME: &str = "quickfm";

pub struct Session {
    working_dir: PathBuf,
    pub variables: VariableStore,
    pub dir_index: DirectoryIndex,
    entries: Vec<String>,
}

impl Session {
    /// Start a session rooted at `root`, indexing every directory below it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir_index = DirectoryIndex::build(&root);
        Self::with_index(root, dir_index)
    }

    fn with_index(root: PathBuf, dir_index: DirectoryIndex) -> Self {
        Session {
            variables: VariableStore::new(&root),
            working_dir: root,
            dir_index,
            entries: Vec::new(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Names in the working directory, in listing order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Make `path` the working directory and reload its listing.
    pub fn change_dir<F: FileSystemGateway>(&mut self, path: &Path, fs: &F) {
        debug!("chdir {:?} -> {:?}", self.working_dir, path);
        self.working_dir = path.to_path_buf();
        self.variables.set_working_dir(path);
        self.refresh(fs);
    }

    /// Reload the working directory listing. If the working directory has
    /// vanished, fall back to its nearest existing ancestor.
    pub fn refresh<F: FileSystemGateway>(&mut self, fs: &F) {
        while !fs.is_dir(&self.working_dir) {
            match self.working_dir.parent() {
                Some(parent) => {
                    warn!("{:?} is gone, moving up", self.working_dir);
                    self.working_dir = parent.to_path_buf();
                }
                None => break,
            }
        }
        self.variables.set_working_dir(&self.working_dir);

        self.entries = match fs.list(&self.working_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to list {:?}: {}", self.working_dir, err);
                Vec::new()
            }
        };
    }
}

/// The session root used when none is given: the home directory, or the
/// current directory when there is no home.
pub fn default_root() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(home) => Ok(home),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

/// Get the path to a config file, if one exists.
pub fn find_config_file(name: &str) -> Result<Option<PathBuf>> {
    let xdg_dir =
        xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
    Ok(xdg_dir.find_config_file(name))
}

/// Get the path to a data file.
pub fn get_data_file(name: &str) -> Result<PathBuf> {
    let xdg_dir =
        xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
    xdg_dir.place_data_file(name).context("failed get path")
}

/// Get the path to a state file (e.g. logs).
pub fn get_state_file(name: &str) -> Result<PathBuf> {
    let xdg_dir =
        xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")?;
    xdg_dir.place_state_file(name).context("failed get path")
}

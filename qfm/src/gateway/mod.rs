//! std-backed implementations of the filesystem and external-process
//! capabilities.

mod fs;
mod process;

pub use fs::StdFileSystem;
pub use process::ShellProcess;

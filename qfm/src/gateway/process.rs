use crossterm::terminal;
use qfm_types::{ExternalProcess, FmError, FmResult};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Runs external programs through `sh`, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcess;

/// Leaves raw mode for as long as it lives, so a child that owns the
/// terminal sees the operator's normal settings.
struct CookedModeGuard {
    was_raw: bool,
}

impl CookedModeGuard {
    fn new() -> Self {
        let was_raw = terminal::is_raw_mode_enabled().unwrap_or(false);
        if was_raw && let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
        CookedModeGuard { was_raw }
    }
}

impl Drop for CookedModeGuard {
    fn drop(&mut self) {
        if self.was_raw && let Err(e) = terminal::enable_raw_mode() {
            warn!("Failed to re-enter raw mode: {}", e);
        }
    }
}

impl ExternalProcess for ShellProcess {
    fn run_in_foreground(&self, command_line: &str, working_dir: &Path) -> FmResult<String> {
        debug!("runcmd {:?} in {:?}", command_line, working_dir);
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FmError::io("run", working_dir, e))?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            debug!("runcmd exited with {}", output.status);
        }
        Ok(captured)
    }

    fn open_with(&self, tool: &str, path: &Path) -> FmResult<()> {
        debug!("open {:?} with {:?}", path, tool);
        let _cooked = CookedModeGuard::new();
        let status = Command::new(tool)
            .arg(path)
            .status()
            .map_err(|e| FmError::Process {
                message: format!("{tool}: {e}"),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(FmError::Process {
                message: format!("{tool} exited with {status}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_output_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let out = ShellProcess
            .run_in_foreground("ls; echo oops >&2", dir.path())
            .unwrap();
        assert!(out.contains("marker.txt"));
        assert!(out.contains("oops"));
    }

    #[test]
    fn test_open_with_missing_tool_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellProcess
            .open_with("qfm-no-such-tool", dir.path())
            .unwrap_err();
        assert!(matches!(err, FmError::Process { .. }));
    }
}

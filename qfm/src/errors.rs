use qfm_types::FmError;

/// Lines describing `err` for the user, without backtraces or debug output.
pub fn user_error_lines(err: &anyhow::Error) -> Vec<String> {
    match err.downcast_ref::<FmError>() {
        Some(FmError::AmbiguousJump { candidates, .. }) => {
            let mut lines = vec![format!("qfm: {}", err)];
            lines.extend(candidates.iter().map(|path| format!("  {}", path.display())));
            lines
        }
        Some(fm_err) => vec![format!("qfm: {}", fm_err)],
        None => vec![format!("qfm: {:#}", err)],
    }
}

/// Print `err` to stderr in a user-friendly format.
pub fn display_user_error(err: &anyhow::Error) {
    for line in user_error_lines(err) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::path::PathBuf;

    #[test]
    fn test_fm_error_is_shown_plainly() {
        let err = anyhow::Error::new(FmError::InvalidCommand("zap".to_string()));
        assert_eq!(user_error_lines(&err), vec!["qfm: Invalid command: 'zap'"]);
    }

    #[test]
    fn test_ambiguous_jump_lists_candidates() {
        let err = anyhow::Error::new(FmError::AmbiguousJump {
            name: "logs".to_string(),
            candidates: vec![PathBuf::from("/a/logs"), PathBuf::from("/b/logs")],
        });
        let lines = user_error_lines(&err);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "  /a/logs");
    }

    #[test]
    fn test_context_chain_is_included() {
        let err = std::fs::read_to_string("/nonexistent/qfm/config.toml")
            .context("failed to read config")
            .unwrap_err();
        let lines = user_error_lines(&err);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("qfm: failed to read config: "));
    }
}

use crate::dispatch::parse::{ARGUMENT_SEPARATOR, COMMAND_SEPARATOR};
use crate::environment::{self, variables::SIGIL};
use crate::suggestion::RankOrder;
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.toml";
pub const HISTORY_FILE: &str = "history";
pub const MAX_DISPLAY_LIMIT: usize = 10;

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        const DEFAULT_OPENER: &str = "open";
    } else {
        const DEFAULT_OPENER: &str = "xdg-open";
    }
}

/// User configuration, read from `$XDG_CONFIG_HOME/quickfm/config.toml`.
/// Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix that switches path entry into directory jump, e.g. `->logs`.
    pub jump_prefix: String,
    /// Suggestions shown on the status line (1..=10).
    pub display_limit: usize,
    /// Program used to open files selected with Enter.
    pub opener: String,
    /// Sort the directory listing before ranking.
    pub sort_paths: bool,
    /// Sort the command table before ranking.
    pub sort_commands: bool,
    /// History file; `~` is expanded.
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            jump_prefix: "->".to_string(),
            display_limit: MAX_DISPLAY_LIMIT,
            opener: DEFAULT_OPENER.to_string(),
            sort_paths: true,
            sort_commands: true,
            history_file: None,
        }
    }
}

impl Config {
    /// Load `path` if given, otherwise the XDG config file if present,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => environment::find_config_file(CONFIG_FILE)?,
        };
        match path {
            Some(path) => {
                debug!("loading config {:?}", path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Config::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Config> {
        let prefix = self.jump_prefix.trim().to_string();
        if prefix.is_empty() {
            bail!("jump_prefix must not be empty");
        }
        if prefix.contains(SIGIL)
            || prefix.contains(COMMAND_SEPARATOR)
            || COMMAND_SEPARATOR.starts_with(prefix.as_str())
            || prefix == ARGUMENT_SEPARATOR
        {
            bail!("jump_prefix {prefix:?} collides with the command grammar");
        }
        self.jump_prefix = prefix;
        self.display_limit = self.display_limit.clamp(1, MAX_DISPLAY_LIMIT);
        if self.opener.trim().is_empty() {
            self.opener = DEFAULT_OPENER.to_string();
        }
        Ok(self)
    }

    pub fn path_order(&self) -> RankOrder {
        if self.sort_paths {
            RankOrder::Alphabetical
        } else {
            RankOrder::Natural
        }
    }

    pub fn command_order(&self) -> RankOrder {
        if self.sort_commands {
            RankOrder::Alphabetical
        } else {
            RankOrder::Natural
        }
    }

    /// Where the history log lives.
    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history_file {
            Some(path) => {
                let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
                Ok(PathBuf::from(expanded))
            }
            None => environment::get_data_file(HISTORY_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.jump_prefix, "->");
        assert_eq!(config.display_limit, 10);
        assert_eq!(config.path_order(), RankOrder::Alphabetical);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let config = Config::from_toml("jump_prefix = \">>>\"\nsort_paths = false\n")?;
        assert_eq!(config.jump_prefix, ">>>");
        assert_eq!(config.path_order(), RankOrder::Natural);
        assert_eq!(config.command_order(), RankOrder::Alphabetical);
        Ok(())
    }

    #[test]
    fn test_display_limit_is_clamped() -> Result<()> {
        assert_eq!(Config::from_toml("display_limit = 50")?.display_limit, 10);
        assert_eq!(Config::from_toml("display_limit = 0")?.display_limit, 1);
        Ok(())
    }

    #[test]
    fn test_bad_prefix_is_rejected() {
        assert!(Config::from_toml("jump_prefix = \"\"").is_err());
        assert!(Config::from_toml("jump_prefix = \"$\"").is_err());
        assert!(Config::from_toml("jump_prefix = \"::\"").is_err());
        assert!(Config::from_toml("jump_prefix = \">>\"").is_err());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn test_history_path_expands_tilde() -> Result<()> {
        let config = Config::from_toml("history_file = \"~/qfm_history\"")?;
        let path = config.history_path()?;
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("qfm_history"));
        Ok(())
    }
}

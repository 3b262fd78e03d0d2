//! Tokenizer for committed lines.
//!
//! `<target>::<command>` or `<target>::<command>>><argument>`. The split
//! happens on the raw line, before variable substitution, so a variable whose
//! value contains `::` or `>>` cannot change how the line is read.

pub const COMMAND_SEPARATOR: &str = "::";
pub const ARGUMENT_SEPARATOR: &str = ">>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub target: String,
    pub command: String,
    /// Everything after the first `>>`, trimmed. Further `>>` stay inside.
    pub argument: Option<String>,
}

impl CommandLine {
    /// Split `line`, or `None` when it carries no command separator.
    pub fn parse(line: &str) -> Option<CommandLine> {
        let (target, rest) = line.split_once(COMMAND_SEPARATOR)?;
        Some(CommandLine::from_parts(target, rest))
    }

    /// Build from a target and the text typed after `::`, which may still
    /// carry `>>argument`.
    pub fn from_parts(target: &str, rest: &str) -> CommandLine {
        let (command, argument) = match rest.split_once(ARGUMENT_SEPARATOR) {
            Some((command, argument)) => (command, Some(argument.trim().to_string())),
            None => (rest, None),
        };
        CommandLine {
            target: target.trim().to_string(),
            command: command.trim().to_string(),
            argument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_not_a_command() {
        assert_eq!(CommandLine::parse("docs"), None);
        assert_eq!(CommandLine::parse("a:b"), None);
    }

    #[test]
    fn test_target_and_command() {
        let line = CommandLine::parse(" notes.txt :: info ").unwrap();
        assert_eq!(line.target, "notes.txt");
        assert_eq!(line.command, "info");
        assert_eq!(line.argument, None);
    }

    #[test]
    fn test_argument() {
        let line = CommandLine::parse("a.txt::moveto >> $dest").unwrap();
        assert_eq!(line.command, "moveto");
        assert_eq!(line.argument.as_deref(), Some("$dest"));
    }

    #[test]
    fn test_session_command_has_empty_target() {
        let line = CommandLine::parse("::quit").unwrap();
        assert_eq!(line.target, "");
        assert_eq!(line.command, "quit");
    }

    #[test]
    fn test_extra_segments_stay_in_argument() {
        let line = CommandLine::parse("::variable>>dest>>/tmp").unwrap();
        assert_eq!(line.argument.as_deref(), Some("dest>>/tmp"));
        let line = CommandLine::parse("::runcmd>>echo hi >> log.txt").unwrap();
        assert_eq!(line.argument.as_deref(), Some("echo hi >> log.txt"));
    }

    #[test]
    fn test_from_parts_keeps_separators_in_target() {
        let line = CommandLine::from_parts("release::v1", "info");
        assert_eq!(line.target, "release::v1");
        assert_eq!(line.command, "info");
        let line = CommandLine::from_parts("a.txt", "o>>docs");
        assert_eq!(line.command, "o");
        assert_eq!(line.argument.as_deref(), Some("docs"));
    }

    #[test]
    fn test_empty_argument_is_present_but_blank() {
        let line = CommandLine::parse("a::rename>>").unwrap();
        assert_eq!(line.argument.as_deref(), Some(""));
    }
}

//! Edit modes and their buffers.
//!
//! Exactly one [`Mode`] is active. Typed text only reaches the buffer the
//! current mode owns, and mode changes happen through the transitions below
//! rather than by sniffing the committed text.
//!
//! | from          | trigger                           | to              |
//! |---------------|-----------------------------------|-----------------|
//! | PathEntry     | `::` typed                        | CommandEntry    |
//! | PathEntry     | query becomes the jump prefix     | Jump            |
//! | any           | `$`                               | VariableCapture |
//! | capture       | no variable matches, space, Enter | prior mode      |
//! | CommandEntry  | Backspace on empty command text   | PathEntry       |
//! | Jump          | Backspace on empty target         | PathEntry       |

use crate::dispatch::parse::COMMAND_SEPARATOR;
use crate::environment::variables::SIGIL;
use crate::input::Buffer;
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Navigation: the query names an entry of the working directory.
    PathEntry { query: Buffer },
    /// `target::command>>argument`. `command` holds everything after `::`.
    CommandEntry { target: Buffer, command: Buffer },
    /// The leaf name typed after the jump prefix.
    Jump { target: Buffer },
    /// A `$NAME` token being typed on top of another mode.
    VariableCapture { prior: Box<Mode>, token: Buffer },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::PathEntry {
            query: Buffer::new(),
        }
    }
}

impl Mode {
    /// Rebuild the mode a committed line was typed in (history recall).
    pub fn from_line(line: &str, jump_prefix: &str) -> Mode {
        if let Some(rest) = line.strip_prefix(jump_prefix) {
            return Mode::Jump {
                target: Buffer::from(rest),
            };
        }
        match line.split_once(COMMAND_SEPARATOR) {
            Some((target, command)) => Mode::CommandEntry {
                target: Buffer::from(target),
                command: Buffer::from(command),
            },
            None => Mode::PathEntry {
                query: Buffer::from(line),
            },
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Mode::VariableCapture { .. })
    }

    /// The partial `$NAME` token, while capturing.
    pub fn token(&self) -> Option<&str> {
        match self {
            Mode::VariableCapture { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }

    /// Append a typed character to the buffer this mode owns, then apply
    /// any transition the new text triggers.
    pub fn push_char(&mut self, ch: char, jump_prefix: &str) {
        match self {
            Mode::PathEntry { query } => {
                if query.push(ch) {
                    self.transition(jump_prefix);
                }
            }
            Mode::CommandEntry { command, .. } => {
                command.push(ch);
            }
            Mode::Jump { target } => {
                target.push(ch);
            }
            Mode::VariableCapture { token, .. } => {
                token.push(ch);
            }
        }
    }

    /// Start a variable token. A `$` typed during a capture ends the current
    /// token literally and starts a new one.
    pub fn push_sigil(&mut self) {
        self.finish_capture();
        let prior = mem::take(self);
        let mut token = Buffer::new();
        token.push(SIGIL);
        *self = Mode::VariableCapture {
            prior: Box::new(prior),
            token,
        };
    }

    /// Leave variable capture, appending the token as typed to the resumed
    /// mode's buffer. No transition is applied to the appended text.
    pub fn finish_capture(&mut self) {
        if !self.is_capturing() {
            return;
        }
        if let Mode::VariableCapture { prior, token } = mem::take(self) {
            *self = *prior;
            self.append_literal(token.as_str());
        }
    }

    fn append_literal(&mut self, text: &str) {
        match self {
            Mode::PathEntry { query } => query.push_str(text),
            Mode::CommandEntry { command, .. } => command.push_str(text),
            Mode::Jump { target } => target.push_str(text),
            Mode::VariableCapture { token, .. } => token.push_str(text),
        }
    }

    /// Remove one character from the most specific non-empty buffer.
    pub fn backspace(&mut self, jump_prefix: &str) {
        match self {
            Mode::VariableCapture { token, .. } => {
                token.pop();
                if token.is_empty()
                    && let Mode::VariableCapture { prior, .. } = mem::take(self)
                {
                    *self = *prior;
                }
            }
            Mode::CommandEntry { target, command } => {
                if command.pop().is_none() {
                    // Undo the second ':' of the separator.
                    let mut query = mem::take(target);
                    query.push_str(&COMMAND_SEPARATOR[..COMMAND_SEPARATOR.len() - 1]);
                    *self = Mode::PathEntry { query };
                }
            }
            Mode::Jump { target } => {
                if target.pop().is_none() {
                    let mut prefix = jump_prefix.to_string();
                    prefix.pop();
                    *self = Mode::PathEntry {
                        query: Buffer::from(prefix.as_str()),
                    };
                }
            }
            Mode::PathEntry { query } => {
                query.pop();
            }
        }
    }

    /// Replace the active buffer wholesale (Tab autofill).
    pub fn replace_active(&mut self, text: &str) {
        match self {
            Mode::PathEntry { query } => query.reset(text),
            Mode::CommandEntry { command, .. } => command.reset(text),
            Mode::Jump { target } => target.reset(text),
            Mode::VariableCapture { token, .. } => token.reset(text),
        }
    }

    /// The line as it would be committed, without variable substitution.
    pub fn line(&self, jump_prefix: &str) -> String {
        match self {
            Mode::PathEntry { query } => query.to_string(),
            Mode::CommandEntry { target, command } => {
                format!("{target}{COMMAND_SEPARATOR}{command}")
            }
            Mode::Jump { target } => format!("{jump_prefix}{target}"),
            Mode::VariableCapture { prior, token } => {
                format!("{}{}", prior.line(jump_prefix), token)
            }
        }
    }

    /// Only the character just typed can complete a trigger, so text that
    /// arrived literally (a finished variable token) never switches modes.
    fn transition(&mut self, jump_prefix: &str) {
        let Mode::PathEntry { query } = self else {
            return;
        };
        let text = query.as_str();
        let next = if text == jump_prefix {
            Mode::Jump {
                target: Buffer::new(),
            }
        } else if let Some(target) = text.strip_suffix(COMMAND_SEPARATOR) {
            Mode::CommandEntry {
                target: Buffer::from(target),
                command: Buffer::new(),
            }
        } else {
            return;
        };
        *self = next;
    }
}

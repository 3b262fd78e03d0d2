use std::fmt;

const INITIAL_CAP: usize = 64;

/// An append-only edit buffer.
///
/// Editing happens at the end only: characters are appended, Backspace pops
/// the last one, and Tab replaces the whole content. Control characters are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    input: String,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer {
            input: String::with_capacity(INITIAL_CAP),
        }
    }

    /// Append `ch`. Returns false (and stores nothing) for control characters.
    pub fn push(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.input.push(ch);
        true
    }

    pub fn push_str(&mut self, s: &str) {
        self.input.extend(s.chars().filter(|c| !c.is_control()));
    }

    /// Remove and return the last character.
    pub fn pop(&mut self) -> Option<char> {
        self.input.pop()
    }

    /// Replace the whole content (Tab autofill, history recall).
    pub fn reset(&mut self, s: &str) {
        self.input.clear();
        self.push_str(s);
    }

    pub fn as_str(&self) -> &str {
        self.input.as_str()
    }

    /// Number of characters, not bytes.
    pub fn len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

impl From<&str> for Buffer {
    fn from(s: &str) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.push_str(s);
        buffer
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.input.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation_and_display() {
        let buffer = Buffer::new();
        assert_eq!(buffer.as_str(), "");
        assert!(buffer.is_empty());
        assert_eq!(format!("{}", buffer), "");
    }

    #[test]
    fn test_buffer_operations() {
        let mut buffer = Buffer::new();
        buffer.push('h');
        buffer.push('é');
        assert_eq!(buffer.as_str(), "hé");
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.pop(), Some('é'));
        assert_eq!(buffer.pop(), Some('h'));
        assert_eq!(buffer.pop(), None);

        buffer.reset("notes.txt");
        assert_eq!(buffer.as_str(), "notes.txt");
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let mut buffer = Buffer::new();
        assert!(!buffer.push('\t'));
        assert!(!buffer.push('\x1b'));
        buffer.push_str("a\r\nb");
        assert_eq!(buffer.as_str(), "ab");
    }
}

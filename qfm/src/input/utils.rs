use unicode_width::UnicodeWidthChar;

/// Calculate the display width of a string, ignoring CSI escape sequences.
pub fn display_width(input: &str) -> usize {
    let mut width = 0;
    let mut in_ansi_sequence = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if in_ansi_sequence {
            if ch.is_ascii_alphabetic() {
                in_ansi_sequence = false;
            }
            continue;
        }

        if ch == '\x1b' {
            if let Some('[') = chars.next() {
                in_ansi_sequence = true;
            }
        } else {
            width += ch.width().unwrap_or(0);
        }
    }
    width
}

/// Cut `input` so that it occupies at most `max` columns.
pub fn truncate_to_width(input: &str, max: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in input.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > max {
            return &input[..idx];
        }
        width += w;
    }
    input
}

#[cfg(test)]
mod display_width_tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("あ"), 2, "CJK character should be width 2");
        assert_eq!(display_width("\x1b[31mred\x1b[0m"), 3);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
        assert_eq!(truncate_to_width("ab", 5), "ab");
        assert_eq!(truncate_to_width("ああ", 3), "あ");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}

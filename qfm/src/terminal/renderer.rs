use crate::input::{display_width, truncate_to_width};
use crate::repl::RenderRequest;
use std::io::{self, Write};

const DEFAULT_BUFFER_CAPACITY: usize = 4096;
const ELLIPSIS: &str = "...";

/// Format the status line: `location/input [s1 | s2 | ...]`, showing at most
/// `limit` suggestions and cut to `width` columns.
pub fn render_status(request: &RenderRequest, limit: usize, width: usize) -> String {
    let mut line = if request.location == "/" {
        format!("/{}", request.input)
    } else {
        format!("{}/{}", request.location, request.input)
    };
    if !request.suggestions.is_empty() {
        let shown: Vec<&str> = request
            .suggestions
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect();
        line.push_str(" [");
        line.push_str(&shown.join(" | "));
        line.push(']');
    }
    fit_to_width(&line, width)
}

fn fit_to_width(line: &str, width: usize) -> String {
    if display_width(line) <= width {
        return line.to_string();
    }
    if width <= ELLIPSIS.len() {
        return truncate_to_width(line, width).to_string();
    }
    let mut cut = truncate_to_width(line, width - ELLIPSIS.len()).to_string();
    cut.push_str(ELLIPSIS);
    cut
}

/// Buffered terminal writer that batches commands before flushing to stdout.
#[derive(Debug)]
pub struct TerminalRenderer {
    buffer: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        TerminalRenderer {
            buffer: Vec::with_capacity(DEFAULT_BUFFER_CAPACITY),
        }
    }

    /// Write everything queued so far to stdout and clear the buffer.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(&self.buffer)?;
        handle.flush()?;
        self.buffer.clear();
        Ok(())
    }

    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

impl Write for TerminalRenderer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        TerminalRenderer::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(location: &str, input: &str, suggestions: &[&str]) -> RenderRequest {
        RenderRequest {
            location: location.to_string(),
            input: input.to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_line_format() {
        let req = request("home/u", "no", &["notes.txt", "nohup.out"]);
        assert_eq!(
            render_status(&req, 10, 80),
            "home/u/no [notes.txt | nohup.out]"
        );
    }

    #[test]
    fn test_status_line_without_suggestions() {
        let req = request("home/u", "a.txt::info", &[]);
        assert_eq!(render_status(&req, 10, 80), "home/u/a.txt::info");
        let req = request("/", "", &[]);
        assert_eq!(render_status(&req, 10, 80), "/");
    }

    #[test]
    fn test_display_limit() {
        let req = request("u", "", &["a", "b", "c", "d"]);
        assert_eq!(render_status(&req, 2, 80), "u/ [a | b]");
    }

    #[test]
    fn test_truncated_to_width() {
        let req = request("home/u", "", &["alpha", "beta", "gamma"]);
        let line = render_status(&req, 10, 16);
        assert_eq!(line, "home/u/ [alph...");
        assert_eq!(display_width(&line), 16);
        assert_eq!(render_status(&req, 10, 2), "ho");
    }

    #[test]
    fn test_renderer_buffers_until_flush() {
        let mut renderer = TerminalRenderer::new();
        write!(renderer, "status").unwrap();
        assert_eq!(renderer.pending(), b"status");
    }
}

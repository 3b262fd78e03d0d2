use crate::terminal::TerminalIo;
use crate::terminal::renderer::render_status;
use anyhow::Result;
use qfm_types::{ExternalProcess, FileSystemGateway};
use tracing::debug;

mod engine;
pub mod key_action;
pub mod mode;

pub use engine::{InputEngine, RenderRequest};
pub use key_action::InputEvent;
pub use mode::Mode;

/// The interactive loop: read one event, handle it fully, draw, repeat.
pub struct Repl<F, P, T> {
    pub engine: InputEngine<F, P>,
    terminal: T,
}

impl<F, P, T> Repl<F, P, T>
where
    F: FileSystemGateway,
    P: ExternalProcess,
    T: TerminalIo,
{
    pub fn new(engine: InputEngine<F, P>, terminal: T) -> Self {
        Repl { engine, terminal }
    }

    pub fn run(&mut self) -> Result<()> {
        debug!("start repl in {:?}", self.engine.session().working_dir());
        let initial = self.engine.snapshot();
        self.draw(&initial)?;

        loop {
            let Some(event) = self.terminal.read_event()? else {
                // Redraw for resizes and other ignored events.
                let current = self.engine.snapshot();
                self.draw(&current)?;
                continue;
            };
            let request = self.engine.handle_event(event);
            if request.quit {
                self.terminal.write_output(&request.output)?;
                self.terminal.write_status("")?;
                break;
            }
            self.draw(&request)?;
        }
        debug!("repl finished");
        Ok(())
    }

    fn draw(&mut self, request: &RenderRequest) -> Result<()> {
        if request.clear_screen {
            self.terminal.clear_screen()?;
        }
        self.terminal.write_output(&request.output)?;
        if let Some(message) = &request.message {
            self.terminal.write_output(std::slice::from_ref(message))?;
        }
        let line = render_status(
            request,
            self.engine.config().display_limit,
            self.terminal.width(),
        );
        self.terminal.write_status(&line)
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }
}

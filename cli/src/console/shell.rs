//! # Shell Seam
//!
//! File: cli/src/console/shell.rs
//!
//! ## Overview
//!
//! The console does not edit lines itself. It drives whatever implements
//! `Shell`: each cycle it pushes the current context's input mode, multiline
//! setting and prompt renderers, asks for a prompt refresh and reads one
//! line. `StdioShell` is a plain, non-editing implementation over any
//! `BufRead`, used by the demo binary and the tests.
//!
use crate::console::prompt::PromptRenderers;
use crate::core::config::InputMode;
use crate::core::error::Result;
use parking_lot::Mutex;
use std::io::{self, BufRead, StdinLock, Write};
use std::sync::Arc;
use tracing::debug;

/// Prints an asynchronous message and redraws the prompt below it.
pub type Notifier = Arc<dyn Fn(&str) + Send + Sync>;

/// The line-editing shell, as seen by the console.
pub trait Shell {
    /// Reads one line. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    fn set_input_mode(&mut self, mode: InputMode);

    fn set_multiline(&mut self, multiline: bool);

    fn install_prompt(&mut self, renderers: PromptRenderers);

    /// Re-renders the prompt from the installed renderers.
    fn refresh_prompt(&mut self) -> Result<()>;

    /// Used for console logs issued while no command is executing.
    fn notifier(&self) -> Option<Notifier> {
        None
    }
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Line-at-a-time shell without editing.
pub struct StdioShell<R> {
    input: R,
    output: SharedWriter,
    renderers: Option<PromptRenderers>,
    rendered: Arc<Mutex<String>>,
    multiline: bool,
    input_mode: InputMode,
}

impl StdioShell<StdinLock<'static>> {
    /// Reads from stdin, writes prompts and logs to stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead> StdioShell<R> {
    pub fn new<W: Write + Send + 'static>(input: R, output: W) -> Self {
        Self {
            input,
            output: Arc::new(Mutex::new(Box::new(output))),
            renderers: None,
            rendered: Arc::new(Mutex::new(String::new())),
            multiline: false,
            input_mode: InputMode::default(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }
}

impl<R: BufRead> Shell for StdioShell<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        {
            let mut out = self.output.lock();
            write!(out, "{}", self.rendered.lock())?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        if mode != self.input_mode {
            debug!("Input mode set to {:?} (no effect on a plain stdio shell)", mode);
        }
        self.input_mode = mode;
    }

    fn set_multiline(&mut self, multiline: bool) {
        self.multiline = multiline;
    }

    fn install_prompt(&mut self, renderers: PromptRenderers) {
        self.renderers = Some(renderers);
    }

    fn refresh_prompt(&mut self) -> Result<()> {
        let Some(r) = &self.renderers else {
            return Ok(());
        };
        let mut text = (r.primary)();
        let right = (r.right)();
        if !right.is_empty() {
            text.push_str("  ");
            text.push_str(&right);
        }
        if self.multiline {
            text.push('\n');
        }
        text.push_str(&(r.secondary)());
        *self.rendered.lock() = text;
        Ok(())
    }

    fn notifier(&self) -> Option<Notifier> {
        let output = Arc::clone(&self.output);
        let rendered = Arc::clone(&self.rendered);
        Some(Arc::new(move |msg: &str| {
            let mut out = output.lock();
            let written = write!(out, "\r{}{}", msg, rendered.lock()).and_then(|()| out.flush());
            if let Err(e) = written {
                debug!("Failed to write notification: {}", e);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::prompt::Prompt;
    use crate::core::config::PromptConfig;
    use std::io::Cursor;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    fn prompt(left: &str, multiline: bool) -> PromptRenderers {
        Prompt::new(PromptConfig {
            left: left.into(),
            multiline,
            ..Default::default()
        })
        .renderers()
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_notifier_survives_closed_output() {
        let shell = StdioShell::new(Cursor::new(""), Closed);
        let notify = shell.notifier().expect("stdio shell has a notifier");
        notify("lost message\n");
        notify("another\n");
    }

    #[test]
    fn test_reads_lines_until_eof() {
        let out = Buffer::default();
        let mut shell = StdioShell::new(Cursor::new("status\r\nexit\n"), out.clone());
        assert_eq!(shell.read_line().unwrap().as_deref(), Some("status"));
        assert_eq!(shell.read_line().unwrap().as_deref(), Some("exit"));
        assert_eq!(shell.read_line().unwrap(), None);
    }

    #[test]
    fn test_prompt_rendering() {
        let out = Buffer::default();
        let mut shell = StdioShell::new(Cursor::new("x\ny\n"), out.clone());

        shell.install_prompt(prompt("conch", false));
        shell.refresh_prompt().unwrap();
        shell.read_line().unwrap();
        assert_eq!(out.text(), "conch > ");

        shell.set_multiline(true);
        shell.install_prompt(prompt("ops", true));
        shell.refresh_prompt().unwrap();
        shell.read_line().unwrap();
        assert_eq!(out.text(), "conch > ops\n > ");
    }

    #[test]
    fn test_notifier_redraws_prompt() {
        let out = Buffer::default();
        let mut shell = StdioShell::new(Cursor::new(""), out.clone());
        shell.install_prompt(prompt("conch", false));
        shell.refresh_prompt().unwrap();

        let notify = shell.notifier().unwrap();
        notify("job done\n");
        assert_eq!(out.text(), "\rjob done\nconch > ");
    }
}

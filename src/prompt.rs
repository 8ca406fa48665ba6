//! Asking the operator for values the context file leaves empty.

use std::io::{self, BufRead, Write};

/// Supplies a replacement value for an empty context key.
pub trait Prompter {
    fn ask(&mut self, key: &str) -> io::Result<String>;
}

/// Line-oriented prompt: writes `<key> = ` and reads one line back.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the controlling terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, key: &str) -> io::Result<String> {
        write!(self.output, "{key} = ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a value was entered",
            ));
        }

        // Drop the terminator only; surrounding spaces are part of the value.
        let trimmed = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(&line);
        Ok(trimmed.to_owned())
    }
}

/// Non-interactive mode: every request for a value is an error.
pub struct NoInput;

impl Prompter for NoInput {
    fn ask(&mut self, key: &str) -> io::Result<String> {
        Err(io::Error::other(format!(
            "no value for '{key}' and prompting is disabled"
        )))
    }
}

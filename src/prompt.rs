//! Interactive integer prompts.

use std::io::{BufRead, Write};

use crate::error::CommandError;

/// Reads integers from an interactive user.
///
/// Implementations report a line that does not parse as
/// [`CommandError::MalformedInput`] and an exhausted input stream as
/// [`CommandError::InputClosed`]; the caller decides whether to re-prompt.
pub trait Prompter {
    fn read_integer(&mut self, label: &str) -> Result<i64, CommandError>;
}

/// [`Prompter`] that writes `label: ` and reads one line from `input`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn read_integer(&mut self, label: &str) -> Result<i64, CommandError> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CommandError::InputClosed);
        }
        parse_integer(&line)
    }
}

/// Parse a single user-entered integer, ignoring surrounding whitespace.
pub fn parse_integer(raw: &str) -> Result<i64, CommandError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| CommandError::MalformedInput(trimmed.to_string()))
}

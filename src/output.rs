//! Output sink for rows and user-facing messages.
use std::io::{self, Write};

use log::warn;

/// Receives everything the session wants the user to see.
pub trait Output {
    /// A flushed batch of formatted rows.
    fn rows(&mut self, rows: &[String]);
    fn info(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// [`Output`] writing rows and info to one stream and errors to another.
pub struct Console<W: Write, E: Write> {
    out: W,
    err: E,
}

impl Console<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> Console<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }

    fn write_lines<T: Write>(stream: &mut T, lines: &[&str]) {
        let res = lines
            .iter()
            .try_for_each(|line| writeln!(stream, "{line}"))
            .and_then(|_| stream.flush());
        if let Err(e) = res {
            warn!("failed to write output: {e}");
        }
    }
}

impl<W: Write, E: Write> Output for Console<W, E> {
    fn rows(&mut self, rows: &[String]) {
        let lines = rows.iter().map(String::as_str).collect::<Vec<_>>();
        Self::write_lines(&mut self.out, &lines);
    }

    fn info(&mut self, message: &str) {
        Self::write_lines(&mut self.out, &[message]);
    }

    fn error(&mut self, message: &str) {
        Self::write_lines(&mut self.err, &[message]);
    }
}

/// Keeps every flush and message, for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingOutput {
    pub flushes: Vec<Vec<String>>,
    pub info: Vec<String>,
    pub errors: Vec<String>,
}

#[cfg(test)]
impl Output for RecordingOutput {
    fn rows(&mut self, rows: &[String]) {
        self.flushes.push(rows.to_vec());
    }

    fn info(&mut self, message: &str) {
        self.info.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

//! CLI utilities for the shell.
//!
//! The utilities present in this module can be used to drive a [`Shell`](crate::shell::Shell)
//! from any line-oriented reader.
use std::io::{self, BufRead, Write};

pub const WELCOME: &str = "Welcome to the query shell. Type 'quit' to leave.";

/// Prompt the user for one line of input.
///
/// Returns `None` once the reader is exhausted.
pub fn prompt<R, W>(mut reader: R, mut writer: W, prompt: &str) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "{prompt}")?;
    writer.flush()?;

    if reader.read_line(&mut s)? == 0 {
        return Ok(None);
    }

    Ok(Some(s.trim_end_matches(['\r', '\n']).to_string()))
}

pub mod auth;
pub mod generate;
pub mod posts;
pub mod profile;

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Reads one line from stdin, showing `prompt` on stderr.
pub fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

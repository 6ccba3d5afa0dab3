//! The `[Y/n]` confirmation before the initial push.

use std::io::{self, BufRead};

/// Source of the answer to a confirmation question. The question itself is
/// shown through the [`Reporter`](crate::Reporter).
pub trait Confirm {
    fn answer(&mut self) -> io::Result<String>;
}

/// `y`, `Y` and an empty line mean yes; anything else means no. Only the
/// line terminator is stripped.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim_end_matches(['\r', '\n']), "" | "y" | "Y")
}

/// Reads one line from standard input.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Always answers yes without touching stdin (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn answer(&mut self) -> io::Result<String> {
        Ok("y".to_string())
    }
}

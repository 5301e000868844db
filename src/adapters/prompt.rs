//! Terminal operator prompt.

use std::io::{self, BufRead, Write};

use crate::app::ports::OperatorPrompt;

/// Asks on stdout, reads one line from stdin.
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorPrompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        let mut out = io::stdout().lock();
        write!(out, "{question} ").ok()?;
        out.flush().ok()?;
        drop(out);

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// 交互确认
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Only `y` or `yes`, in any case, counts as agreement.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompt on stdout and read the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(is_affirmative(&input))
    }
}

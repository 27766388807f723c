use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Yes/no confirmation from the user.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interactive confirmation on stdin. Only `y`/`Y` accepts; end of input declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{} (y/N): ", question);
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read confirmation from stdin")?;
        if read == 0 {
            return Ok(false);
        }
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_single_y_accepts() {
        assert!(is_yes("y\n"));
        assert!(is_yes("Y\r\n"));
        assert!(!is_yes("yes\n"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
    }
}

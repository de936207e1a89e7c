//! Yes/no confirmation before anything on the system is changed.

use std::io::{BufRead, Write};

use crate::CheckerResult;

/// Asks the operator a yes/no question.
pub trait Confirmation {
    /// Returns true only for an explicit "yes".
    fn confirm(&mut self, question: &str) -> CheckerResult<bool>;
}

/// Case-insensitive match against "yes", ignoring surrounding whitespace.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Prompts on a writer and reads one line from a reader. In the binary
/// these are stdout and locked stdin.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmation for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> CheckerResult<bool> {
        write!(self.output, "{} (yes/no): ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        // EOF leaves the answer empty, which reads as "no".
        self.input.read_line(&mut answer)?;
        log::debug!("Confirmation answer: {:?}", answer.trim());
        Ok(is_yes(&answer))
    }
}

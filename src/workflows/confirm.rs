use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Blocks until the user accepts or rejects a batch.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reads one line from the terminal. An empty answer, `Y` or `y` accepts;
/// anything else, including end of input, rejects. There is no retry.
pub struct PromptConfirm {
    editor: DefaultEditor,
}

impl PromptConfirm {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Confirm for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.editor.readline(&format!("{prompt} [Y/n] ")) {
            Ok(line) => Ok(is_acceptance(&line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Gives the same answer to every prompt without reading input.
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        tracing::debug!("{prompt} -> {}", self.0);
        Ok(self.0)
    }
}

fn is_acceptance(line: &str) -> bool {
    matches!(line, "" | "Y" | "y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_acceptance() {
        assert!(is_acceptance(""));
        assert!(is_acceptance("Y"));
        assert!(is_acceptance("y"));
        assert!(!is_acceptance("yes"));
        assert!(!is_acceptance("n"));
        assert!(!is_acceptance(" y"));
    }

    #[test]
    fn test_fixed_answer() {
        assert!(FixedAnswer(true).confirm("Go?").unwrap());
        assert!(!FixedAnswer(false).confirm("Go?").unwrap());
    }
}

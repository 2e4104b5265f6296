//! User confirmation prompts.

use crate::error::{Error, Result};
use dialoguer::Confirm;

/// Asks the user yes/no questions.
pub trait Prompter {
    /// Returns `true` without asking when `skip` is set.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }
}

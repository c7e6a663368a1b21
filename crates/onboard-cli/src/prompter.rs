//! Terminal prompts for the onboarding pipeline.
//!
//! Uses dialoguer for the questions themselves; warnings go to the writer.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use onboard_core::prompt::Prompter;

/// [`Prompter`] backed by an interactive terminal.
pub struct DialoguerPrompter<W: Write = io::Stderr> {
    /// Output for warnings (for testing)
    writer: W,
    /// Theme for dialoguer prompts
    theme: ColorfulTheme,
}

impl DialoguerPrompter<io::Stderr> {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for DialoguerPrompter<io::Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DialoguerPrompter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> Prompter for DialoguerPrompter<W> {
    fn input(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn secret(&mut self, question: &str) -> Result<String> {
        let secret = Password::with_theme(&self.theme)
            .with_prompt(question)
            .interact()?;
        Ok(secret)
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    fn select(&mut self, question: &str, items: &[&str], default: usize) -> Result<usize> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(items)
            .default(default)
            .interact()?;
        Ok(selection)
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{} {}", style("!").yellow().bold(), message)?;
        Ok(())
    }
}

//! Operator interaction seam.
//!
//! The pipeline asks questions through [`Prompter`]; the CLI backs it with
//! dialoguer, tests back it with [`ScriptedPrompter`].

use std::collections::VecDeque;

/// Sequential question/answer console protocol.
pub trait Prompter {
    /// Ask for free text. An empty answer yields `default` when one is given.
    fn input(&mut self, question: &str, default: Option<&str>) -> anyhow::Result<String>;

    /// Ask for a value that must not be echoed.
    fn secret(&mut self, question: &str) -> anyhow::Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> anyhow::Result<bool>;

    /// Pick one of `items`, returning its index.
    fn select(&mut self, question: &str, items: &[&str], default: usize) -> anyhow::Result<usize>;

    /// Tell the operator something went wrong with their last answer.
    fn warn(&mut self, message: &str) -> anyhow::Result<()>;
}

/// A canned answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(usize),
    /// Accept whatever default the question offers.
    Default,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }
}

/// Replays a fixed list of answers and records every question and warning.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    questions: Vec<String>,
    warnings: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            questions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> anyhow::Result<Answer> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No scripted answer left for: {}", question))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, question: &str, default: Option<&str>) -> anyhow::Result<String> {
        match self.next(question)? {
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(default.unwrap_or_default().to_string()),
            other => anyhow::bail!("Expected text answer for '{}', got {:?}", question, other),
        }
    }

    fn secret(&mut self, question: &str) -> anyhow::Result<String> {
        match self.next(question)? {
            Answer::Text(text) => Ok(text),
            other => anyhow::bail!("Expected text answer for '{}', got {:?}", question, other),
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> anyhow::Result<bool> {
        match self.next(question)? {
            Answer::Confirm(value) => Ok(value),
            Answer::Default => Ok(default),
            other => anyhow::bail!("Expected yes/no answer for '{}', got {:?}", question, other),
        }
    }

    fn select(&mut self, question: &str, items: &[&str], default: usize) -> anyhow::Result<usize> {
        let index = match self.next(question)? {
            Answer::Select(index) => index,
            Answer::Default => default,
            other => anyhow::bail!("Expected selection for '{}', got {:?}", question, other),
        };
        if index >= items.len() {
            anyhow::bail!(
                "Selection {} out of range for '{}' ({} items)",
                index,
                question,
                items.len()
            );
        }
        Ok(index)
    }

    fn warn(&mut self, message: &str) -> anyhow::Result<()> {
        self.warnings.push(message.to_string());
        Ok(())
    }
}

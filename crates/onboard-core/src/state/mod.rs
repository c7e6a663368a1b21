//! Deployment state: the append-only field map threaded through every stage
//! and persisted at checkpoints.

mod checkpoint;
pub mod field;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use checkpoint::{Checkpoint, CheckpointStore, ExternalEvent};

use crate::error::OnboardError;
use crate::stage::Stage;

/// Replacement shown instead of secret values.
pub const REDACTED: &str = "<redacted>";

/// A single state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Number(u64),
    Text(String),
}

impl StateValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            StateValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Number(n) => write!(f, "{}", n),
            StateValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for StateValue {
    fn from(value: u64) -> Self {
        StateValue::Number(value)
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

/// Named fields collected over a run plus the position of the state machine.
///
/// Fields are append-only: setting a field to the value it already holds is a
/// no-op, setting it to anything else fails with `StateConflict`. Only the
/// checkpoint marker moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checkpoint: Option<Checkpoint>,
    #[serde(flatten)]
    fields: BTreeMap<String, StateValue>,
}

impl DeploymentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    pub(crate) fn set_checkpoint(&mut self, checkpoint: Checkpoint) {
        self.checkpoint = Some(checkpoint);
    }

    /// Record `value` under `name`.
    pub fn set(&mut self, name: &str, value: impl Into<StateValue>) -> anyhow::Result<()> {
        if name == field::CHECKPOINT {
            anyhow::bail!("'{}' is reserved for the checkpoint marker", name);
        }
        let value = value.into();
        match self.fields.get(name) {
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => {
                let shown = |v: &StateValue| {
                    if field::is_secret(name) {
                        REDACTED.to_string()
                    } else {
                        v.to_string()
                    }
                };
                Err(OnboardError::StateConflict {
                    field: name.to_string(),
                    existing: shown(existing),
                    attempted: shown(&value),
                }
                .into())
            }
            None => {
                self.fields.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Text field, or `NotFound` naming it.
    pub fn text(&self, name: &str) -> anyhow::Result<&str> {
        match self.fields.get(name) {
            Some(StateValue::Text(s)) => Ok(s),
            Some(StateValue::Number(_)) => {
                anyhow::bail!("State field '{}' holds a number, expected text", name)
            }
            None => Err(missing(name)),
        }
    }

    /// Numeric field, or `NotFound` naming it.
    pub fn number(&self, name: &str) -> anyhow::Result<u64> {
        match self.fields.get(name) {
            Some(StateValue::Number(n)) => Ok(*n),
            Some(StateValue::Text(_)) => {
                anyhow::bail!("State field '{}' holds text, expected a number", name)
            }
            None => Err(missing(name)),
        }
    }

    pub fn optional_text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(StateValue::as_text)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that every field produced by the stages before `stage` is present.
    pub fn require_through(&self, stage: Stage) -> anyhow::Result<()> {
        for earlier in stage.predecessors() {
            for name in earlier.produces() {
                if !self.contains(name) {
                    return Err(missing(name).context(format!(
                        "Checkpoint at {} is incomplete: {} did not record '{}'",
                        stage, earlier, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy with secret fields replaced, for printing.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for (name, value) in copy.fields.iter_mut() {
            if field::is_secret(name) {
                *value = StateValue::Text(REDACTED.to_string());
            }
        }
        copy
    }

    /// Pretty JSON as written to the checkpoint file.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn missing(name: &str) -> anyhow::Error {
    OnboardError::NotFound(format!("state field '{}'", name)).into()
}

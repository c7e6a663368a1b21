//! Checkpoint marker and the on-disk checkpoint file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeploymentState;
use crate::error::OnboardError;
use crate::registry::write_json_atomic;
use crate::stage::Stage;

/// What a paused run is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalEvent {
    /// Verifier operators must register support for the new chain.
    VerifierOnboarding,
    /// Submitted governance proposals must pass.
    GovernanceApproval,
    Nothing,
}

impl ExternalEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            ExternalEvent::VerifierOnboarding => "verifier onboarding",
            ExternalEvent::GovernanceApproval => "governance approval",
            ExternalEvent::Nothing => "nothing",
        }
    }
}

/// Position of the state machine when the state was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Stage to run when the workflow resumes
    pub stage: Stage,
    pub awaiting: ExternalEvent,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(stage: Stage, awaiting: ExternalEvent) -> Self {
        Self {
            stage,
            awaiting,
            saved_at: Utc::now(),
        }
    }
}

/// Reads and writes the checkpoint file.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the saved state. A missing file is `NotFound`.
    pub fn load(&self) -> anyhow::Result<DeploymentState> {
        if !self.path.exists() {
            return Err(OnboardError::NotFound(format!(
                "checkpoint file {} (nothing to resume; run `onboard start` first)",
                self.path.display()
            ))
            .into());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read checkpoint: {}", self.path.display()))?;
        let state: DeploymentState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse checkpoint: {}", self.path.display()))?;
        Ok(state)
    }

    /// Write the full state atomically.
    pub fn save(&self, state: &DeploymentState) -> anyhow::Result<()> {
        write_json_atomic(&self.path, state)
            .with_context(|| format!("Failed to save checkpoint: {}", self.path.display()))?;
        tracing::info!(
            path = %self.path.display(),
            stage = ?state.checkpoint().map(|c| c.stage),
            "checkpoint saved"
        );
        Ok(())
    }
}

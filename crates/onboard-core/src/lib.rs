//! Onboard Core Library
//!
//! Provides the resumable workflow that connects a new EVM chain to an
//! Amplifier network: input validation, per-environment network profiles,
//! external tool invocation, artifact acquisition, registry document updates,
//! governance dispatch and the checkpointed stage pipeline.

pub mod artifact;
pub mod config;
pub mod context;
pub mod error;
pub mod governance;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod registry;
pub mod stage;
pub mod state;
pub mod tool;
pub mod validate;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{LoadedConfig, OnboardConfig, ToolsConfig, load_config};
    pub use crate::context::OnboardContext;

    // Errors
    pub use crate::error::OnboardError;

    // Pipeline
    pub use crate::pipeline::{RunOutcome, StagePipeline};
    pub use crate::stage::Stage;
    pub use crate::state::{Checkpoint, CheckpointStore, DeploymentState, ExternalEvent};

    // Profiles
    pub use crate::profile::{
        DeploymentMethod, Environment, EnvironmentClass, NetworkProfile, NetworkProfileResolver,
        Threshold,
    };

    // Collaborators
    pub use crate::artifact::{ArtifactAcquirer, ArtifactFetcher, ContractArtifact, HttpFetcher};
    pub use crate::governance::{DispatchOutcome, ExecutionStrategy, GovernanceAction};
    pub use crate::prompt::{Answer, Prompter, ScriptedPrompter};
    pub use crate::registry::{ChainTable, ConfigDocument};
    pub use crate::tool::{CommandRunner, ExternalCommandResult, SystemRunner, ToolCommand};
    pub use crate::validate::{InputKind, validate};
}

//! Resumable onboarding workflow.
//!
//! A run walks the [`Stage`]s in order, threading one [`DeploymentState`]
//! through every stage. The state is written to the checkpoint file only when
//! the workflow has to wait for something outside the process, and once more
//! when it finishes. A failure anywhere else aborts without touching the
//! checkpoint.

mod payload;
mod stages;

use std::io::{self, Write};

use crate::artifact::ArtifactFetcher;
use crate::context::OnboardContext;
use crate::error::OnboardError;
use crate::prompt::Prompter;
use crate::stage::Stage;
use crate::state::{Checkpoint, CheckpointStore, DeploymentState, ExternalEvent, field};
use crate::tool::CommandRunner;

/// How a pipeline invocation ended. Every variant is a successful process exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A checkpoint was saved at an external wait.
    Paused {
        stage: Stage,
        awaiting: ExternalEvent,
    },
    /// Resumed, but the awaited event has not happened yet. Nothing was written.
    NotYet { awaiting: ExternalEvent },
    /// The workflow reached `Done`.
    Completed,
}

/// Result of one stage.
pub(crate) enum StageOutcome {
    Advance,
    Pause(ExternalEvent),
}

/// The top-level state machine.
pub struct StagePipeline<'a, W: Write = io::Stdout> {
    ctx: &'a OnboardContext,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn ArtifactFetcher,
    prompter: &'a mut dyn Prompter,
    writer: W,
    store: CheckpointStore,
}

impl<'a> StagePipeline<'a, io::Stdout> {
    pub fn new(
        ctx: &'a OnboardContext,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn ArtifactFetcher,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self::with_writer(ctx, runner, fetcher, prompter, io::stdout())
    }
}

impl<'a, W: Write> StagePipeline<'a, W> {
    /// Create a pipeline writing operator output to `writer` (for testing).
    pub fn with_writer(
        ctx: &'a OnboardContext,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn ArtifactFetcher,
        prompter: &'a mut dyn Prompter,
        writer: W,
    ) -> Self {
        Self {
            ctx,
            runner,
            fetcher,
            prompter,
            writer,
            store: ctx.checkpoint_store(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Start from an empty state.
    ///
    /// Refuses to run over an existing checkpoint unless `force` is set.
    pub fn run_fresh(&mut self, force: bool) -> anyhow::Result<RunOutcome> {
        if self.store.exists() && !force {
            anyhow::bail!(
                "A checkpoint already exists at {}. Run `onboard resume` to continue it, or `onboard start --force` to start over.",
                self.store.path().display()
            );
        }
        tracing::info!("starting a fresh onboarding run");
        let mut state = DeploymentState::new();
        self.drive(&mut state, Stage::SelectEnvironment)
    }

    /// Continue from the saved checkpoint.
    pub fn resume(&mut self) -> anyhow::Result<RunOutcome> {
        let mut state = self.store.load()?;
        let checkpoint = state.checkpoint().cloned().ok_or_else(|| {
            anyhow::Error::new(OnboardError::NotFound(format!(
                "checkpoint marker in {}",
                self.store.path().display()
            )))
        })?;
        state.require_through(checkpoint.stage)?;

        if state.contains(field::SIGNING_CREDENTIAL) {
            tracing::warn!(
                path = %self.store.path().display(),
                "checkpoint holds the signing credential; delete it once onboarding is complete"
            );
        }
        tracing::info!(stage = %checkpoint.stage, awaiting = ?checkpoint.awaiting, "resuming");

        if checkpoint.stage == Stage::Done {
            writeln!(
                self.writer,
                "Onboarding of {} is already complete.",
                state.text(field::CHAIN_NAME)?
            )?;
            self.print_state(&state)?;
            return Ok(RunOutcome::Completed);
        }

        let from = match checkpoint.awaiting {
            ExternalEvent::Nothing => checkpoint.stage,
            event => {
                if !self.confirm_event(&state, checkpoint.stage, event)? {
                    writeln!(
                        self.writer,
                        "Still waiting for {}. Nothing was changed; run `onboard resume` again later.",
                        event.describe()
                    )?;
                    self.print_state(&state)?;
                    return Ok(RunOutcome::NotYet { awaiting: event });
                }
                if let Some(commands) = state.optional_text(field::POOL_FUNDING_COMMANDS) {
                    writeln!(
                        self.writer,
                        "Fund the reward pools if not done yet:\n  {}",
                        commands.replace('\n', "\n  ")
                    )?;
                }
                checkpoint.stage.next().unwrap_or(Stage::Done)
            }
        };
        self.drive(&mut state, from)
    }

    fn drive(&mut self, state: &mut DeploymentState, from: Stage) -> anyhow::Result<RunOutcome> {
        let mut stage = from;
        loop {
            if stage == Stage::Done {
                state.set_checkpoint(Checkpoint::new(Stage::Done, ExternalEvent::Nothing));
                self.store.save(state)?;
                writeln!(
                    self.writer,
                    "Onboarding of {} is complete. Gateway deployed at {}.",
                    state.text(field::CHAIN_NAME)?,
                    state.text(field::GATEWAY_ADDRESS)?
                )?;
                return Ok(RunOutcome::Completed);
            }

            tracing::info!(%stage, "stage started");
            match self.run_stage(stage, state)? {
                StageOutcome::Advance => {
                    tracing::info!(%stage, "stage completed");
                    stage = stage.next().unwrap_or(Stage::Done);
                }
                StageOutcome::Pause(awaiting) => {
                    state.set_checkpoint(Checkpoint::new(stage, awaiting));
                    self.store.save(state)?;
                    writeln!(
                        self.writer,
                        "Progress saved to {}. Run `onboard resume` once {} is done.",
                        self.store.path().display(),
                        awaiting.describe()
                    )?;
                    return Ok(RunOutcome::Paused { stage, awaiting });
                }
            }
        }
    }

    fn confirm_event(
        &mut self,
        state: &DeploymentState,
        stage: Stage,
        event: ExternalEvent,
    ) -> anyhow::Result<bool> {
        let chain = state.text(field::CHAIN_NAME)?;
        let question = match event {
            ExternalEvent::VerifierOnboarding => format!(
                "Have verifiers registered support for {} and is the router registration in effect?",
                chain
            ),
            ExternalEvent::GovernanceApproval => format!(
                "Have the governance proposals for {} ({}) passed and executed?",
                chain,
                stages::pending_proposals(state, stage).join(", ")
            ),
            ExternalEvent::Nothing => return Ok(true),
        };
        self.prompter.confirm(&question, false)
    }

    fn print_state(&mut self, state: &DeploymentState) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", state.redacted().to_json_pretty()?)?;
        Ok(())
    }
}

//! Onboard - Amplifier chain onboarding
//!
//! Usage:
//!   onboard                  # Ask whether to start or resume
//!   onboard start            # Fresh run
//!   onboard resume           # Continue from the checkpoint
//!   onboard status           # Show the saved checkpoint
//!   onboard profile testnet  # Print an environment's network profile

mod prompter;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onboard_core::prelude::*;

use crate::prompter::DialoguerPrompter;

#[derive(Parser)]
#[command(name = "onboard")]
#[command(about = "Connect a new EVM chain to an Amplifier network", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./onboard.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Checkpoint file, overriding the configured location
    #[arg(long, global = true, value_name = "PATH")]
    checkpoint: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh onboarding run
    Start {
        /// Discard an existing checkpoint
        #[arg(long, short)]
        force: bool,
    },

    /// Continue the run saved in the checkpoint
    Resume,

    /// Show the saved checkpoint with secrets redacted
    Status,

    /// Print the network profile of an environment as JSON
    Profile {
        /// Environment id (mainnet, testnet, stagenet, devnet-amplifier or a custom id)
        environment: String,

        /// Registry document to derive a custom profile from
        #[arg(long, value_name = "PATH")]
        registry: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onboard=info,onboard_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let loaded = load_config(cli.config.as_deref(), &cwd)?;
    if let Some(source) = &loaded.source {
        tracing::debug!(path = %source.display(), "configuration loaded");
    }

    let mut ctx = OnboardContext::new(loaded.config, cwd);
    if let Some(path) = &cli.checkpoint {
        ctx = ctx.with_checkpoint_path(path);
    }

    let mut prompter = DialoguerPrompter::new();
    let command = match cli.command {
        Some(command) => command,
        None => choose_command(&ctx, &mut prompter)?,
    };

    match command {
        Commands::Start { force } => {
            let outcome = pipeline(&ctx, &mut prompter).run_fresh(force)?;
            report(&outcome);
        }
        Commands::Resume => {
            let outcome = pipeline(&ctx, &mut prompter).resume()?;
            report(&outcome);
        }
        Commands::Status => run_status(&ctx)?,
        Commands::Profile {
            environment,
            registry,
        } => run_profile(&ctx, &environment, registry)?,
    }
    Ok(())
}

fn choose_command(ctx: &OnboardContext, prompter: &mut dyn Prompter) -> Result<Commands> {
    let default = usize::from(ctx.checkpoint_store().exists());
    let choice = prompter.select(
        "What do you want to do?",
        &["Start a new onboarding", "Resume from the checkpoint"],
        default,
    )?;
    Ok(match choice {
        0 => Commands::Start { force: false },
        _ => Commands::Resume,
    })
}

fn pipeline<'a>(
    ctx: &'a OnboardContext,
    prompter: &'a mut DialoguerPrompter,
) -> StagePipeline<'a> {
    StagePipeline::new(ctx, &SystemRunner, &HttpFetcher, prompter)
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Paused { stage, awaiting } => {
            tracing::info!(%stage, awaiting = awaiting.describe(), "paused");
        }
        RunOutcome::NotYet { awaiting } => {
            tracing::info!(awaiting = awaiting.describe(), "still waiting");
        }
        RunOutcome::Completed => tracing::info!("onboarding complete"),
    }
}

fn run_status(ctx: &OnboardContext) -> Result<()> {
    let state = ctx.checkpoint_store().load()?;

    match state.checkpoint() {
        Some(checkpoint) => println!(
            "{} {} (waiting for {}, saved {})",
            style("Next stage:").bold(),
            style(checkpoint.stage).green(),
            checkpoint.awaiting.describe(),
            checkpoint.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("{}", style("Checkpoint has no stage marker").yellow()),
    }
    println!("{}", state.redacted().to_json_pretty()?);
    Ok(())
}

fn run_profile(ctx: &OnboardContext, environment: &str, registry: Option<PathBuf>) -> Result<()> {
    let environment = Environment::parse(environment)?;
    let resolver = ctx.resolver();
    let profile = match registry {
        Some(path) => resolver.resolve_from(&environment, &ctx.base_dir().join(path))?,
        None => resolver.resolve(&environment)?,
    };
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

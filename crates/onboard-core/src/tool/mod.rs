//! External tool invocation.
//!
//! Wraps the chain daemon CLI and the deployment scripts:
//! - `runner`: process execution and the fatal-on-failure rule
//! - `extract`: regex and JSON-pointer value extraction
//! - `patterns`: the named output contracts the pipeline depends on
//! - `daemon` / `scripts`: the argument lists each call site uses

pub mod daemon;
pub mod extract;
pub mod patterns;
pub mod runner;
pub mod scripts;

use std::path::Path;

pub use daemon::{DaemonClient, wallet_address};
pub use extract::OutputPattern;
pub use runner::{
    CommandRunner, ExternalCommandResult, SystemRunner, ToolCommand, ToolInvoker, extract,
};
pub use scripts::{GatewayDeployment, ProposalRequest, ScriptClient};

use crate::config::ToolsConfig;

/// `<daemon> <args...>`
pub fn daemon_command(tools: &ToolsConfig) -> ToolCommand {
    ToolCommand::new(&tools.daemon)
}

/// `<script_runner> <script>` run from the scripts directory.
pub fn script_command(tools: &ToolsConfig, scripts_dir: &Path, script: &str) -> ToolCommand {
    ToolCommand::new(&tools.script_runner)
        .arg(script)
        .current_dir(scripts_dir)
}

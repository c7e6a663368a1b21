//! Deployment script adapter.
//!
//! Scripts run from the scripts directory with the signing credential in
//! `PRIVATE_KEY`. Proposal submission reads `MNEMONIC` from the operator's
//! own environment.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::patterns::{
    DEPLOYED_GATEWAY_ADDRESS, PREDICTED_GATEWAY_ADDRESS, PROPOSAL_ID, instantiated_address,
};
use super::runner::{ToolCommand, ToolInvoker};
use super::script_command;
use crate::config::ToolsConfig;
use crate::profile::DeploymentMethod;

const GATEWAY_SCRIPT: &str = "evm/deploy-amplifier-gateway.js";
const CONTRACT_SCRIPT: &str = "cosmwasm/deploy-contract.js";
const PROPOSAL_SCRIPT: &str = "cosmwasm/submit-proposal.js";

/// Gateway deployment parameters.
#[derive(Debug, Clone, Copy)]
pub struct GatewayDeployment<'s> {
    pub chain: &'s str,
    pub method: DeploymentMethod,
    pub minimum_rotation_delay: u64,
}

/// A governance proposal wrapping one contract execution.
#[derive(Debug, Clone)]
pub struct ProposalRequest<'s> {
    pub contract: &'s str,
    pub title: String,
    pub description: String,
    pub msg: Value,
    pub deposit: &'s str,
    pub run_as: Option<&'s str>,
}

pub struct ScriptClient<'a> {
    invoker: ToolInvoker<'a>,
    tools: &'a ToolsConfig,
    scripts_dir: PathBuf,
    environment: String,
    private_key: Option<String>,
}

impl<'a> ScriptClient<'a> {
    pub fn new(
        invoker: ToolInvoker<'a>,
        tools: &'a ToolsConfig,
        scripts_dir: impl Into<PathBuf>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            tools,
            scripts_dir: scripts_dir.into(),
            environment: environment.into(),
            private_key: None,
        }
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    fn command(&self, script: &str) -> ToolCommand {
        let mut command = script_command(self.tools, &self.scripts_dir, script);
        if let Some(key) = &self.private_key {
            command = command.env("PRIVATE_KEY", key);
        }
        command
    }

    fn gateway_command(&self, deployment: &GatewayDeployment<'_>) -> ToolCommand {
        self.command(GATEWAY_SCRIPT).args([
            "-e",
            &self.environment,
            "-n",
            deployment.chain,
            "-m",
            deployment.method.as_str(),
            "--minimumRotationDelay",
            &deployment.minimum_rotation_delay.to_string(),
        ])
    }

    /// Gateway proxy address the deployment will produce.
    pub fn predict_gateway(&self, deployment: &GatewayDeployment<'_>) -> anyhow::Result<String> {
        let command = self
            .gateway_command(deployment)
            .args(["--predictOnly", "-y"]);
        let result = self
            .invoker
            .run_extract(&command, &PREDICTED_GATEWAY_ADDRESS)?;
        Ok(result.extracted.unwrap_or_default())
    }

    pub fn deploy_gateway(&self, deployment: &GatewayDeployment<'_>) -> anyhow::Result<String> {
        let command = self.gateway_command(deployment).arg("-y");
        let result = self
            .invoker
            .run_extract(&command, &DEPLOYED_GATEWAY_ADDRESS)?;
        Ok(result.extracted.unwrap_or_default())
    }

    /// Store the contract code on chain.
    pub fn upload(&self, contract: &str, artifact_dir: &Path) -> anyhow::Result<()> {
        let command = self.command(CONTRACT_SCRIPT).args([
            "upload",
            "-e",
            &self.environment,
            "-c",
            contract,
            "-a",
            &artifact_dir.display().to_string(),
            "-y",
        ]);
        self.invoker.run(&command)?;
        Ok(())
    }

    /// Instantiate with a predictable address; returns the contract address.
    pub fn instantiate(
        &self,
        contract: &str,
        chain: &str,
        salt: &str,
        admin: &str,
    ) -> anyhow::Result<String> {
        let command = self.command(CONTRACT_SCRIPT).args([
            "instantiate",
            "-e",
            &self.environment,
            "-n",
            chain,
            "-c",
            contract,
            "--fetchCodeId",
            "--instantiate2",
            "-s",
            salt,
            "--admin",
            admin,
            "-y",
        ]);
        let result = self
            .invoker
            .run_extract(&command, &instantiated_address(contract))?;
        Ok(result.extracted.unwrap_or_default())
    }

    /// Submit a proposal; returns its id.
    pub fn submit_proposal(&self, request: &ProposalRequest<'_>) -> anyhow::Result<String> {
        let mut command = self.command(PROPOSAL_SCRIPT).args([
            "execute",
            "-e",
            &self.environment,
            "-c",
            request.contract,
            "-t",
            &request.title,
            "-d",
            &request.description,
            "--msg",
            &request.msg.to_string(),
            "--deposit",
            request.deposit,
        ]);
        if let Some(run_as) = request.run_as {
            command = command.args(["--runAs", run_as]);
        }
        command = command.arg("-y");

        let result = self.invoker.run_extract(&command, &PROPOSAL_ID)?;
        let id = result.extracted.unwrap_or_default();
        tracing::info!(contract = request.contract, proposal_id = %id, "proposal submitted");
        Ok(id)
    }
}

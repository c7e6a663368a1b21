//! Per-stage behaviour of [`StagePipeline`].

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use super::{StageOutcome, StagePipeline, payload};
use crate::artifact::{ArtifactAcquirer, ContractArtifact};
use crate::error::OnboardError;
use crate::governance::{
    DispatchOutcome, ExecutionStrategy, GovernanceAction, GovernanceDispatcher, PoolParams,
    ProtocolContract, add_rewards_message,
};
use crate::profile::{Environment, NetworkProfile};
use crate::registry::{self, ChainTable, ConfigDocument};
use crate::stage::Stage;
use crate::state::{DeploymentState, ExternalEvent, field};
use crate::tool::patterns::VERIFIER_SET_ID;
use crate::tool::{DaemonClient, GatewayDeployment, ScriptClient, ToolInvoker, wallet_address};
use crate::validate::{InputKind, prompt_optional, prompt_validated};

const CUSTOM_ENVIRONMENT: &str = "custom (ad hoc)";

const PROTOCOL_CONTRACTS: [ProtocolContract; 4] = [
    ProtocolContract::Router,
    ProtocolContract::Multisig,
    ProtocolContract::Coordinator,
    ProtocolContract::Rewards,
];

/// Outcomes awaited at `AwaitGovernanceApproval`, in dispatch order.
const APPROVAL_OUTCOME_FIELDS: [&str; 3] = [
    field::REGISTER_CHAIN_OUTCOME,
    field::AUTHORIZE_CALLERS_OUTCOME,
    field::REGISTER_PROVER_OUTCOME,
];

/// Outcomes awaited after `FundRewardPools`.
const POOL_OUTCOME_FIELDS: [&str; 2] = [
    field::VOTING_VERIFIER_POOL_OUTCOME,
    field::MULTISIG_POOL_OUTCOME,
];

/// State fields tied to one deployed contract.
struct ContractFields {
    version: &'static str,
    salt: &'static str,
    artifact: &'static str,
    address: &'static str,
}

fn contract_fields(contract: ContractArtifact) -> ContractFields {
    match contract {
        ContractArtifact::VotingVerifier => ContractFields {
            version: field::VOTING_VERIFIER_VERSION,
            salt: field::VOTING_VERIFIER_SALT,
            artifact: field::VOTING_VERIFIER_ARTIFACT,
            address: field::VOTING_VERIFIER_ADDRESS,
        },
        ContractArtifact::MultisigProver => ContractFields {
            version: field::MULTISIG_PROVER_VERSION,
            salt: field::MULTISIG_PROVER_SALT,
            artifact: field::MULTISIG_PROVER_ARTIFACT,
            address: field::MULTISIG_PROVER_ADDRESS,
        },
        ContractArtifact::Gateway => ContractFields {
            version: field::GATEWAY_VERSION,
            salt: field::GATEWAY_SALT,
            artifact: field::GATEWAY_ARTIFACT,
            address: field::COSMWASM_GATEWAY_ADDRESS,
        },
    }
}

/// Ids of the submitted proposals a pause at `stage` waits on.
pub(super) fn pending_proposals(state: &DeploymentState, stage: Stage) -> Vec<String> {
    let fields: &[&str] = match stage {
        Stage::FundRewardPools => &POOL_OUTCOME_FIELDS,
        _ => &APPROVAL_OUTCOME_FIELDS,
    };
    fields
        .iter()
        .filter_map(|name| state.optional_text(name))
        .filter_map(|raw| raw.parse::<DispatchOutcome>().ok())
        .filter_map(|outcome| match outcome {
            DispatchOutcome::ProposalSubmitted { proposal_id } => Some(format!("#{}", proposal_id)),
            DispatchOutcome::Executed { .. } => None,
        })
        .collect()
}

/// Registry table recording the instantiated address of `contract`.
fn registry_table(contract: ContractArtifact) -> ChainTable {
    match contract {
        ContractArtifact::VotingVerifier => ChainTable::VotingVerifier,
        ContractArtifact::MultisigProver => ChainTable::MultisigProver,
        ContractArtifact::Gateway => ChainTable::Gateway,
    }
}

fn environment(state: &DeploymentState) -> anyhow::Result<Environment> {
    Ok(Environment::parse(state.text(field::ENVIRONMENT)?)?)
}

fn gateway_deployment<'s>(chain: &'s str, profile: &NetworkProfile) -> GatewayDeployment<'s> {
    GatewayDeployment {
        chain,
        method: profile.deployment_method,
        minimum_rotation_delay: profile.minimum_rotation_delay,
    }
}

impl<'a, W: Write> StagePipeline<'a, W> {
    pub(super) fn run_stage(
        &mut self,
        stage: Stage,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        match stage {
            Stage::SelectEnvironment => self.select_environment(state),
            Stage::CollectChainParameters => self.collect_chain_parameters(state),
            Stage::ValidateCredentials => self.validate_credentials(state),
            Stage::ResolveNetworkProfile => self.resolve_network_profile(state),
            Stage::PredictGatewayAddress => self.predict_gateway_address(state),
            Stage::WriteChainConfig => self.write_chain_config(state),
            Stage::AcquireArtifacts => self.acquire_artifacts(state),
            Stage::DeployVerifierContracts => self.deploy_verifier_contracts(state),
            Stage::RegisterChainWithRouter => self.register_chain_with_router(state),
            Stage::AwaitVerifierOnboarding => {
                Ok(StageOutcome::Pause(ExternalEvent::VerifierOnboarding))
            }
            Stage::AuthorizeMultisigProver => self.authorize_multisig_prover(state),
            Stage::AwaitGovernanceApproval => {
                let profile = NetworkProfile::from_state(state)?;
                if ExecutionStrategy::for_profile(&profile).is_proposal() {
                    Ok(StageOutcome::Pause(ExternalEvent::GovernanceApproval))
                } else {
                    Ok(StageOutcome::Advance)
                }
            }
            Stage::FundRewardPools => self.fund_reward_pools(state),
            Stage::CreateGenesisVerifierSet => self.create_genesis_verifier_set(state),
            Stage::DeployGateway => self.deploy_gateway(state),
            Stage::Done => Ok(StageOutcome::Advance),
        }
    }

    fn invoker(&self) -> ToolInvoker<'a> {
        ToolInvoker::new(self.runner)
    }

    fn scripts(&self, state: &DeploymentState) -> anyhow::Result<ScriptClient<'a>> {
        Ok(ScriptClient::new(
            self.invoker(),
            self.ctx.tools(),
            self.ctx.scripts_dir(),
            state.text(field::ENVIRONMENT)?,
        )
        .with_private_key(state.text(field::SIGNING_CREDENTIAL)?))
    }

    fn daemon(&self, state: &DeploymentState) -> anyhow::Result<DaemonClient<'a>> {
        Ok(DaemonClient::new(
            self.invoker(),
            self.ctx.tools(),
            state.text(field::AXELAR_RPC)?,
            state.text(field::AXELAR_CHAIN_ID)?,
        ))
    }

    fn registry_path(&self, state: &DeploymentState) -> anyhow::Result<PathBuf> {
        Ok(self.ctx.registry_path(&environment(state)?))
    }

    /// Route `action` through the environment's execution strategy.
    fn dispatch(
        &mut self,
        state: &DeploymentState,
        action: &GovernanceAction,
    ) -> anyhow::Result<DispatchOutcome> {
        let daemon = self.daemon(state)?;
        let scripts = self.scripts(state)?;
        let strategy = ExecutionStrategy::for_profile(&NetworkProfile::from_state(state)?);
        let dispatcher = GovernanceDispatcher::new(&daemon, &scripts, strategy);

        let target = state.text(action.contract().address_field())?;
        let outcome = dispatcher.dispatch(action, target)?;
        match &outcome {
            DispatchOutcome::Executed { tx_hash } => {
                writeln!(self.writer, "{}: executed in {}", action.title(), tx_hash)?
            }
            DispatchOutcome::ProposalSubmitted { proposal_id } => writeln!(
                self.writer,
                "{}: submitted as proposal #{}",
                action.title(),
                proposal_id
            )?,
        }
        Ok(outcome)
    }

    fn select_environment(&mut self, state: &mut DeploymentState) -> anyhow::Result<StageOutcome> {
        let known = Environment::KNOWN;
        let mut items: Vec<&str> = known.iter().map(Environment::id).collect();
        items.push(CUSTOM_ENVIRONMENT);

        let index = self
            .prompter
            .select("Deployment environment", &items, items.len() - 1)?;
        let environment = match known.get(index) {
            Some(env) => env.clone(),
            None => {
                let id = prompt_validated(
                    &mut *self.prompter,
                    InputKind::EnvironmentId,
                    "Custom environment id",
                    None,
                )?;
                Environment::parse(&id)?
            }
        };

        state.set(field::ENVIRONMENT, environment.id())?;
        state.set(field::ENVIRONMENT_CLASS, environment.class().as_str())?;
        tracing::info!(%environment, class = environment.class().as_str(), "environment selected");
        Ok(StageOutcome::Advance)
    }

    fn collect_chain_parameters(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let prompter = &mut *self.prompter;
        let number = |raw: String| -> anyhow::Result<u64> {
            raw.parse::<u64>()
                .with_context(|| format!("'{}' is not an unsigned integer", raw))
        };

        let chain = prompt_validated(prompter, InputKind::ChainName, "Chain name", None)?;
        let chain_id = number(prompt_validated(
            prompter,
            InputKind::Number,
            "EVM chain id",
            None,
        )?)?;
        let token = prompt_validated(prompter, InputKind::Text, "Native token symbol", None)?;
        let gas_limit = number(prompt_validated(
            prompter,
            InputKind::Number,
            "Gas limit",
            Some("8000000"),
        )?)?;
        let rpc = prompt_validated(prompter, InputKind::Url, "RPC URL", None)?;
        let explorer_name = prompt_validated(prompter, InputKind::Text, "Explorer name", None)?;
        let explorer_url = prompt_validated(prompter, InputKind::Url, "Explorer URL", None)?;

        state.set(field::CHAIN_NAME, chain)?;
        state.set(field::CHAIN_ID, chain_id)?;
        state.set(field::TOKEN_SYMBOL, token)?;
        state.set(field::GAS_LIMIT, gas_limit)?;
        state.set(field::RPC_URL, rpc)?;
        state.set(field::EXPLORER_NAME, explorer_name)?;
        state.set(field::EXPLORER_URL, explorer_url)?;

        for contract in ContractArtifact::ALL {
            let question = format!("{} version (blank for latest)", contract);
            if let Some(version) = prompt_optional(prompter, InputKind::Version, &question)? {
                state.set(contract_fields(contract).version, version)?;
            }
        }
        Ok(StageOutcome::Advance)
    }

    fn validate_credentials(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let credential = prompt_validated(
            &mut *self.prompter,
            InputKind::Credential,
            "Deployer private key",
            None,
        )?;
        state.set(field::SIGNING_CREDENTIAL, credential)?;

        let wallet = wallet_address(&self.invoker(), self.ctx.tools())?;
        writeln!(self.writer, "Operator wallet: {}", wallet)?;
        state.set(field::WALLET_ADDRESS, wallet)?;
        Ok(StageOutcome::Advance)
    }

    fn resolve_network_profile(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let environment = environment(state)?;
        let profile = self.ctx.resolver().resolve(&environment)?;
        profile.record_into(state)?;

        let doc = ConfigDocument::load(&self.ctx.registry_path(&environment))?;
        state.set(field::AXELAR_CHAIN_ID, doc.lookup_str(&["axelar", "chainId"])?)?;
        state.set(field::AXELAR_RPC, doc.lookup_str(&["axelar", "rpc"])?)?;
        for contract in PROTOCOL_CONTRACTS {
            let address = doc.lookup_str(&["axelar", "contracts", contract.name(), "address"])?;
            state.set(contract.address_field(), address)?;
        }

        let strategy = if ExecutionStrategy::for_profile(&profile).is_proposal() {
            "governance proposals"
        } else {
            "direct transactions"
        };
        writeln!(
            self.writer,
            "Environment {} ({}): governance {}, actions via {}",
            environment,
            profile.class.as_str(),
            profile.governance_address,
            strategy
        )?;
        Ok(StageOutcome::Advance)
    }

    fn predict_gateway_address(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let profile = NetworkProfile::from_state(state)?;
        let predicted = self
            .scripts(state)?
            .predict_gateway(&gateway_deployment(state.text(field::CHAIN_NAME)?, &profile))?;

        writeln!(self.writer, "Predicted gateway address: {}", predicted)?;
        state.set(field::PREDICTED_GATEWAY_ADDRESS, predicted)?;
        Ok(StageOutcome::Advance)
    }

    fn write_chain_config(&mut self, state: &mut DeploymentState) -> anyhow::Result<StageOutcome> {
        let doc_path = self.registry_path(state)?;
        registry::insert_chain_config(
            &doc_path,
            state.text(field::CHAIN_NAME)?,
            payload::chain_config(state)?,
        )?;
        Ok(StageOutcome::Advance)
    }

    fn acquire_artifacts(&mut self, state: &mut DeploymentState) -> anyhow::Result<StageOutcome> {
        let acquirer = ArtifactAcquirer::new(
            self.ctx.artifact_base_url(),
            self.ctx.cache_dir(),
            self.fetcher,
        );
        for contract in ContractArtifact::ALL {
            let fields = contract_fields(contract);
            let artifact = acquirer.acquire(contract, state.optional_text(fields.version))?;
            state.set(fields.salt, artifact.salt.as_str())?;
            state.set(fields.artifact, artifact.artifact_dir.display().to_string())?;
        }
        Ok(StageOutcome::Advance)
    }

    fn deploy_verifier_contracts(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let profile = NetworkProfile::from_state(state)?;
        let doc_path = self.registry_path(state)?;
        let chain = state.text(field::CHAIN_NAME)?.to_string();

        registry::insert_voting_verifier(
            &doc_path,
            &chain,
            payload::voting_verifier(state, &profile)?,
        )?;
        registry::insert_multisig_prover(
            &doc_path,
            &chain,
            payload::multisig_prover(state, &profile)?,
        )?;

        let scripts = self.scripts(state)?;
        let upload = !profile.class.requires_proposal();
        for contract in ContractArtifact::ALL {
            let fields = contract_fields(contract);
            let name = contract.contract_name();
            if upload {
                scripts.upload(name, Path::new(state.text(fields.artifact)?))?;
            }
            let salt = state.text(fields.salt)?;
            let address = scripts.instantiate(name, &chain, salt, &profile.admin_address)?;
            writeln!(self.writer, "{} instantiated at {}", name, address)?;
            registry::record_address(&doc_path, registry_table(contract), &chain, &address)?;
            state.set(fields.address, address)?;
        }
        Ok(StageOutcome::Advance)
    }

    fn register_chain_with_router(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let action = GovernanceAction::RegisterChain {
            chain: state.text(field::CHAIN_NAME)?.to_string(),
            gateway_address: state.text(field::COSMWASM_GATEWAY_ADDRESS)?.to_string(),
        };
        let outcome = self.dispatch(state, &action)?;
        state.set(field::REGISTER_CHAIN_OUTCOME, outcome.to_string())?;
        Ok(StageOutcome::Advance)
    }

    fn authorize_multisig_prover(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let chain = state.text(field::CHAIN_NAME)?.to_string();
        let prover = state.text(field::MULTISIG_PROVER_ADDRESS)?.to_string();

        let authorize = GovernanceAction::AuthorizeCallers {
            chain: chain.clone(),
            prover_address: prover.clone(),
        };
        let outcome = self.dispatch(state, &authorize)?;
        state.set(field::AUTHORIZE_CALLERS_OUTCOME, outcome.to_string())?;

        let register = GovernanceAction::RegisterProverContract {
            chain,
            prover_address: prover,
        };
        let outcome = self.dispatch(state, &register)?;
        state.set(field::REGISTER_PROVER_OUTCOME, outcome.to_string())?;
        Ok(StageOutcome::Advance)
    }

    fn fund_reward_pools(&mut self, state: &mut DeploymentState) -> anyhow::Result<StageOutcome> {
        let profile = NetworkProfile::from_state(state)?;
        let chain = state.text(field::CHAIN_NAME)?.to_string();
        let rewards = state.text(field::REWARDS_ADDRESS)?.to_string();

        let pools = [
            (
                field::VOTING_VERIFIER_ADDRESS,
                field::VOTING_VERIFIER_POOL_OUTCOME,
                field::VOTING_VERIFIER_FUNDING_TX,
            ),
            (
                field::MULTISIG_ADDRESS,
                field::MULTISIG_POOL_OUTCOME,
                field::MULTISIG_FUNDING_TX,
            ),
        ];
        let mut funding_commands = Vec::new();
        for (pool_field, outcome_field, funding_field) in pools {
            let pool_contract = state.text(pool_field)?.to_string();
            let action = GovernanceAction::CreatePool {
                chain: chain.clone(),
                pool_contract: pool_contract.clone(),
                params: PoolParams::from_profile(&profile),
            };
            let outcome = self.dispatch(state, &action)?;
            state.set(outcome_field, outcome.to_string())?;

            let daemon = self.daemon(state)?;
            let msg = add_rewards_message(&chain, &pool_contract);
            let funds = Some(profile.reward_amount.as_str());
            match outcome {
                DispatchOutcome::Executed { .. } => {
                    let tx_hash = daemon.execute(&rewards, &msg, funds)?;
                    writeln!(self.writer, "Funded pool for {} in {}", pool_contract, tx_hash)?;
                    state.set(funding_field, tx_hash)?;
                }
                DispatchOutcome::ProposalSubmitted { proposal_id } => {
                    let command = daemon.execute_command(&rewards, &msg, funds).display();
                    writeln!(
                        self.writer,
                        "Once proposal #{} passes, fund the pool with:\n  {}",
                        proposal_id, command
                    )?;
                    funding_commands.push(command);
                }
            }
        }

        if funding_commands.is_empty() {
            return Ok(StageOutcome::Advance);
        }
        state.set(field::POOL_FUNDING_COMMANDS, funding_commands.join("\n"))?;
        Ok(StageOutcome::Pause(ExternalEvent::GovernanceApproval))
    }

    fn create_genesis_verifier_set(
        &mut self,
        state: &mut DeploymentState,
    ) -> anyhow::Result<StageOutcome> {
        let daemon = self.daemon(state)?;
        let prover = state.text(field::MULTISIG_PROVER_ADDRESS)?.to_string();

        let tx_hash = daemon.execute(&prover, &json!("update_verifier_set"), None)?;
        state.set(field::VERIFIER_SET_UPDATE_TX, tx_hash)?;

        let id = daemon.query(&prover, &json!("current_verifier_set"), &VERIFIER_SET_ID)?;
        writeln!(self.writer, "Genesis verifier set: {}", id)?;
        state.set(field::VERIFIER_SET_ID, id)?;
        Ok(StageOutcome::Advance)
    }

    fn deploy_gateway(&mut self, state: &mut DeploymentState) -> anyhow::Result<StageOutcome> {
        let profile = NetworkProfile::from_state(state)?;
        let predicted = state.text(field::PREDICTED_GATEWAY_ADDRESS)?.to_string();
        let deployed = self
            .scripts(state)?
            .deploy_gateway(&gateway_deployment(state.text(field::CHAIN_NAME)?, &profile))?;

        if !deployed.eq_ignore_ascii_case(&predicted) {
            return Err(OnboardError::PredictionMismatch { predicted, deployed }.into());
        }
        state.set(field::GATEWAY_ADDRESS, deployed)?;
        Ok(StageOutcome::Advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_proposals_skips_direct_outcomes() {
        let mut state = DeploymentState::new();
        state
            .set(field::REGISTER_CHAIN_OUTCOME, "executed:ABCD")
            .unwrap();
        state
            .set(field::AUTHORIZE_CALLERS_OUTCOME, "proposal:12")
            .unwrap();
        state
            .set(field::REGISTER_PROVER_OUTCOME, "proposal:13")
            .unwrap();

        assert_eq!(
            pending_proposals(&state, Stage::AwaitGovernanceApproval),
            vec!["#12", "#13"]
        );
    }

    #[test]
    fn test_pool_pause_waits_only_on_pool_proposals() {
        let mut state = DeploymentState::new();
        state
            .set(field::REGISTER_PROVER_OUTCOME, "proposal:3")
            .unwrap();
        state
            .set(field::VOTING_VERIFIER_POOL_OUTCOME, "proposal:4")
            .unwrap();
        state
            .set(field::MULTISIG_POOL_OUTCOME, "proposal:5")
            .unwrap();

        assert_eq!(
            pending_proposals(&state, Stage::FundRewardPools),
            vec!["#4", "#5"]
        );
    }

    #[test]
    fn test_every_contract_has_distinct_fields() {
        let mut seen = std::collections::HashSet::new();
        for contract in ContractArtifact::ALL {
            let fields = contract_fields(contract);
            for name in [fields.version, fields.salt, fields.artifact, fields.address] {
                assert!(seen.insert(name), "{} reused", name);
            }
        }
    }
}

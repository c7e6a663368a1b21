//! Governance-affecting actions and how they reach the chain.
//!
//! Ad hoc environments execute actions directly from the operator wallet.
//! Shared environments wrap them in proposals; a submitted proposal has not
//! taken effect yet, so callers must wait for approval before relying on it.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use crate::profile::{EnvironmentClass, NetworkProfile, Threshold};
use crate::state::field;
use crate::tool::{DaemonClient, ProposalRequest, ScriptClient};

/// Message id format announced when registering an EVM chain.
pub const EVM_MSG_ID_FORMAT: &str = "hex_tx_hash_and_event_index";

/// Shared protocol contracts that governance actions target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolContract {
    Router,
    Multisig,
    Coordinator,
    Rewards,
}

impl ProtocolContract {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolContract::Router => "Router",
            ProtocolContract::Multisig => "Multisig",
            ProtocolContract::Coordinator => "Coordinator",
            ProtocolContract::Rewards => "Rewards",
        }
    }

    /// State field holding the contract address.
    pub fn address_field(&self) -> &'static str {
        match self {
            ProtocolContract::Router => field::ROUTER_ADDRESS,
            ProtocolContract::Multisig => field::MULTISIG_ADDRESS,
            ProtocolContract::Coordinator => field::COORDINATOR_ADDRESS,
            ProtocolContract::Rewards => field::REWARDS_ADDRESS,
        }
    }
}

/// Reward pool parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub epoch_duration: u64,
    pub rewards_per_epoch: u64,
    pub participation_threshold: Threshold,
}

impl PoolParams {
    pub fn from_profile(profile: &NetworkProfile) -> Self {
        Self {
            epoch_duration: profile.reward_epoch_duration,
            rewards_per_epoch: profile.rewards_per_epoch,
            participation_threshold: profile.participation_threshold,
        }
    }
}

/// An administrative action that needs governance rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceAction {
    RegisterChain {
        chain: String,
        gateway_address: String,
    },
    AuthorizeCallers {
        chain: String,
        prover_address: String,
    },
    RegisterProverContract {
        chain: String,
        prover_address: String,
    },
    CreatePool {
        chain: String,
        /// VotingVerifier or Multisig address the pool rewards
        pool_contract: String,
        params: PoolParams,
    },
}

impl GovernanceAction {
    pub fn contract(&self) -> ProtocolContract {
        match self {
            GovernanceAction::RegisterChain { .. } => ProtocolContract::Router,
            GovernanceAction::AuthorizeCallers { .. } => ProtocolContract::Multisig,
            GovernanceAction::RegisterProverContract { .. } => ProtocolContract::Coordinator,
            GovernanceAction::CreatePool { .. } => ProtocolContract::Rewards,
        }
    }

    pub fn message(&self) -> Value {
        match self {
            GovernanceAction::RegisterChain {
                chain,
                gateway_address,
            } => json!({
                "register_chain": {
                    "chain": chain,
                    "gateway_address": gateway_address,
                    "msg_id_format": EVM_MSG_ID_FORMAT,
                }
            }),
            GovernanceAction::AuthorizeCallers {
                chain,
                prover_address,
            } => json!({
                "authorize_callers": {
                    "contracts": { prover_address.as_str(): chain }
                }
            }),
            GovernanceAction::RegisterProverContract {
                chain,
                prover_address,
            } => json!({
                "register_prover_contract": {
                    "chain_name": chain,
                    "new_prover_addr": prover_address,
                }
            }),
            GovernanceAction::CreatePool {
                chain,
                pool_contract,
                params,
            } => json!({
                "create_pool": {
                    "pool_id": pool_id(chain, pool_contract),
                    "params": {
                        "epoch_duration": params.epoch_duration.to_string(),
                        "rewards_per_epoch": params.rewards_per_epoch.to_string(),
                        "participation_threshold": params.participation_threshold.to_json(),
                    }
                }
            }),
        }
    }

    pub fn title(&self) -> String {
        match self {
            GovernanceAction::RegisterChain { chain, .. } => {
                format!("Register {} on the router", chain)
            }
            GovernanceAction::AuthorizeCallers { chain, .. } => {
                format!("Authorize the {} multisig prover", chain)
            }
            GovernanceAction::RegisterProverContract { chain, .. } => {
                format!("Register the {} prover with the coordinator", chain)
            }
            GovernanceAction::CreatePool { chain, .. } => {
                format!("Create {} reward pool", chain)
            }
        }
    }

    fn description(&self) -> String {
        format!(
            "{}: execute {} on {}",
            self.title(),
            self.message(),
            self.contract().name()
        )
    }
}

/// `add_rewards` message for a pool. Funding is not a governance action.
pub fn add_rewards_message(chain: &str, pool_contract: &str) -> Value {
    json!({ "add_rewards": { "pool_id": pool_id(chain, pool_contract) } })
}

fn pool_id(chain: &str, pool_contract: &str) -> Value {
    json!({ "chain_name": chain, "contract": pool_contract })
}

/// How governance actions are carried out in an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Direct,
    Proposal {
        deposit: String,
        run_as: Option<String>,
    },
}

impl ExecutionStrategy {
    /// Selected by environment class alone.
    pub fn for_profile(profile: &NetworkProfile) -> Self {
        Self::for_class(
            profile.class,
            &profile.deposit_value,
            profile.run_as_account.as_deref(),
        )
    }

    pub fn for_class(class: EnvironmentClass, deposit: &str, run_as: Option<&str>) -> Self {
        if class.requires_proposal() {
            ExecutionStrategy::Proposal {
                deposit: deposit.to_string(),
                run_as: run_as.map(str::to_string),
            }
        } else {
            ExecutionStrategy::Direct
        }
    }

    pub fn is_proposal(&self) -> bool {
        matches!(self, ExecutionStrategy::Proposal { .. })
    }
}

/// What a dispatch achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Took effect in the given transaction.
    Executed { tx_hash: String },
    /// Waiting for the proposal to pass.
    ProposalSubmitted { proposal_id: String },
}

impl DispatchOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, DispatchOutcome::ProposalSubmitted { .. })
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Executed { tx_hash } => write!(f, "executed:{}", tx_hash),
            DispatchOutcome::ProposalSubmitted { proposal_id } => {
                write!(f, "proposal:{}", proposal_id)
            }
        }
    }
}

impl FromStr for DispatchOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("executed", hash)) if !hash.is_empty() => Ok(DispatchOutcome::Executed {
                tx_hash: hash.to_string(),
            }),
            Some(("proposal", id)) if !id.is_empty() => Ok(DispatchOutcome::ProposalSubmitted {
                proposal_id: id.to_string(),
            }),
            _ => anyhow::bail!("Unrecognised dispatch outcome '{}'", s),
        }
    }
}

/// Routes every governance action through the environment's strategy.
pub struct GovernanceDispatcher<'c, 'a> {
    daemon: &'c DaemonClient<'a>,
    scripts: &'c ScriptClient<'a>,
    strategy: ExecutionStrategy,
}

impl<'c, 'a> GovernanceDispatcher<'c, 'a> {
    pub fn new(
        daemon: &'c DaemonClient<'a>,
        scripts: &'c ScriptClient<'a>,
        strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            daemon,
            scripts,
            strategy,
        }
    }

    pub fn strategy(&self) -> &ExecutionStrategy {
        &self.strategy
    }

    /// Carry out `action` against the contract at `target`.
    pub fn dispatch(
        &self,
        action: &GovernanceAction,
        target: &str,
    ) -> anyhow::Result<DispatchOutcome> {
        let outcome = match &self.strategy {
            ExecutionStrategy::Direct => DispatchOutcome::Executed {
                tx_hash: self.daemon.execute(target, &action.message(), None)?,
            },
            ExecutionStrategy::Proposal { deposit, run_as } => {
                let request = ProposalRequest {
                    contract: action.contract().name(),
                    title: action.title(),
                    description: action.description(),
                    msg: action.message(),
                    deposit,
                    run_as: run_as.as_deref(),
                };
                DispatchOutcome::ProposalSubmitted {
                    proposal_id: self.scripts.submit_proposal(&request)?,
                }
            }
        };
        tracing::info!(
            contract = action.contract().name(),
            title = %action.title(),
            outcome = %outcome,
            "governance action dispatched"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use crate::profile::{Environment, NetworkProfileResolver};
    use crate::tool::{CommandRunner, ExternalCommandResult, ToolCommand, ToolInvoker};
    use std::cell::RefCell;
    use std::path::Path;

    struct Recorder {
        seen: RefCell<Vec<ToolCommand>>,
    }

    impl CommandRunner for Recorder {
        fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
            self.seen.borrow_mut().push(command.clone());
            let stdout = if command.has_arg("cosmwasm/submit-proposal.js") {
                "Proposal submitted: 31\n"
            } else {
                r#"{"txhash":"F00D","code":0}"#
            };
            Ok(ExternalCommandResult::success(stdout))
        }
    }

    fn register() -> GovernanceAction {
        GovernanceAction::RegisterChain {
            chain: "foo-1".to_string(),
            gateway_address: "axelar1gateway".to_string(),
        }
    }

    #[test]
    fn test_every_known_environment_maps_to_one_strategy() {
        let resolver = NetworkProfileResolver::new("unused");
        for env in Environment::KNOWN {
            let profile = resolver.resolve(&env).unwrap();
            let strategy = ExecutionStrategy::for_profile(&profile);
            assert!(strategy.is_proposal(), "{} should use proposals", env);
        }
        assert_eq!(
            ExecutionStrategy::for_class(EnvironmentClass::AdHoc, "1", None),
            ExecutionStrategy::Direct
        );
    }

    #[test]
    fn test_direct_dispatch_executes_transaction() {
        let runner = Recorder {
            seen: RefCell::new(Vec::new()),
        };
        let tools = ToolsConfig::default();
        let daemon = DaemonClient::new(ToolInvoker::new(&runner), &tools, "node", "chain");
        let scripts = ScriptClient::new(ToolInvoker::new(&runner), &tools, Path::new("."), "dev");
        let dispatcher = GovernanceDispatcher::new(&daemon, &scripts, ExecutionStrategy::Direct);

        let outcome = dispatcher.dispatch(&register(), "axelar1router").unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Executed {
                tx_hash: "F00D".to_string()
            }
        );
        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].has_arg("axelar1router"));
    }

    #[test]
    fn test_proposal_dispatch_only_submits() {
        let runner = Recorder {
            seen: RefCell::new(Vec::new()),
        };
        let tools = ToolsConfig::default();
        let daemon = DaemonClient::new(ToolInvoker::new(&runner), &tools, "node", "chain");
        let scripts =
            ScriptClient::new(ToolInvoker::new(&runner), &tools, Path::new("."), "testnet");
        let strategy = ExecutionStrategy::Proposal {
            deposit: "2000000000".to_string(),
            run_as: None,
        };
        let dispatcher = GovernanceDispatcher::new(&daemon, &scripts, strategy);

        let outcome = dispatcher.dispatch(&register(), "axelar1router").unwrap();

        assert!(outcome.is_pending());
        assert_eq!(outcome.to_string(), "proposal:31");
        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].has_arg("Router"));
        assert!(seen[0].has_arg("2000000000"));
        assert!(!seen[0].has_arg("tx"));
    }

    #[test]
    fn test_messages() {
        let authorize = GovernanceAction::AuthorizeCallers {
            chain: "foo-1".to_string(),
            prover_address: "axelar1prover".to_string(),
        };
        assert_eq!(
            authorize.message(),
            json!({"authorize_callers": {"contracts": {"axelar1prover": "foo-1"}}})
        );

        let pool = GovernanceAction::CreatePool {
            chain: "foo-1".to_string(),
            pool_contract: "axelar1verifier".to_string(),
            params: PoolParams {
                epoch_duration: 100,
                rewards_per_epoch: 50,
                participation_threshold: Threshold::new(7, 10),
            },
        };
        assert_eq!(
            pool.message()["create_pool"]["params"]["participation_threshold"],
            json!(["7", "10"])
        );
        assert_eq!(pool.contract(), ProtocolContract::Rewards);
    }

    #[test]
    fn test_outcome_round_trips_through_text() {
        for outcome in [
            DispatchOutcome::Executed {
                tx_hash: "AB".to_string(),
            },
            DispatchOutcome::ProposalSubmitted {
                proposal_id: "7".to_string(),
            },
        ] {
            assert_eq!(outcome.to_string().parse::<DispatchOutcome>().unwrap(), outcome);
        }
        assert!("pending".parse::<DispatchOutcome>().is_err());
    }
}

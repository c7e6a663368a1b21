//! The ordered stages of the onboarding workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::field;

/// One step of the workflow. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    SelectEnvironment,
    CollectChainParameters,
    ValidateCredentials,
    ResolveNetworkProfile,
    PredictGatewayAddress,
    WriteChainConfig,
    AcquireArtifacts,
    DeployVerifierContracts,
    RegisterChainWithRouter,
    AwaitVerifierOnboarding,
    AuthorizeMultisigProver,
    AwaitGovernanceApproval,
    FundRewardPools,
    CreateGenesisVerifierSet,
    DeployGateway,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 16] = [
        Stage::SelectEnvironment,
        Stage::CollectChainParameters,
        Stage::ValidateCredentials,
        Stage::ResolveNetworkProfile,
        Stage::PredictGatewayAddress,
        Stage::WriteChainConfig,
        Stage::AcquireArtifacts,
        Stage::DeployVerifierContracts,
        Stage::RegisterChainWithRouter,
        Stage::AwaitVerifierOnboarding,
        Stage::AuthorizeMultisigProver,
        Stage::AwaitGovernanceApproval,
        Stage::FundRewardPools,
        Stage::CreateGenesisVerifierSet,
        Stage::DeployGateway,
        Stage::Done,
    ];

    /// The following stage, or `None` at `Done`.
    pub fn next(self) -> Option<Stage> {
        let idx = Stage::ALL.iter().position(|s| *s == self)?;
        Stage::ALL.get(idx + 1).copied()
    }

    /// Stages strictly before `self`.
    pub fn predecessors(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().take_while(move |s| *s < self)
    }

    /// State fields that are always present once the stage has completed.
    ///
    /// Fields that depend on the execution strategy or on optional input are
    /// not listed.
    pub fn produces(self) -> &'static [&'static str] {
        match self {
            Stage::SelectEnvironment => &[field::ENVIRONMENT, field::ENVIRONMENT_CLASS],
            Stage::CollectChainParameters => &[
                field::CHAIN_NAME,
                field::CHAIN_ID,
                field::TOKEN_SYMBOL,
                field::GAS_LIMIT,
                field::RPC_URL,
                field::EXPLORER_NAME,
                field::EXPLORER_URL,
            ],
            Stage::ValidateCredentials => &[field::SIGNING_CREDENTIAL, field::WALLET_ADDRESS],
            Stage::ResolveNetworkProfile => &[
                field::GOVERNANCE_ADDRESS,
                field::ADMIN_ADDRESS,
                field::SERVICE_NAME,
                field::VOTING_THRESHOLD,
                field::SIGNING_THRESHOLD,
                field::CONFIRMATION_HEIGHT,
                field::MINIMUM_ROTATION_DELAY,
                field::DEPLOYMENT_METHOD,
                field::DEPOSIT_VALUE,
                field::REWARD_AMOUNT,
                field::BLOCK_EXPIRY,
                field::REWARDS_DENOM,
                field::REWARD_EPOCH_DURATION,
                field::REWARDS_PER_EPOCH,
                field::PARTICIPATION_THRESHOLD,
                field::AXELAR_CHAIN_ID,
                field::AXELAR_RPC,
                field::ROUTER_ADDRESS,
                field::MULTISIG_ADDRESS,
                field::COORDINATOR_ADDRESS,
                field::REWARDS_ADDRESS,
            ],
            Stage::PredictGatewayAddress => &[field::PREDICTED_GATEWAY_ADDRESS],
            Stage::WriteChainConfig => &[],
            Stage::AcquireArtifacts => &[
                field::VOTING_VERIFIER_SALT,
                field::MULTISIG_PROVER_SALT,
                field::GATEWAY_SALT,
            ],
            Stage::DeployVerifierContracts => &[
                field::VOTING_VERIFIER_ADDRESS,
                field::COSMWASM_GATEWAY_ADDRESS,
                field::MULTISIG_PROVER_ADDRESS,
            ],
            Stage::RegisterChainWithRouter => &[field::REGISTER_CHAIN_OUTCOME],
            Stage::AwaitVerifierOnboarding => &[],
            Stage::AuthorizeMultisigProver => &[
                field::AUTHORIZE_CALLERS_OUTCOME,
                field::REGISTER_PROVER_OUTCOME,
            ],
            Stage::AwaitGovernanceApproval => &[],
            Stage::FundRewardPools => &[
                field::VOTING_VERIFIER_POOL_OUTCOME,
                field::MULTISIG_POOL_OUTCOME,
            ],
            Stage::CreateGenesisVerifierSet => &[field::VERIFIER_SET_ID],
            Stage::DeployGateway => &[field::GATEWAY_ADDRESS],
            Stage::Done => &[],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_strictly_forward() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Stage::Done.next(), None);
    }

    #[test]
    fn test_predecessors() {
        let before: Vec<_> = Stage::ValidateCredentials.predecessors().collect();
        assert_eq!(
            before,
            vec![Stage::SelectEnvironment, Stage::CollectChainParameters]
        );
        assert_eq!(Stage::SelectEnvironment.predecessors().count(), 0);
    }

    #[test]
    fn test_no_field_is_produced_twice() {
        let mut seen = std::collections::HashSet::new();
        for stage in Stage::ALL {
            for name in stage.produces() {
                assert!(seen.insert(*name), "{} produced twice", name);
            }
        }
    }

    #[test]
    fn test_serialized_names_match_display() {
        let json = serde_json::to_string(&Stage::AwaitGovernanceApproval).unwrap();
        assert_eq!(json, "\"AwaitGovernanceApproval\"");
        assert_eq!(Stage::FundRewardPools.to_string(), "FundRewardPools");
    }
}

//! State field names. These are also the keys of the checkpoint file.

/// Reserved for the checkpoint marker itself.
pub const CHECKPOINT: &str = "checkpoint";

pub const ENVIRONMENT: &str = "environment";
pub const ENVIRONMENT_CLASS: &str = "environmentClass";

pub const CHAIN_NAME: &str = "chainName";
pub const CHAIN_ID: &str = "chainId";
pub const TOKEN_SYMBOL: &str = "tokenSymbol";
pub const GAS_LIMIT: &str = "gasLimit";
pub const RPC_URL: &str = "rpcUrl";
pub const EXPLORER_NAME: &str = "explorerName";
pub const EXPLORER_URL: &str = "explorerUrl";
pub const VOTING_VERIFIER_VERSION: &str = "votingVerifierVersion";
pub const MULTISIG_PROVER_VERSION: &str = "multisigProverVersion";
pub const GATEWAY_VERSION: &str = "gatewayVersion";

pub const SIGNING_CREDENTIAL: &str = "signingCredential";
pub const WALLET_ADDRESS: &str = "walletAddress";

pub const GOVERNANCE_ADDRESS: &str = "governanceAddress";
pub const ADMIN_ADDRESS: &str = "adminAddress";
pub const SERVICE_NAME: &str = "serviceName";
pub const VOTING_THRESHOLD: &str = "votingThreshold";
pub const SIGNING_THRESHOLD: &str = "signingThreshold";
pub const CONFIRMATION_HEIGHT: &str = "confirmationHeight";
pub const MINIMUM_ROTATION_DELAY: &str = "minimumRotationDelay";
pub const DEPLOYMENT_METHOD: &str = "deploymentMethod";
pub const DEPOSIT_VALUE: &str = "depositValue";
pub const REWARD_AMOUNT: &str = "rewardAmount";
pub const RUN_AS_ACCOUNT: &str = "runAsAccount";
pub const BLOCK_EXPIRY: &str = "blockExpiry";
pub const REWARDS_DENOM: &str = "rewardsDenom";
pub const REWARD_EPOCH_DURATION: &str = "rewardEpochDuration";
pub const REWARDS_PER_EPOCH: &str = "rewardsPerEpoch";
pub const PARTICIPATION_THRESHOLD: &str = "participationThreshold";

pub const AXELAR_CHAIN_ID: &str = "axelarChainId";
pub const AXELAR_RPC: &str = "axelarRpc";
pub const ROUTER_ADDRESS: &str = "routerAddress";
pub const MULTISIG_ADDRESS: &str = "multisigAddress";
pub const COORDINATOR_ADDRESS: &str = "coordinatorAddress";
pub const REWARDS_ADDRESS: &str = "rewardsAddress";

pub const PREDICTED_GATEWAY_ADDRESS: &str = "predictedGatewayAddress";

pub const VOTING_VERIFIER_SALT: &str = "votingVerifierSalt";
pub const MULTISIG_PROVER_SALT: &str = "multisigProverSalt";
pub const GATEWAY_SALT: &str = "gatewaySalt";
pub const VOTING_VERIFIER_ARTIFACT: &str = "votingVerifierArtifact";
pub const MULTISIG_PROVER_ARTIFACT: &str = "multisigProverArtifact";
pub const GATEWAY_ARTIFACT: &str = "gatewayArtifact";

pub const VOTING_VERIFIER_ADDRESS: &str = "votingVerifierAddress";
pub const COSMWASM_GATEWAY_ADDRESS: &str = "cosmwasmGatewayAddress";
pub const MULTISIG_PROVER_ADDRESS: &str = "multisigProverAddress";

pub const REGISTER_CHAIN_OUTCOME: &str = "registerChainOutcome";
pub const AUTHORIZE_CALLERS_OUTCOME: &str = "authorizeCallersOutcome";
pub const REGISTER_PROVER_OUTCOME: &str = "registerProverOutcome";
pub const VOTING_VERIFIER_POOL_OUTCOME: &str = "votingVerifierPoolOutcome";
pub const MULTISIG_POOL_OUTCOME: &str = "multisigPoolOutcome";
pub const VOTING_VERIFIER_FUNDING_TX: &str = "votingVerifierFundingTx";
pub const MULTISIG_FUNDING_TX: &str = "multisigFundingTx";
/// `add_rewards` commands left to run once the pool proposals pass, one per line
pub const POOL_FUNDING_COMMANDS: &str = "poolFundingCommands";

pub const VERIFIER_SET_UPDATE_TX: &str = "verifierSetUpdateTx";
pub const VERIFIER_SET_ID: &str = "verifierSetId";

pub const GATEWAY_ADDRESS: &str = "gatewayAddress";

/// Fields never printed or logged in clear.
pub fn is_secret(name: &str) -> bool {
    name == SIGNING_CREDENTIAL
}

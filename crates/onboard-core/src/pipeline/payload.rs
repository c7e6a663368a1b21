//! Registry entries written for a new chain.

use serde_json::{Value, json};
use sha3::{Digest, Keccak256};

use crate::governance::EVM_MSG_ID_FORMAT;
use crate::profile::NetworkProfile;
use crate::state::{DeploymentState, field};

/// `chains.<chain>`
pub(super) fn chain_config(state: &DeploymentState) -> anyhow::Result<Value> {
    let chain = state.text(field::CHAIN_NAME)?;
    Ok(json!({
        "name": chain,
        "axelarId": chain,
        "chainId": state.number(field::CHAIN_ID)?,
        "rpc": state.text(field::RPC_URL)?,
        "tokenSymbol": state.text(field::TOKEN_SYMBOL)?,
        "decimals": 18,
        "confirmations": 1,
        "finality": "finalized",
        "approxFinalityWaitTime": 1,
        "chainType": "evm",
        "explorer": {
            "name": state.text(field::EXPLORER_NAME)?,
            "url": state.text(field::EXPLORER_URL)?,
        },
        "gasOptions": {
            "gasLimit": state.number(field::GAS_LIMIT)?,
        },
        "contracts": {},
    }))
}

/// `axelar.contracts.VotingVerifier.<chain>`
pub(super) fn voting_verifier(
    state: &DeploymentState,
    profile: &NetworkProfile,
) -> anyhow::Result<Value> {
    Ok(json!({
        "governanceAddress": profile.governance_address,
        "serviceName": profile.service_name,
        "sourceGatewayAddress": state.text(field::PREDICTED_GATEWAY_ADDRESS)?,
        "votingThreshold": profile.voting_threshold.to_json(),
        "blockExpiry": profile.block_expiry,
        "confirmationHeight": profile.confirmation_height,
        "msgIdFormat": EVM_MSG_ID_FORMAT,
        "addressFormat": "eip55",
    }))
}

/// `axelar.contracts.MultisigProver.<chain>`
pub(super) fn multisig_prover(
    state: &DeploymentState,
    profile: &NetworkProfile,
) -> anyhow::Result<Value> {
    let chain = state.text(field::CHAIN_NAME)?;
    let chain_id = state.number(field::CHAIN_ID)?;
    Ok(json!({
        "governanceAddress": profile.governance_address,
        "adminAddress": profile.admin_address,
        "destinationChainID": chain_id.to_string(),
        "signingThreshold": profile.signing_threshold.to_json(),
        "serviceName": profile.service_name,
        "verifierSetDiffThreshold": 0,
        "encoder": "abi",
        "keyType": "ecdsa",
        "domainSeparator": domain_separator(chain, state.text(field::ROUTER_ADDRESS)?, chain_id),
    }))
}

/// keccak256 of chain name, router address and little-endian chain id, hex encoded.
fn domain_separator(chain: &str, router_address: &str, chain_id: u64) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(chain.as_bytes());
    hasher.update(router_address.as_bytes());
    hasher.update(chain_id.to_le_bytes());
    hex::encode(hasher.finalize())
}

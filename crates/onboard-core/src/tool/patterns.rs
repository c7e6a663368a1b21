//! Output contracts of the external tools.
//!
//! Each pattern here is the only place a tool's stdout shape is encoded. If a
//! tool changes its output, the failure surfaces as an `Extraction` error
//! naming the pattern.

use std::sync::LazyLock;

use super::extract::OutputPattern;

/// `axelard keys show <wallet> -a`
pub static WALLET_ADDRESS: LazyLock<OutputPattern> = LazyLock::new(|| {
    OutputPattern::line("wallet address", r"(?m)^\s*(axelar1[0-9a-z]{38,})\s*$")
});

/// `deploy-amplifier-gateway.js --predictOnly`
pub static PREDICTED_GATEWAY_ADDRESS: LazyLock<OutputPattern> = LazyLock::new(|| {
    OutputPattern::line(
        "predicted gateway address",
        r"Predicted gateway proxy address:\s*(0x[0-9a-fA-F]{40})\b",
    )
});

/// `deploy-amplifier-gateway.js`
pub static DEPLOYED_GATEWAY_ADDRESS: LazyLock<OutputPattern> = LazyLock::new(|| {
    OutputPattern::line(
        "deployed gateway address",
        r"Deployed gateway proxy address:\s*(0x[0-9a-fA-F]{40})\b",
    )
});

/// `submit-proposal.js`
pub static PROPOSAL_ID: LazyLock<OutputPattern> =
    LazyLock::new(|| OutputPattern::line("proposal id", r"Proposal submitted:\s*(\d+)"));

/// `axelard tx ... --output json`
pub static TX_HASH: LazyLock<OutputPattern> =
    LazyLock::new(|| OutputPattern::json("transaction hash", "/txhash"));

/// `axelard tx ... --output json`; non-zero means the transaction was rejected.
pub static TX_CODE: LazyLock<OutputPattern> =
    LazyLock::new(|| OutputPattern::json("transaction code", "/code"));

pub static TX_RAW_LOG: LazyLock<OutputPattern> =
    LazyLock::new(|| OutputPattern::json("transaction log", "/raw_log"));

/// `axelard q wasm contract-state smart <prover> '"current_verifier_set"'`
pub static VERIFIER_SET_ID: LazyLock<OutputPattern> =
    LazyLock::new(|| OutputPattern::json("verifier set id", "/data/id"));

/// `deploy-contract.js instantiate -c <contract>`
pub fn instantiated_address(contract: &str) -> OutputPattern {
    OutputPattern::line(
        format!("{} address", contract),
        &format!(
            r"Instantiated {} at address:\s*(axelar1[0-9a-z]{{38,}})",
            regex::escape(contract)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "axelar1zlr7e5qf3sz7yf890rkh9tcnu87234k6k7ytd9";

    #[test]
    fn test_wallet_address_line() {
        assert_eq!(WALLET_ADDRESS.apply(&format!("{}\n", ADDR)), Some(ADDR.to_string()));
        assert_eq!(WALLET_ADDRESS.apply("Error: key not found"), None);
    }

    #[test]
    fn test_gateway_addresses() {
        let out = "Chain: foo-1\nPredicted gateway proxy address: 0x1234567890abcdef1234567890ABCDEF12345678\n";
        assert_eq!(
            PREDICTED_GATEWAY_ADDRESS.apply(out),
            Some("0x1234567890abcdef1234567890ABCDEF12345678".to_string())
        );
        assert_eq!(DEPLOYED_GATEWAY_ADDRESS.apply(out), None);
    }

    #[test]
    fn test_instantiated_address_is_per_contract() {
        let out = format!("Instantiated VotingVerifier at address: {}\n", ADDR);
        assert_eq!(
            instantiated_address("VotingVerifier").apply(&out),
            Some(ADDR.to_string())
        );
        assert_eq!(instantiated_address("MultisigProver").apply(&out), None);
    }

    #[test]
    fn test_transaction_json() {
        let out = r#"{"height":"0","txhash":"9F86D0","code":0,"raw_log":""}"#;
        assert_eq!(TX_HASH.apply(out), Some("9F86D0".to_string()));
        assert_eq!(TX_CODE.apply(out), Some("0".to_string()));
    }

    #[test]
    fn test_proposal_id() {
        assert_eq!(
            PROPOSAL_ID.apply("Proposal submitted: 117\n"),
            Some("117".to_string())
        );
    }
}

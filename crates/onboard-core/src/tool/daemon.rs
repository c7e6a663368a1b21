//! Chain daemon CLI adapter (`axelard`).

use serde_json::Value;

use super::patterns::{TX_CODE, TX_HASH, TX_RAW_LOG, WALLET_ADDRESS};
use super::runner::{ToolCommand, ToolInvoker, extract};
use super::{OutputPattern, daemon_command};
use crate::config::ToolsConfig;
use crate::error::OnboardError;

/// Address of the operator's keyring wallet.
pub fn wallet_address(invoker: &ToolInvoker<'_>, tools: &ToolsConfig) -> anyhow::Result<String> {
    let command = daemon_command(tools).args([
        "keys",
        "show",
        &tools.wallet,
        "-a",
        "--keyring-backend",
        &tools.keyring_backend,
    ]);
    let result = invoker.run_extract(&command, &WALLET_ADDRESS)?;
    Ok(result.extracted.unwrap_or_default())
}

/// Transactions and queries against one Axelar network.
pub struct DaemonClient<'a> {
    invoker: ToolInvoker<'a>,
    tools: &'a ToolsConfig,
    node: String,
    chain_id: String,
}

impl<'a> DaemonClient<'a> {
    pub fn new(
        invoker: ToolInvoker<'a>,
        tools: &'a ToolsConfig,
        node: impl Into<String>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            tools,
            node: node.into(),
            chain_id: chain_id.into(),
        }
    }

    /// The `tx wasm execute` command line for `msg` on `contract`.
    pub fn execute_command(
        &self,
        contract: &str,
        msg: &Value,
        funds: Option<&str>,
    ) -> ToolCommand {
        let mut command = daemon_command(self.tools).args([
            "tx",
            "wasm",
            "execute",
            contract,
            &msg.to_string(),
            "--from",
            &self.tools.wallet,
            "--keyring-backend",
            &self.tools.keyring_backend,
            "--node",
            &self.node,
            "--chain-id",
            &self.chain_id,
            "--gas",
            "auto",
            "--gas-adjustment",
            &self.tools.gas_adjustment,
            "--gas-prices",
            &self.tools.gas_prices,
        ]);
        if let Some(funds) = funds {
            command = command.args(["--amount", funds]);
        }
        command.args(["-y", "--output", "json"])
    }

    /// Execute `msg` on `contract` from the operator wallet; returns the tx hash.
    ///
    /// A broadcast the chain rejected (non-zero `code`) is a `Subprocess` error
    /// carrying the raw log.
    pub fn execute(
        &self,
        contract: &str,
        msg: &Value,
        funds: Option<&str>,
    ) -> anyhow::Result<String> {
        let command = self.execute_command(contract, msg, funds);
        let result = self.invoker.run(&command)?;
        check_tx_code(&command, &result.stdout)?;
        let result = extract(result, &TX_HASH, &command.display())?;
        let tx_hash = result.extracted.unwrap_or_default();
        tracing::info!(contract, tx_hash = %tx_hash, "transaction executed");
        Ok(tx_hash)
    }

    /// Smart query against `contract`, extracting `pattern` from the JSON reply.
    pub fn query(
        &self,
        contract: &str,
        query: &Value,
        pattern: &OutputPattern,
    ) -> anyhow::Result<String> {
        let command = daemon_command(self.tools).args([
            "q",
            "wasm",
            "contract-state",
            "smart",
            contract,
            &query.to_string(),
            "--node",
            &self.node,
            "--output",
            "json",
        ]);
        let result = self.invoker.run_extract(&command, pattern)?;
        Ok(result.extracted.unwrap_or_default())
    }
}

fn check_tx_code(command: &ToolCommand, stdout: &str) -> anyhow::Result<()> {
    match TX_CODE.apply(stdout) {
        Some(code) if code != "0" => Err(OnboardError::Subprocess {
            command: command.display(),
            status: format!("transaction code {}", code),
            stderr: TX_RAW_LOG.apply(stdout).unwrap_or_default(),
        }
        .into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{CommandRunner, ExternalCommandResult};
    use serde_json::json;
    use std::cell::RefCell;

    struct Replay {
        stdout: String,
        seen: RefCell<Vec<ToolCommand>>,
    }

    impl CommandRunner for Replay {
        fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
            self.seen.borrow_mut().push(command.clone());
            Ok(ExternalCommandResult::success(self.stdout.clone()))
        }
    }

    fn replay(stdout: &str) -> Replay {
        Replay {
            stdout: stdout.to_string(),
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_wallet_address() {
        let runner = replay("axelar1zlr7e5qf3sz7yf890rkh9tcnu87234k6k7ytd9\n");
        let tools = ToolsConfig::default();
        let address = wallet_address(&ToolInvoker::new(&runner), &tools).unwrap();
        assert_eq!(address, "axelar1zlr7e5qf3sz7yf890rkh9tcnu87234k6k7ytd9");
        assert!(runner.seen.borrow()[0].has_arg("amplifier"));
    }

    #[test]
    fn test_execute_returns_hash_and_passes_funds() {
        let runner = replay(r#"{"txhash":"ABCDEF","code":0,"raw_log":""}"#);
        let tools = ToolsConfig::default();
        let client = DaemonClient::new(
            ToolInvoker::new(&runner),
            &tools,
            "http://localhost:26657",
            "axelar-devnet",
        );

        let hash = client
            .execute("axelar1rewards", &json!({"add_rewards": {}}), Some("100uaxl"))
            .unwrap();

        assert_eq!(hash, "ABCDEF");
        let seen = runner.seen.borrow();
        assert!(seen[0].has_arg("--amount"));
        assert!(seen[0].has_arg("100uaxl"));
        assert!(seen[0].has_arg(r#"{"add_rewards":{}}"#));
    }

    #[test]
    fn test_rejected_transaction_is_subprocess_error() {
        let runner = replay(r#"{"txhash":"ABCDEF","code":5,"raw_log":"insufficient funds"}"#);
        let tools = ToolsConfig::default();
        let client = DaemonClient::new(ToolInvoker::new(&runner), &tools, "n", "c");

        let err = client
            .execute("axelar1router", &json!({}), None)
            .unwrap_err();
        assert!(OnboardError::is_subprocess(&err));
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_query_extracts_pointer() {
        let runner = replay(r#"{"data":{"id":"0xabc","threshold":"1"}}"#);
        let tools = ToolsConfig::default();
        let client = DaemonClient::new(ToolInvoker::new(&runner), &tools, "n", "c");
        let id = client
            .query(
                "axelar1prover",
                &json!("current_verifier_set"),
                &crate::tool::patterns::VERIFIER_SET_ID,
            )
            .unwrap();
        assert_eq!(id, "0xabc");
    }
}

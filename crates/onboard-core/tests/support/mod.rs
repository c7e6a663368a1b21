#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use onboard_core::artifact::{ArtifactFetcher, CHECKSUM_MANIFEST, ContractArtifact};
use onboard_core::config::OnboardConfig;
use onboard_core::context::OnboardContext;
use onboard_core::prompt::Answer;
use onboard_core::tool::{CommandRunner, ExternalCommandResult, ToolCommand};

pub const WALLET: &str = "axelar1zlr7e5qf3sz7yf890rkh9tcnu87234k6k7ytd9";
pub const GOVERNANCE: &str = "axelar1gfnmqy6lhjhtmmq2e6jqzn9yq0t4zwjlnqsxkx";
pub const PREDICTED: &str = "0x5fb1d2c8f0b6f1e7a9c3f4e2d1a0b9c8d7e6f5a4";
pub const CREDENTIAL: &str = "0xABCDEF0123456789";

/// Instantiated address the fake scripts report for `contract`.
pub fn contract_address(contract: &str) -> String {
    let fill = match contract {
        "VotingVerifier" => 'v',
        "Gateway" => 'g',
        "MultisigProver" => 'p',
        other => panic!("unexpected contract {}", other),
    };
    format!("axelar1{}", fill.to_string().repeat(38))
}

/// Answers the chain daemon and deployment scripts the way the real tools do.
pub struct FakeTools {
    commands: RefCell<Vec<ToolCommand>>,
    next_proposal: Cell<u32>,
    next_tx: Cell<u32>,
    deployed_gateway: String,
    fail_on: Option<String>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            next_proposal: Cell::new(1),
            next_tx: Cell::new(1),
            deployed_gateway: PREDICTED.to_string(),
            fail_on: None,
        }
    }

    /// Report a different gateway address at deployment time.
    pub fn deploying_gateway_at(mut self, address: &str) -> Self {
        self.deployed_gateway = address.to_string();
        self
    }

    /// Number the next submitted proposal `id`.
    pub fn with_first_proposal(self, id: u32) -> Self {
        self.next_proposal.set(id);
        self
    }

    /// Fail any command carrying `arg`.
    pub fn failing_on(mut self, arg: &str) -> Self {
        self.fail_on = Some(arg.to_string());
        self
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.commands.borrow().clone()
    }

    pub fn count(&self, arg: &str) -> usize {
        self.commands.borrow().iter().filter(|c| c.has_arg(arg)).count()
    }

    fn value_after<'c>(command: &'c ToolCommand, flag: &str) -> &'c str {
        command
            .args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| command.args.get(i + 1))
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn stdout(&self, command: &ToolCommand) -> String {
        let first = command.args.first().map(String::as_str).unwrap_or_default();
        match first {
            "keys" => format!("{}\n", WALLET),
            "tx" => {
                let n = self.next_tx.get();
                self.next_tx.set(n + 1);
                json!({"txhash": format!("TX{:04}", n), "code": 0, "raw_log": ""}).to_string()
            }
            "q" => json!({"data": {"id": "0xgenesis", "threshold": "1"}}).to_string(),
            "evm/deploy-amplifier-gateway.js" => {
                if command.has_arg("--predictOnly") {
                    format!("Predicted gateway proxy address: {}\n", PREDICTED)
                } else {
                    format!(
                        "Deploying...\nDeployed gateway proxy address: {}\n",
                        self.deployed_gateway
                    )
                }
            }
            "cosmwasm/deploy-contract.js" => match command.args.get(1).map(String::as_str) {
                Some("upload") => "Uploaded code\n".to_string(),
                _ => {
                    let contract = Self::value_after(command, "-c");
                    format!(
                        "Instantiated {} at address: {}\n",
                        contract,
                        contract_address(contract)
                    )
                }
            },
            "cosmwasm/submit-proposal.js" => {
                let n = self.next_proposal.get();
                self.next_proposal.set(n + 1);
                format!("Proposal submitted: {}\n", n)
            }
            other => panic!("unexpected command {}", other),
        }
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, command: &ToolCommand) -> anyhow::Result<ExternalCommandResult> {
        self.commands.borrow_mut().push(command.clone());
        if self.fail_on.as_deref().is_some_and(|arg| command.has_arg(arg)) {
            return Ok(ExternalCommandResult::failure(1, "Error: connection refused"));
        }
        Ok(ExternalCommandResult::success(self.stdout(command)))
    }
}

fn wasm_bytes(file_name: &str) -> Vec<u8> {
    format!("\0asm {}", file_name).into_bytes()
}

/// Serves release binaries and matching checksum manifests.
#[derive(Default)]
pub struct FakeReleases {
    fetched: RefCell<Vec<String>>,
}

impl FakeReleases {
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl ArtifactFetcher for FakeReleases {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.fetched.borrow_mut().push(url.to_string());
        let contract = ContractArtifact::ALL
            .into_iter()
            .find(|c| url.contains(&format!("/{}/", c.dir_name())))
            .ok_or_else(|| anyhow::anyhow!("no release at {}", url))?;

        if url.ends_with(CHECKSUM_MANIFEST) {
            let digest = hex::encode(Sha256::digest(wasm_bytes(contract.file_name())));
            Ok(format!("{}  {}\n", digest, contract.file_name()).into_bytes())
        } else {
            Ok(wasm_bytes(contract.file_name()))
        }
    }
}

/// Salt the fake releases yield for `contract`.
pub fn salt_for(contract: ContractArtifact) -> String {
    hex::encode(Sha256::digest(wasm_bytes(contract.file_name())))
}

/// A registry document shaped like the shared `<environment>.json` files.
pub fn registry_document(governance: Option<&str>) -> Value {
    let mut service_registry = json!({ "address": "axelar1serviceregistry" });
    if let Some(account) = governance {
        service_registry["governanceAccount"] = json!(account);
    }
    json!({
        "chains": {
            "ethereum": { "name": "Ethereum", "axelarId": "ethereum", "chainId": 1 }
        },
        "axelar": {
            "chainId": "axelar-devnet-1",
            "rpc": "http://127.0.0.1:26657",
            "contracts": {
                "ServiceRegistry": service_registry,
                "Router": { "address": "axelar1router" },
                "Multisig": { "address": "axelar1multisig" },
                "Coordinator": { "address": "axelar1coordinator" },
                "Rewards": { "address": "axelar1rewards" },
                "VotingVerifier": {},
                "MultisigProver": {},
                "Gateway": {}
            }
        }
    })
}

/// Temporary workspace with a deployments directory and isolated cache.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("deployments")).unwrap();
        Self { temp }
    }

    pub fn write_registry(&self, environment: &str, document: &Value) -> PathBuf {
        let path = self.registry_path(environment);
        let text = serde_json::to_string_pretty(document).unwrap();
        std::fs::write(&path, format!("{}\n", text)).unwrap();
        path
    }

    pub fn registry_path(&self, environment: &str) -> PathBuf {
        self.temp
            .path()
            .join("deployments")
            .join(format!("{}.json", environment))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.temp.path().join("onboard-checkpoint.json")
    }

    pub fn context(&self) -> OnboardContext {
        let config = OnboardConfig {
            deployments_dir: PathBuf::from("deployments"),
            ..OnboardConfig::default()
        };
        OnboardContext::new(config, self.temp.path().to_path_buf()).with_cache_dir("cache")
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Everything asked after the environment has been chosen.
pub fn chain_answers(credential_attempts: &[&str]) -> Vec<Answer> {
    let mut answers = vec![
        Answer::text("foo-1"),
        Answer::text("4242"),
        Answer::text("FOO"),
        Answer::Default,
        Answer::text("https://rpc.foo.test"),
        Answer::text("Fooscan"),
        Answer::text("https://scan.foo.test"),
        Answer::text("v1.0.0"),
        Answer::text("v1.1.0"),
        Answer::text("v1.0.2"),
    ];
    answers.extend(credential_attempts.iter().map(|a| Answer::text(*a)));
    answers
}

/// A fresh run on the custom environment `devnet-foo`.
pub fn custom_run_answers() -> Vec<Answer> {
    let mut answers = vec![Answer::Select(4), Answer::text("devnet-foo")];
    answers.extend(chain_answers(&[CREDENTIAL]));
    answers
}

/// A fresh run on `testnet`.
pub fn testnet_run_answers() -> Vec<Answer> {
    let mut answers = vec![Answer::Select(1)];
    answers.extend(chain_answers(&[CREDENTIAL]));
    answers
}

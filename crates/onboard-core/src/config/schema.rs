//! Configuration schema for onboard.toml
//!
//! Every key is optional; a missing file behaves like an empty one.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ARTIFACT_BASE_URL: &str = "https://static.axelar.network/releases/cosmwasm";

/// Root configuration structure for onboard.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnboardConfig {
    /// Directory holding the `<environment>.json` registry documents
    #[serde(default = "default_deployments_dir")]
    pub deployments_dir: PathBuf,

    /// Working directory for the deployment scripts
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,

    /// Where the deployment checkpoint is written
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,

    /// Artifact download cache (defaults to the user cache directory)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Release index the contract artifacts are downloaded from
    #[serde(default = "default_artifact_base_url")]
    pub artifact_base_url: String,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// How external tools are invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Chain daemon CLI binary
    #[serde(default = "default_daemon")]
    pub daemon: String,

    /// Interpreter for the deployment scripts
    #[serde(default = "default_script_runner")]
    pub script_runner: String,

    #[serde(default = "default_keyring_backend")]
    pub keyring_backend: String,

    /// Keyring entry used for direct execution
    #[serde(default = "default_wallet")]
    pub wallet: String,

    #[serde(default = "default_gas_prices")]
    pub gas_prices: String,

    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: String,
}

impl Default for OnboardConfig {
    fn default() -> Self {
        Self {
            deployments_dir: default_deployments_dir(),
            scripts_dir: default_scripts_dir(),
            checkpoint_path: default_checkpoint_path(),
            cache_dir: None,
            artifact_base_url: default_artifact_base_url(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            daemon: default_daemon(),
            script_runner: default_script_runner(),
            keyring_backend: default_keyring_backend(),
            wallet: default_wallet(),
            gas_prices: default_gas_prices(),
            gas_adjustment: default_gas_adjustment(),
        }
    }
}

impl OnboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.artifact_base_url.starts_with("http://")
            || self.artifact_base_url.starts_with("https://"))
        {
            anyhow::bail!(
                "artifact_base_url must be an http(s) URL, got '{}'",
                self.artifact_base_url
            );
        }
        for (key, value) in [
            ("tools.daemon", &self.tools.daemon),
            ("tools.script_runner", &self.tools.script_runner),
            ("tools.wallet", &self.tools.wallet),
            ("tools.keyring_backend", &self.tools.keyring_backend),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", key);
            }
        }
        Ok(())
    }
}

fn default_deployments_dir() -> PathBuf {
    PathBuf::from("axelar-chains-config").join("info")
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("onboard-checkpoint.json")
}

fn default_artifact_base_url() -> String {
    DEFAULT_ARTIFACT_BASE_URL.to_string()
}

fn default_daemon() -> String {
    "axelard".to_string()
}

fn default_script_runner() -> String {
    "ts-node".to_string()
}

fn default_keyring_backend() -> String {
    "test".to_string()
}

fn default_wallet() -> String {
    "amplifier".to_string()
}

fn default_gas_prices() -> String {
    "0.007uaxl".to_string()
}

fn default_gas_adjustment() -> String {
    "1.5".to_string()
}

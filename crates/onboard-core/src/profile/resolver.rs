//! Compiled-in profiles for well-known environments and the dynamic
//! derivation for custom ones.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{DeploymentMethod, Environment, EnvironmentClass, NetworkProfile, Threshold};
use crate::registry::ConfigDocument;

/// Registry field reused as every administrative address on custom environments.
pub const GOVERNANCE_ACCOUNT_PATH: [&str; 4] =
    ["axelar", "contracts", "ServiceRegistry", "governanceAccount"];

/// Governance module account of the shared networks.
const GOV_MODULE_ACCOUNT: &str = "axelar10d07y265gmmuvt4z0w9aw880jnsr700j7v9daj";

const REWARDS_DENOM: &str = "uaxl";
const BLOCK_EXPIRY: u64 = 10;
const CONFIRMATION_HEIGHT: u64 = 1;

const MAJORITY: Threshold = Threshold::new(51, 100);
const SUPERMAJORITY: Threshold = Threshold::new(2, 3);
const PARTICIPATION: Threshold = Threshold::new(7, 10);

/// Resolves an [`Environment`] to its [`NetworkProfile`].
#[derive(Debug, Clone)]
pub struct NetworkProfileResolver {
    deployments_dir: PathBuf,
}

impl NetworkProfileResolver {
    pub fn new(deployments_dir: impl Into<PathBuf>) -> Self {
        Self {
            deployments_dir: deployments_dir.into(),
        }
    }

    pub fn deployments_dir(&self) -> &Path {
        &self.deployments_dir
    }

    /// `<deployments_dir>/<environment>.json`
    pub fn registry_path(&self, environment: &Environment) -> PathBuf {
        self.deployments_dir
            .join(format!("{}.json", environment.id()))
    }

    /// Return the profile for `environment`.
    ///
    /// Well-known environments never touch the filesystem. Custom ones read
    /// the governance account from their registry document and fail with
    /// `NotFound` when it is absent.
    pub fn resolve(&self, environment: &Environment) -> anyhow::Result<NetworkProfile> {
        self.resolve_from(environment, &self.registry_path(environment))
    }

    /// Like [`resolve`](Self::resolve), but custom environments read `registry`
    /// instead of the document under the deployments directory.
    pub fn resolve_from(
        &self,
        environment: &Environment,
        registry: &Path,
    ) -> anyhow::Result<NetworkProfile> {
        let profile = match known_profile(environment) {
            Some(profile) => profile,
            None => {
                let document = ConfigDocument::load(registry)?;
                derive_custom(environment, &document)?
            }
        };
        tracing::info!(
            environment = %environment,
            class = profile.class.as_str(),
            governance = %profile.governance_address,
            "network profile resolved"
        );
        Ok(profile)
    }
}

/// Build a custom profile from an already loaded registry document.
pub(crate) fn derive_custom(
    environment: &Environment,
    document: &ConfigDocument,
) -> anyhow::Result<NetworkProfile> {
    let governance = document
        .lookup_str(&GOVERNANCE_ACCOUNT_PATH)
        .with_context(|| {
            format!(
                "Cannot derive a profile for custom environment '{}' without a governance account",
                environment
            )
        })?;

    Ok(NetworkProfile {
        environment: environment.id().to_string(),
        class: EnvironmentClass::AdHoc,
        governance_address: governance.clone(),
        admin_address: governance,
        service_name: "validators".to_string(),
        voting_threshold: MAJORITY,
        signing_threshold: MAJORITY,
        confirmation_height: CONFIRMATION_HEIGHT,
        minimum_rotation_delay: 0,
        deployment_method: DeploymentMethod::Create,
        deposit_value: "100000000".to_string(),
        reward_amount: format!("1000000{}", REWARDS_DENOM),
        run_as_account: None,
        block_expiry: BLOCK_EXPIRY,
        rewards_denom: REWARDS_DENOM.to_string(),
        reward_epoch_duration: 10,
        rewards_per_epoch: 100,
        participation_threshold: PARTICIPATION,
    })
}

fn known_profile(environment: &Environment) -> Option<NetworkProfile> {
    let base = |governance: &str, admin: &str| NetworkProfile {
        environment: environment.id().to_string(),
        class: environment.class(),
        governance_address: governance.to_string(),
        admin_address: admin.to_string(),
        service_name: "amplifier".to_string(),
        voting_threshold: MAJORITY,
        signing_threshold: MAJORITY,
        confirmation_height: CONFIRMATION_HEIGHT,
        minimum_rotation_delay: 0,
        deployment_method: DeploymentMethod::Create3,
        deposit_value: "100000000".to_string(),
        reward_amount: format!("1000000{}", REWARDS_DENOM),
        run_as_account: None,
        block_expiry: BLOCK_EXPIRY,
        rewards_denom: REWARDS_DENOM.to_string(),
        reward_epoch_duration: 600,
        rewards_per_epoch: 100,
        participation_threshold: PARTICIPATION,
    };

    let profile = match environment {
        Environment::Mainnet => NetworkProfile {
            voting_threshold: SUPERMAJORITY,
            signing_threshold: SUPERMAJORITY,
            minimum_rotation_delay: 86400,
            deposit_value: "2000000000".to_string(),
            reward_amount: format!("1000000000{}", REWARDS_DENOM),
            reward_epoch_duration: 14845,
            rewards_per_epoch: 1_690_910_000,
            ..base(
                GOV_MODULE_ACCOUNT,
                "axelar1pczf792wf3p3xssk4dmwfxrh6hcqnrjp70danj",
            )
        },
        Environment::Testnet => NetworkProfile {
            minimum_rotation_delay: 3600,
            deposit_value: "2000000000".to_string(),
            ..base(
                GOV_MODULE_ACCOUNT,
                "axelar17qafmnc4hrfa96cq37wg5l68sxh354pj6eky35",
            )
        },
        Environment::Stagenet => {
            let governance = "axelar1pumrull7z8y5kc9q4azfrmcaxd8w0779kg6anm";
            NetworkProfile {
                minimum_rotation_delay: 300,
                run_as_account: Some(governance.to_string()),
                ..base(governance, "axelar1l7vz4m5g92kvga050vk9ycjynywdlk4zhs07dv")
            }
        }
        Environment::DevnetAmplifier => {
            let governance = "axelar1zlr7e5qf3sz7yf890rkh9tcnu87234k6k7ytd9";
            NetworkProfile {
                service_name: "validators".to_string(),
                reward_epoch_duration: 100,
                run_as_account: Some(governance.to_string()),
                ..base(governance, "axelar1lsasewgqj7698e9a25v3c9kkzweee9cvejq5cs")
            }
        }
        Environment::Custom(_) => return None,
    };
    Some(profile)
}

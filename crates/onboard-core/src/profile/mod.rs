//! Network profiles: the per-environment parameter bundle fixed for a run.

mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use resolver::{GOVERNANCE_ACCOUNT_PATH, NetworkProfileResolver};

use crate::error::OnboardError;
use crate::state::{DeploymentState, field};
use crate::validate::{InputKind, validate};

/// Deployment target. The first four are well known; anything else is a
/// custom ad hoc environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Environment {
    Mainnet,
    Testnet,
    Stagenet,
    DevnetAmplifier,
    Custom(String),
}

impl Environment {
    /// Every well-known environment, most critical first.
    pub const KNOWN: [Environment; 4] = [
        Environment::Mainnet,
        Environment::Testnet,
        Environment::Stagenet,
        Environment::DevnetAmplifier,
    ];

    /// Parse an identifier. Unknown identifiers become [`Environment::Custom`].
    pub fn parse(id: &str) -> Result<Self, OnboardError> {
        let id = validate(InputKind::EnvironmentId, id)?;
        Ok(match id.as_str() {
            "mainnet" => Environment::Mainnet,
            "testnet" => Environment::Testnet,
            "stagenet" => Environment::Stagenet,
            "devnet-amplifier" => Environment::DevnetAmplifier,
            _ => Environment::Custom(id),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Environment::Mainnet => "mainnet",
            Environment::Testnet => "testnet",
            Environment::Stagenet => "stagenet",
            Environment::DevnetAmplifier => "devnet-amplifier",
            Environment::Custom(id) => id,
        }
    }

    pub fn class(&self) -> EnvironmentClass {
        match self {
            Environment::Mainnet => EnvironmentClass::Production,
            Environment::Testnet | Environment::Stagenet | Environment::DevnetAmplifier => {
                EnvironmentClass::SharedTest
            }
            Environment::Custom(_) => EnvironmentClass::AdHoc,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Governance policy tier of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentClass {
    Production,
    SharedTest,
    AdHoc,
}

impl EnvironmentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentClass::Production => "production",
            EnvironmentClass::SharedTest => "sharedTest",
            EnvironmentClass::AdHoc => "adHoc",
        }
    }

    /// Shared environments change protocol state only through governance.
    pub fn requires_proposal(&self) -> bool {
        match self {
            EnvironmentClass::Production | EnvironmentClass::SharedTest => true,
            EnvironmentClass::AdHoc => false,
        }
    }
}

impl FromStr for EnvironmentClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(EnvironmentClass::Production),
            "sharedTest" => Ok(EnvironmentClass::SharedTest),
            "adHoc" => Ok(EnvironmentClass::AdHoc),
            other => anyhow::bail!("Unknown environment class '{}'", other),
        }
    }
}

/// A fraction such as a voting threshold. Written as `n/d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    numerator: u64,
    denominator: u64,
}

impl Threshold {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Contract message form: `["n", "d"]`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.numerator.to_string(), self.denominator.to_string()])
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Threshold {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (n, d) = s
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("Threshold '{}' must look like n/d", s))?;
        let numerator: u64 = n.trim().parse()?;
        let denominator: u64 = d.trim().parse()?;
        if denominator == 0 || numerator == 0 || numerator > denominator {
            anyhow::bail!("Threshold '{}' must satisfy 0 < n <= d", s);
        }
        Ok(Self::new(numerator, denominator))
    }
}

impl Serialize for Threshold {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How the external gateway contract is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMethod {
    Create,
    Create2,
    Create3,
}

impl DeploymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMethod::Create => "create",
            DeploymentMethod::Create2 => "create2",
            DeploymentMethod::Create3 => "create3",
        }
    }
}

impl FromStr for DeploymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(DeploymentMethod::Create),
            "create2" => Ok(DeploymentMethod::Create2),
            "create3" => Ok(DeploymentMethod::Create3),
            other => anyhow::bail!("Unknown deployment method '{}'", other),
        }
    }
}

/// Parameters fixed for the whole run. Built once by
/// [`NetworkProfileResolver::resolve`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub environment: String,
    pub class: EnvironmentClass,
    pub governance_address: String,
    pub admin_address: String,
    pub service_name: String,
    pub voting_threshold: Threshold,
    pub signing_threshold: Threshold,
    pub confirmation_height: u64,
    /// Seconds between verifier set rotations
    pub minimum_rotation_delay: u64,
    pub deployment_method: DeploymentMethod,
    /// Proposal deposit in the base denomination
    pub deposit_value: String,
    /// Initial funding per reward pool, e.g. `1000000uaxl`
    pub reward_amount: String,
    /// Account the proposal executes as, for networks that need one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_account: Option<String>,
    pub block_expiry: u64,
    pub rewards_denom: String,
    pub reward_epoch_duration: u64,
    pub rewards_per_epoch: u64,
    pub participation_threshold: Threshold,
}

impl NetworkProfile {
    /// Names of any required text fields that are blank.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        let mut blank = Vec::new();
        for (name, value) in [
            ("environment", &self.environment),
            ("governanceAddress", &self.governance_address),
            ("adminAddress", &self.admin_address),
            ("serviceName", &self.service_name),
            ("depositValue", &self.deposit_value),
            ("rewardAmount", &self.reward_amount),
            ("rewardsDenom", &self.rewards_denom),
        ] {
            if value.trim().is_empty() {
                blank.push(name);
            }
        }
        if self.run_as_account.as_deref().is_some_and(|a| a.trim().is_empty()) {
            blank.push("runAsAccount");
        }
        blank
    }

    /// Write every profile field into `state`.
    pub fn record_into(&self, state: &mut DeploymentState) -> anyhow::Result<()> {
        state.set(field::GOVERNANCE_ADDRESS, self.governance_address.as_str())?;
        state.set(field::ADMIN_ADDRESS, self.admin_address.as_str())?;
        state.set(field::SERVICE_NAME, self.service_name.as_str())?;
        state.set(field::VOTING_THRESHOLD, self.voting_threshold.to_string())?;
        state.set(field::SIGNING_THRESHOLD, self.signing_threshold.to_string())?;
        state.set(field::CONFIRMATION_HEIGHT, self.confirmation_height)?;
        state.set(field::MINIMUM_ROTATION_DELAY, self.minimum_rotation_delay)?;
        state.set(field::DEPLOYMENT_METHOD, self.deployment_method.as_str())?;
        state.set(field::DEPOSIT_VALUE, self.deposit_value.as_str())?;
        state.set(field::REWARD_AMOUNT, self.reward_amount.as_str())?;
        if let Some(run_as) = &self.run_as_account {
            state.set(field::RUN_AS_ACCOUNT, run_as.as_str())?;
        }
        state.set(field::BLOCK_EXPIRY, self.block_expiry)?;
        state.set(field::REWARDS_DENOM, self.rewards_denom.as_str())?;
        state.set(field::REWARD_EPOCH_DURATION, self.reward_epoch_duration)?;
        state.set(field::REWARDS_PER_EPOCH, self.rewards_per_epoch)?;
        state.set(
            field::PARTICIPATION_THRESHOLD,
            self.participation_threshold.to_string(),
        )?;
        Ok(())
    }

    /// Rebuild the profile recorded by [`NetworkProfile::record_into`].
    pub fn from_state(state: &DeploymentState) -> anyhow::Result<Self> {
        Ok(Self {
            environment: state.text(field::ENVIRONMENT)?.to_string(),
            class: state.text(field::ENVIRONMENT_CLASS)?.parse()?,
            governance_address: state.text(field::GOVERNANCE_ADDRESS)?.to_string(),
            admin_address: state.text(field::ADMIN_ADDRESS)?.to_string(),
            service_name: state.text(field::SERVICE_NAME)?.to_string(),
            voting_threshold: state.text(field::VOTING_THRESHOLD)?.parse()?,
            signing_threshold: state.text(field::SIGNING_THRESHOLD)?.parse()?,
            confirmation_height: state.number(field::CONFIRMATION_HEIGHT)?,
            minimum_rotation_delay: state.number(field::MINIMUM_ROTATION_DELAY)?,
            deployment_method: state.text(field::DEPLOYMENT_METHOD)?.parse()?,
            deposit_value: state.text(field::DEPOSIT_VALUE)?.to_string(),
            reward_amount: state.text(field::REWARD_AMOUNT)?.to_string(),
            run_as_account: state.optional_text(field::RUN_AS_ACCOUNT).map(str::to_string),
            block_expiry: state.number(field::BLOCK_EXPIRY)?,
            rewards_denom: state.text(field::REWARDS_DENOM)?.to_string(),
            reward_epoch_duration: state.number(field::REWARD_EPOCH_DURATION)?,
            rewards_per_epoch: state.number(field::REWARDS_PER_EPOCH)?,
            participation_threshold: state.text(field::PARTICIPATION_THRESHOLD)?.parse()?,
        })
    }
}

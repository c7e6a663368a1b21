//! Contract artifact acquisition.
//!
//! A release is `<base>/<contract-dir>/<version>/` holding the `.wasm` binary
//! and a `checksums.txt` manifest. The manifest token for the binary doubles as
//! the instantiation salt, so addresses are deterministic per (contract, version).

mod fetch;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sha2::{Digest, Sha256};

pub use fetch::{ArtifactFetcher, HttpFetcher};

use crate::error::OnboardError;
use crate::registry::write_atomic;
use crate::validate::{InputKind, validate};

pub const CHECKSUM_MANIFEST: &str = "checksums.txt";

/// The contracts deployed per chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractArtifact {
    VotingVerifier,
    MultisigProver,
    Gateway,
}

impl ContractArtifact {
    pub const ALL: [ContractArtifact; 3] = [
        ContractArtifact::VotingVerifier,
        ContractArtifact::Gateway,
        ContractArtifact::MultisigProver,
    ];

    /// Name used by the deployment scripts and the registry document.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractArtifact::VotingVerifier => "VotingVerifier",
            ContractArtifact::MultisigProver => "MultisigProver",
            ContractArtifact::Gateway => "Gateway",
        }
    }

    /// Release directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ContractArtifact::VotingVerifier => "voting-verifier",
            ContractArtifact::MultisigProver => "multisig-prover",
            ContractArtifact::Gateway => "gateway",
        }
    }

    /// Canonical binary file name, as listed in the manifest.
    pub fn file_name(&self) -> &'static str {
        match self {
            ContractArtifact::VotingVerifier => "voting_verifier.wasm",
            ContractArtifact::MultisigProver => "multisig_prover.wasm",
            ContractArtifact::Gateway => "gateway.wasm",
        }
    }
}

impl fmt::Display for ContractArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}

/// A downloaded, verified artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredArtifact {
    pub contract: ContractArtifact,
    pub version: String,
    /// Cache directory holding the binary, as passed to the upload script
    pub artifact_dir: PathBuf,
    pub binary_path: PathBuf,
    pub checksum_manifest_path: PathBuf,
    /// Manifest checksum token, used verbatim
    pub salt: String,
}

/// Resolves versions to local, checksum-verified artifacts.
pub struct ArtifactAcquirer<'a> {
    base_url: String,
    cache_dir: PathBuf,
    fetcher: &'a dyn ArtifactFetcher,
}

impl<'a> ArtifactAcquirer<'a> {
    pub fn new(
        base_url: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
        fetcher: &'a dyn ArtifactFetcher,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
            fetcher,
        }
    }

    /// `<base>/<dir>/<version>/<file>`
    pub fn release_url(&self, contract: ContractArtifact, version: &str, file: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            contract.dir_name(),
            version,
            file
        )
    }

    /// Download (or reuse from cache) the binary and manifest for `contract`.
    ///
    /// Without a version this fails with `Unsupported`: resolving "latest" from
    /// the release index is not available.
    pub fn acquire(
        &self,
        contract: ContractArtifact,
        version: Option<&str>,
    ) -> anyhow::Result<AcquiredArtifact> {
        let Some(version) = version else {
            return Err(OnboardError::Unsupported(format!(
                "Resolving the latest {} release is not supported; supply an explicit version (e.g. v1.0.0)",
                contract
            ))
            .into());
        };
        let version = validate(InputKind::Version, version)?;

        let binary_url = self.release_url(contract, &version, contract.file_name());
        let manifest_url = self.release_url(contract, &version, CHECKSUM_MANIFEST);
        let dir = self.cache_dir.join("artifacts").join(cache_key(&binary_url));

        let manifest_path = dir.join(CHECKSUM_MANIFEST);
        let binary_path = dir.join(contract.file_name());

        self.ensure_cached(&manifest_url, &manifest_path)?;
        let manifest = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let salt = salt_from_manifest(&manifest, contract.file_name())
            .with_context(|| format!("Manifest at {}", manifest_url))?;

        self.ensure_cached(&binary_url, &binary_path)?;
        if let Err(err) = verify_sha256(&binary_path, &salt) {
            // Never leave a bad binary in the cache.
            let _ = std::fs::remove_file(&binary_path);
            return Err(err);
        }

        tracing::info!(%contract, %version, salt = %salt, "artifact ready");
        Ok(AcquiredArtifact {
            contract,
            version,
            artifact_dir: dir,
            binary_path,
            checksum_manifest_path: manifest_path,
            salt,
        })
    }

    fn ensure_cached(&self, url: &str, dest: &Path) -> anyhow::Result<()> {
        if dest.exists() {
            tracing::debug!(url, "using cached artifact");
            return Ok(());
        }
        let bytes = self.fetcher.fetch(url)?;
        // Only complete downloads may appear under the cached name.
        write_atomic(dest, &bytes).with_context(|| format!("Failed to cache {}", url))
    }
}

/// Find the checksum token for `file_name` in a `<checksum>  <file>` manifest.
pub fn salt_from_manifest(manifest: &str, file_name: &str) -> anyhow::Result<String> {
    manifest
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let checksum = parts.next()?;
            let name = parts.next()?;
            // sha256sum marks binary mode with a leading '*'
            let name = name.strip_prefix('*').unwrap_or(name);
            (name == file_name).then(|| checksum.to_string())
        })
        .next()
        .ok_or_else(|| {
            OnboardError::NotFound(format!("checksum entry for {}", file_name)).into()
        })
}

fn verify_sha256(path: &Path, expected: &str) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let actual = hex::encode(Sha256::digest(&bytes));
    if !actual.eq_ignore_ascii_case(expected) {
        anyhow::bail!(
            "Checksum mismatch for {}: manifest says {}, file hashes to {}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

/// Cache key from URL: first 16 bytes of the blake3 hash.
fn cache_key(url: &str) -> String {
    let hash = blake3::hash(url.as_bytes());
    hash.to_hex()[..32].to_string()
}

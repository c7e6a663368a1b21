//! Shared registry document (`<environment>.json`).
//!
//! The orchestrator only appends: each chain is inserted into a table at most
//! once, and an insert that would replace an existing entry fails before the
//! file is touched. Instantiated contract addresses are added to the chain's
//! entry the same way.

mod document;

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

pub use document::ConfigDocument;
pub(crate) use document::{write_atomic, write_json_atomic};

use crate::error::OnboardError;
use document::load_json_map;

/// A chain-keyed table in the registry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTable {
    Chains,
    VotingVerifier,
    MultisigProver,
    Gateway,
}

impl ChainTable {
    /// Path of the table's parent object.
    pub fn section(&self) -> &'static [&'static str] {
        match self {
            ChainTable::Chains => &["chains"],
            ChainTable::VotingVerifier => &["axelar", "contracts", "VotingVerifier"],
            ChainTable::MultisigProver => &["axelar", "contracts", "MultisigProver"],
            ChainTable::Gateway => &["axelar", "contracts", "Gateway"],
        }
    }
}

impl fmt::Display for ChainTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.section().join("."))
    }
}

/// Insert `payload` under `chain` in `table` and write the document back.
///
/// Fails with `NotFound` when the table's section is absent and with
/// `Duplicate` when the chain already has an entry; in both cases the file is
/// left byte-for-byte unchanged.
pub fn insert_chain(
    doc_path: &Path,
    table: ChainTable,
    chain: &str,
    payload: Value,
) -> anyhow::Result<()> {
    let mut root = load_json_map(doc_path)?;
    let section = table_mut(&mut root, table, doc_path)?;

    if section.contains_key(chain) {
        return Err(OnboardError::Duplicate {
            table: table.to_string(),
            chain: chain.to_string(),
        }
        .into());
    }

    section.insert(chain.to_string(), payload);
    write_json_atomic(doc_path, &root)?;

    tracing::info!(%table, chain, path = %doc_path.display(), "registry entry inserted");
    Ok(())
}

/// `chains.<chain>`
pub fn insert_chain_config(doc_path: &Path, chain: &str, payload: Value) -> anyhow::Result<()> {
    insert_chain(doc_path, ChainTable::Chains, chain, payload)
}

/// `axelar.contracts.VotingVerifier.<chain>`
pub fn insert_voting_verifier(
    doc_path: &Path,
    chain: &str,
    payload: Value,
) -> anyhow::Result<()> {
    insert_chain(doc_path, ChainTable::VotingVerifier, chain, payload)
}

/// `axelar.contracts.MultisigProver.<chain>`
pub fn insert_multisig_prover(
    doc_path: &Path,
    chain: &str,
    payload: Value,
) -> anyhow::Result<()> {
    insert_chain(doc_path, ChainTable::MultisigProver, chain, payload)
}

/// Set `address` on the chain's entry in `table`, creating the entry if absent.
///
/// Recording the same address again is a no-op. A different address already
/// on the entry fails with `Duplicate` and leaves the file unchanged.
pub fn record_address(
    doc_path: &Path,
    table: ChainTable,
    chain: &str,
    address: &str,
) -> anyhow::Result<()> {
    let mut root = load_json_map(doc_path)?;
    let section = table_mut(&mut root, table, doc_path)?;

    let entry = section
        .entry(chain.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            anyhow::anyhow!("Entry '{}.{}' in {} is not an object", table, chain, doc_path.display())
        })?;

    match entry.get("address").and_then(Value::as_str) {
        Some(existing) if existing == address => return Ok(()),
        Some(existing) => {
            let err = anyhow::Error::new(OnboardError::Duplicate {
                table: table.to_string(),
                chain: chain.to_string(),
            });
            return Err(err.context(format!(
                "{} of {} is recorded at {}, refusing to replace it with {}",
                table, chain, existing, address
            )));
        }
        None => {}
    }

    entry.insert("address".to_string(), Value::String(address.to_string()));
    write_json_atomic(doc_path, &root)?;

    tracing::info!(%table, chain, address, "contract address recorded");
    Ok(())
}

fn table_mut<'a>(
    root: &'a mut Map<String, Value>,
    table: ChainTable,
    doc_path: &Path,
) -> anyhow::Result<&'a mut Map<String, Value>> {
    section_mut(root, table.section()).map_err(|missing| {
        anyhow::Error::new(OnboardError::NotFound(format!(
            "section '{}' in {} (document predates the expected schema)",
            missing,
            doc_path.display()
        )))
    })
}

fn section_mut<'a>(
    root: &'a mut Map<String, Value>,
    path: &[&str],
) -> Result<&'a mut Map<String, Value>, String> {
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        current = current
            .get_mut(*segment)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| path[..=idx].join("."))?;
    }
    Ok(current)
}

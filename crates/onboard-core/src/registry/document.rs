//! Read access to the shared `<environment>.json` registry document.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::error::OnboardError;

/// A parsed registry document. Reads only; inserts go through
/// [`super::insert_chain`], which reloads the file itself.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Load the document. A missing file is a `NotFound` error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let root = load_json_map(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Value at a dotted section path, or `NotFound` naming the first missing segment.
    pub fn lookup(&self, path: &[&str]) -> anyhow::Result<&Value> {
        lookup_in(&self.root, path).map_err(|missing| {
            OnboardError::NotFound(format!(
                "'{}' in {}",
                missing,
                self.path.display()
            ))
            .into()
        })
    }

    /// Non-empty string at `path`.
    pub fn lookup_str(&self, path: &[&str]) -> anyhow::Result<String> {
        match self.lookup(path)? {
            Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
            _ => Err(OnboardError::NotFound(format!(
                "non-empty string at '{}' in {}",
                path.join("."),
                self.path.display()
            ))
            .into()),
        }
    }
}

/// Walk `path`, returning the dotted prefix that is missing on failure.
fn lookup_in<'a>(
    root: &'a Map<String, Value>,
    path: &[&str],
) -> Result<&'a Value, String> {
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        let value = current
            .get(*segment)
            .ok_or_else(|| path[..=idx].join("."))?;
        if idx == path.len() - 1 {
            return Ok(value);
        }
        current = value.as_object().ok_or_else(|| path[..=idx].join("."))?;
    }
    Err(String::new())
}

pub(crate) fn load_json_map(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        return Err(OnboardError::NotFound(format!(
            "registry document {}",
            path.display()
        ))
        .into());
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read registry document: {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse registry document: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Expected JSON object at root: {}", path.display()),
    }
}

/// Write atomically (tmp + rename), 2-space indented with a trailing newline.
pub(crate) fn write_json_atomic(path: &Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

/// Write `bytes` to a sibling temp file and rename it over `path`, so readers
/// see either the old content or the complete new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", path.display()))?
        .to_string_lossy();
    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    std::fs::write(&tmp_path, bytes)
        .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(temp: &TempDir, value: Value) -> PathBuf {
        let path = temp.path().join("devnet-foo.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = ConfigDocument::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(OnboardError::is_not_found(&err));
    }

    #[test]
    fn test_lookup_names_missing_section() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, json!({"axelar": {"contracts": {}}}));
        let doc = ConfigDocument::load(&path).unwrap();

        let err = doc
            .lookup(&["axelar", "contracts", "Router", "address"])
            .unwrap_err();
        assert!(OnboardError::is_not_found(&err));
        assert!(err.to_string().contains("axelar.contracts.Router"));
    }

    #[test]
    fn test_lookup_str_rejects_empty() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, json!({"axelar": {"rpc": ""}}));
        let doc = ConfigDocument::load(&path).unwrap();
        assert!(doc.lookup_str(&["axelar", "rpc"]).is_err());
    }

    #[test]
    fn test_non_object_root_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, json!([1, 2, 3]));
        assert!(ConfigDocument::load(&path).is_err());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");
        write_json_atomic(&path, &json!({"b": 1, "a": 2})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(content.contains("  \"b\": 1"));
        // insertion order preserved
        assert!(content.find("\"b\"").unwrap() < content.find("\"a\"").unwrap());

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::config::{OnboardConfig, ToolsConfig};
use crate::profile::{Environment, NetworkProfileResolver};
use crate::state::CheckpointStore;

/// Paths and settings shared by every command.
///
/// Relative paths from the configuration are resolved against `base_dir`
/// (the working directory of the CLI).
#[derive(Debug, Clone)]
pub struct OnboardContext {
    config: OnboardConfig,
    base_dir: PathBuf,
    checkpoint_path: PathBuf,
    cache_dir: PathBuf,
}

impl OnboardContext {
    pub fn new(config: OnboardConfig, base_dir: PathBuf) -> Self {
        let checkpoint_path = base_dir.join(&config.checkpoint_path);
        let cache_dir = match &config.cache_dir {
            Some(dir) => base_dir.join(dir),
            None => dirs::cache_dir()
                .map(|p| p.join("onboard"))
                .unwrap_or_else(|| base_dir.join(".onboard-cache")),
        };
        Self {
            config,
            base_dir,
            checkpoint_path,
            cache_dir,
        }
    }

    /// Override the checkpoint location (`--checkpoint`).
    pub fn with_checkpoint_path(mut self, path: impl AsRef<Path>) -> Self {
        self.checkpoint_path = self.base_dir.join(path);
        self
    }

    /// Override the artifact cache (for testing).
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = self.base_dir.join(dir);
        self
    }

    pub fn config(&self) -> &OnboardConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolsConfig {
        &self.config.tools
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn deployments_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.deployments_dir)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.scripts_dir)
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn artifact_base_url(&self) -> &str {
        &self.config.artifact_base_url
    }

    /// `<deployments_dir>/<environment>.json`
    pub fn registry_path(&self, environment: &Environment) -> PathBuf {
        self.resolver().registry_path(environment)
    }

    pub fn resolver(&self) -> NetworkProfileResolver {
        NetworkProfileResolver::new(self.deployments_dir())
    }

    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.checkpoint_path)
    }
}

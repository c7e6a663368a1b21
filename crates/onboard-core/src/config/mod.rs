//! Orchestrator configuration
//!
//! Lookup order for onboard.toml:
//! - `--config <path>` (must exist)
//! - `./onboard.toml`
//! - `<config dir>/onboard/onboard.toml`
//! - built-in defaults

pub mod parser;
pub mod schema;

use std::path::{Path, PathBuf};

pub use parser::{parse_onboard_toml, parse_onboard_toml_str};
pub use schema::{OnboardConfig, ToolsConfig};

pub const CONFIG_FILE_NAME: &str = "onboard.toml";

/// A loaded configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: OnboardConfig,
    pub source: Option<PathBuf>,
}

/// Load configuration following the documented lookup order.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(LoadedConfig {
            config: parse_onboard_toml(path)?,
            source: Some(path.to_path_buf()),
        });
    }

    let candidates = [
        Some(cwd.join(CONFIG_FILE_NAME)),
        dirs::config_dir().map(|dir| dir.join("onboard").join(CONFIG_FILE_NAME)),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "loading configuration");
            return Ok(LoadedConfig {
                config: parse_onboard_toml(&candidate)?,
                source: Some(candidate),
            });
        }
    }

    Ok(LoadedConfig {
        config: OnboardConfig::new(),
        source: None,
    })
}

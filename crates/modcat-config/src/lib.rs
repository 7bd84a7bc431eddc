//! Configuration file handling for modcat.
//!
//! Loads `.modcat.toml` from a directory, falling back to defaults when the
//! file is absent, and resolves the handful of settings the environment is
//! allowed to override.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".modcat.toml";

/// Default outer-tier concurrency cap (repositories in flight).
pub const DEFAULT_OUTER_CONCURRENCY: usize = 20;
/// Default inner-tier concurrency cap (releases per repository in flight).
pub const DEFAULT_INNER_CONCURRENCY: usize = 100;
/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cache";

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Complete modcat configuration, merged from `.modcat.toml` and the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The GitHub organization to ingest.
    pub organization: String,
    /// Outer-tier concurrency cap (§5): repositories processed at once.
    pub outer_concurrency: usize,
    /// Inner-tier concurrency cap (§5): releases per repository at once.
    pub inner_concurrency: usize,
    /// Directory containing `graphql.json` and `modules.json` (§4.6).
    pub cache_dir: PathBuf,
    /// §9 Open Question 1: require release tags to match `^\d+-.+$` before
    /// deep validation. Default `true` — see DESIGN.md for the rationale.
    pub require_numeric_tag_prefix: bool,
    /// Overrides the built-in reserved module-name set when non-empty.
    #[serde(default)]
    pub reserved_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: String::new(),
            outer_concurrency: DEFAULT_OUTER_CONCURRENCY,
            inner_concurrency: DEFAULT_INNER_CONCURRENCY,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            require_numeric_tag_prefix: true,
            reserved_names: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graphql_snapshot_path(&self) -> PathBuf {
        self.cache_dir.join("graphql.json")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.cache_dir.join("modules.json")
    }
}

/// Load configuration from `<dir>/.modcat.toml`, applying environment
/// overrides for `outer_concurrency`/`inner_concurrency` on top. Missing
/// file yields `Config::default()` with those same overrides applied.
pub fn load_config(dir: &Path) -> Result<Config> {
    let mut config = load_config_from_file(&config_path(dir))?;
    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn load_config_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(value) = parse_env_usize("MODCAT_OUTER_CONCURRENCY") {
        config.outer_concurrency = value;
    }
    if let Some(value) = parse_env_usize("MODCAT_INNER_CONCURRENCY") {
        config.inner_concurrency = value;
    }
}

fn parse_env_usize(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse the `REPO` environment variable per §6: either `owner/name` or a
/// bare `name`, in which case `organization` supplies the owner.
pub fn parse_repo_env(value: &str, organization: &str) -> (String, String) {
    match value.split_once('/') {
        Some((owner, name)) => (owner.to_string(), name.to_string()),
        None => (organization.to_string(), value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.outer_concurrency, DEFAULT_OUTER_CONCURRENCY);
        assert_eq!(config.inner_concurrency, DEFAULT_INNER_CONCURRENCY);
        assert!(config.require_numeric_tag_prefix);
    }

    #[test]
    fn loads_overrides_from_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(
            config_path(dir.path()),
            "organization = \"kernelsu-modules\"\nouter_concurrency = 5\nrequire_numeric_tag_prefix = false\n",
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.organization, "kernelsu-modules");
        assert_eq!(config.outer_concurrency, 5);
        assert!(!config.require_numeric_tag_prefix);
    }

    #[test]
    fn bare_repo_name_uses_configured_organization() {
        assert_eq!(
            parse_repo_env("my-module", "kernelsu-modules"),
            ("kernelsu-modules".to_string(), "my-module".to_string())
        );
    }

    #[test]
    fn owner_slash_name_overrides_organization() {
        assert_eq!(
            parse_repo_env("someone-else/their-module", "kernelsu-modules"),
            ("someone-else".to_string(), "their-module".to_string())
        );
    }
}

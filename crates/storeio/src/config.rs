//! Connector configuration surface (spec §6) plus a `toml`-based loader
//! used by the crate's example binary and integration tests, mirroring
//! how the teacher loads `fraiseql.toml`.

use std::path::Path;

use serde::Deserialize;

/// Per-operation Read configuration (spec §6 "For Read").
#[derive(Debug, Clone, Deserialize)]
pub struct ReadConfig {
    /// Textual GQL. A full structured `Query` is constructed
    /// programmatically, not from a config file — see
    /// [`crate::read::QuerySource`].
    pub gql_query: String,
    #[serde(default)]
    pub num_query_splits: i32,
    pub read_time: Option<String>,
}

/// Per-operation Write/Delete configuration (spec §6 "For Write/Delete").
#[derive(Debug, Clone, Deserialize)]
pub struct WriteConfig {
    #[serde(default = "default_true")]
    pub throttle_rampup: bool,
    #[serde(default = "default_hint_num_workers")]
    pub hint_num_workers: u32,
}

fn default_true() -> bool {
    true
}

fn default_hint_num_workers() -> u32 {
    storeio_core::rampup::DEFAULT_HINT_NUM_WORKERS
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { throttle_rampup: true, hint_num_workers: default_hint_num_workers() }
    }
}

/// Everything the core consumes from its embedder (spec §6 "Configuration
/// surface").
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
    pub namespace: Option<String>,
    pub localhost: Option<String>,
    #[serde(default)]
    pub read: Option<ReadConfig>,
    #[serde(default)]
    pub write: WriteConfig,
}

/// Errors loading or parsing a `ConnectorConfig` from a TOML file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads a [`ConnectorConfig`] from a TOML file on disk.
pub fn load_from_toml(path: impl AsRef<Path>) -> Result<ConnectorConfig, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Read { path: path.display().to_string(), source })?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

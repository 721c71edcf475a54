//! Engine configuration.
//!
//! All fields have serde defaults so a partial (or absent) TOML file
//! yields a working configuration. Persistence belongs to the embedding
//! application; this module only loads and validates.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

fn default_max_processes() -> usize {
    30
}
fn default_thread_count_top_n() -> usize {
    10
}
fn default_container_storage_prefixes() -> Vec<String> {
    vec![
        "/var/lib/docker".to_string(),
        "/var/lib/containers".to_string(),
    ]
}
fn default_disk_health_tool() -> String {
    "smartctl".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rows kept from the CPU-sorted process table.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,

    /// How many of the top processes get a per-pid thread listing. Each
    /// costs one gateway round trip.
    #[serde(default = "default_thread_count_top_n")]
    pub thread_count_top_n: usize,

    /// Mountpoint prefixes classified as container storage.
    #[serde(default = "default_container_storage_prefixes")]
    pub container_storage_prefixes: Vec<String>,

    /// Analysis tool probed before the disk-health section is collected.
    #[serde(default = "default_disk_health_tool")]
    pub disk_health_tool: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_processes: default_max_processes(),
            thread_count_top_n: default_thread_count_top_n(),
            container_storage_prefixes: default_container_storage_prefixes(),
            disk_health_tool: default_disk_health_tool(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

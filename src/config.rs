//! Bridge configuration module
//!
//! Handles loading and parsing of bridge configuration from files and environment variables.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::protocol::buffer::MAX_PACKET_SIZE;
use crate::protocol::revision::{ProtocolRevision, RevisionRegistry, KNOWN_REVISIONS};

/// Smallest accepted packet size limit (1 KiB)
const MIN_PACKET_SIZE_LIMIT: usize = 1024;

/// Largest accepted packet size limit (64 MiB)
const MAX_PACKET_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Path to the configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Protocol revisions clients may connect with
    #[serde(default = "default_supported_revisions")]
    pub supported_revisions: Vec<ProtocolRevision>,

    /// Revisions that already use canonical runtime ids
    #[serde(default = "default_current_revisions")]
    pub current_revisions: Vec<ProtocolRevision>,

    /// Directory holding one `<revision>.json` palette per legacy revision
    #[serde(default = "default_palette_path")]
    pub palette_path: PathBuf,

    /// Largest inbound packet payload accepted, in bytes
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

// Default value functions
fn default_supported_revisions() -> Vec<ProtocolRevision> {
    KNOWN_REVISIONS.to_vec()
}

fn default_current_revisions() -> Vec<ProtocolRevision> {
    vec![ProtocolRevision::CANONICAL]
}

fn default_palette_path() -> PathBuf {
    PathBuf::from("./data/palettes")
}

fn default_max_packet_size() -> usize {
    MAX_PACKET_SIZE
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/bridge.toml"),
            supported_revisions: default_supported_revisions(),
            current_revisions: default_current_revisions(),
            palette_path: default_palette_path(),
            max_packet_size: default_max_packet_size(),
            debug: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from file and environment variables
    pub async fn load() -> Result<Self> {
        // Determine config path from environment or use default
        let config_path = env::var("BRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/bridge.toml"));

        let mut config = Self::read(&config_path).await?;

        // Override with environment variables
        config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = tokio::fs::read_to_string(config_path)
                .await
                .with_context(|| {
                    format!("Failed to read config file: {}", config_path.display())
                })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.config_path = config_path.to_path_buf();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key/value source
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("BRIDGE_PALETTE_PATH") {
            self.palette_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("BRIDGE_SUPPORTED_REVISIONS") {
            match parse_revisions(&val) {
                Some(revisions) => self.supported_revisions = revisions,
                None => tracing::warn!(
                    value = %val,
                    "Ignoring malformed BRIDGE_SUPPORTED_REVISIONS"
                ),
            }
        }
        if let Some(val) = lookup("BRIDGE_CURRENT_REVISIONS") {
            match parse_revisions(&val) {
                Some(revisions) => self.current_revisions = revisions,
                None => tracing::warn!(
                    value = %val,
                    "Ignoring malformed BRIDGE_CURRENT_REVISIONS"
                ),
            }
        }
        if let Some(val) = lookup("BRIDGE_MAX_PACKET_SIZE") {
            if let Ok(size) = val.parse() {
                self.max_packet_size = size;
            }
        }
        if let Some(val) = lookup("BRIDGE_DEBUG") {
            self.debug = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.supported_revisions.is_empty() {
            anyhow::bail!("At least one supported revision is required");
        }
        if self.current_revisions.is_empty() {
            anyhow::bail!("At least one current revision is required");
        }
        if let Some(stray) = self
            .current_revisions
            .iter()
            .find(|rev| !self.supported_revisions.contains(*rev))
        {
            anyhow::bail!("Current revision {} is not a supported revision", stray);
        }

        if self.max_packet_size < MIN_PACKET_SIZE_LIMIT
            || self.max_packet_size > MAX_PACKET_SIZE_LIMIT
        {
            anyhow::bail!("Max packet size must be between 1 KiB and 64 MiB");
        }

        Ok(())
    }

    /// Build the revision registry described by this configuration
    pub fn revision_registry(&self) -> Result<RevisionRegistry> {
        RevisionRegistry::new(
            self.supported_revisions.iter().copied(),
            self.current_revisions.iter().copied(),
        )
        .context("Invalid revision configuration")
    }
}

/// Parse a comma-separated revision list such as `"685, 712"`
fn parse_revisions(value: &str) -> Option<Vec<ProtocolRevision>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().ok().map(ProtocolRevision::new))
        .collect()
}

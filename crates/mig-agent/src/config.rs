//! Configuration management for the MIG agent
//!
//! Supports layered loading with precedence: environment variables
//! (`MIGMESH_` prefix) over a configuration file over built-in defaults.

use crate::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for an embedding MIG agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name of the node this agent reconciles
    pub node_name: String,

    /// Seconds between reconciliation passes
    pub reconcile_interval_seconds: u64,

    /// Use the mock device client instead of real hardware
    pub mock: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_name: "localhost".to_string(),
            reconcile_interval_seconds: 10,
            mock: false,
        }
    }
}

impl AgentConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables with `MIGMESH_` prefix (highest)
    /// 2. Configuration file (`MIGMESH_CONFIG`, else common locations)
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Ok(config_path) = std::env::var("MIGMESH_CONFIG") {
            builder = builder.add_source(config::File::with_name(&config_path).required(false));
        } else {
            for path in &["./migmesh.yaml", "/etc/migmesh/config.yaml"] {
                builder = builder.add_source(config::File::with_name(path).required(false));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("MIGMESH").try_parsing(true),
        );

        let parsed: Self = builder.build()?.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path.into()));

        let parsed: Self = builder.build()?.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.node_name.is_empty() {
            return Err(AgentError::configuration("node name must not be empty"));
        }
        if self.reconcile_interval_seconds == 0 {
            return Err(AgentError::configuration(
                "reconcile interval must be at least one second",
            ));
        }
        Ok(())
    }
}

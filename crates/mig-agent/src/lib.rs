//! # mig-agent
//!
//! The hardware-adapter seam for migmesh.
//!
//! This crate provides:
//! - [`MigClient`]: the async device-client trait the hardware driver layer
//!   implements (create/delete MIG devices)
//! - [`MockMigClient`]: an in-memory client for tests and dry runs
//! - [`PlanExecutor`]: walks a [`mig_state::MigConfigPlan`] through a
//!   client, deletes before creates, and reports a per-operation summary
//! - [`AgentConfig`]: file/env layered agent configuration
//!
//! The planning core never talks to hardware; this crate is where plans
//! turn into device calls, and the only place in migmesh that logs.
//!
//! ## Example
//!
//! ```rust
//! use mig_agent::{MockMigClient, PlanExecutor};
//! use mig_state::MigConfigPlan;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = PlanExecutor::new(MockMigClient::new());
//! let summary = executor.apply(&MigConfigPlan::default()).await?;
//! assert!(summary.is_complete());
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod client;
pub mod config;
pub mod executor;

// Re-export commonly used types
pub use client::{ClientCall, MigClient, MockMigClient};
pub use config::AgentConfig;
pub use executor::{ExecutionSummary, PlanExecutor};

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur in the agent layer
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("MIG client error: {0}")]
    Client(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("core error: {0}")]
    Core(#[from] mig_core::Error),

    #[error("state error: {0}")]
    State(#[from] mig_state::StateError),
}

impl AgentError {
    /// Create a client error
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

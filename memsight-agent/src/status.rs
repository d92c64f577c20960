//! Agent status reporting.

use std::sync::Arc;

use memsight_common::status_key;
use serde::{Deserialize, Serialize};

use crate::sink::SinkError;

/// Agent status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Agent name.
    pub agent: String,
    /// Agent version.
    pub version: String,
    /// Current status ("running" or "error").
    pub status: String,
    /// Additional metadata.
    #[serde(flatten)]
    pub metadata: serde_json::Value,
}

impl AgentStatus {
    /// Create a new status with "running" state.
    pub fn running(agent: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            version: version.into(),
            status: "running".to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Create a status with "error" state.
    pub fn error(
        agent: impl Into<String>,
        version: impl Into<String>,
        stage: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            version: version.into(),
            status: "error".to_string(),
            metadata: serde_json::json!({ "stage": stage, "error": error.into() }),
        }
    }

    /// Add metadata to the status.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Publishes status messages to `<key_prefix>/@/status`.
pub struct StatusPublisher {
    session: Arc<zenoh::Session>,
    key: String,
    agent: String,
    version: String,
}

impl StatusPublisher {
    pub fn new(
        session: Arc<zenoh::Session>,
        key_prefix: &str,
        agent: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            session,
            key: status_key(key_prefix),
            agent: agent.into(),
            version: version.into(),
        }
    }

    /// Publish "running" status with metadata.
    pub async fn publish_running(&self, metadata: serde_json::Value) -> Result<(), SinkError> {
        let status = AgentStatus::running(&self.agent, &self.version).with_metadata(metadata);
        self.publish(&status).await
    }

    /// Publish "error" status.
    pub async fn publish_error(&self, stage: &str, error: impl Into<String>) -> Result<(), SinkError> {
        let status = AgentStatus::error(&self.agent, &self.version, stage, error);
        self.publish(&status).await
    }

    async fn publish(&self, status: &AgentStatus) -> Result<(), SinkError> {
        let payload =
            serde_json::to_vec(status).map_err(|e| SinkError::Serialization(e.to_string()))?;

        self.session
            .put(&self.key, payload)
            .await
            .map_err(|e| SinkError::Transport(format!("{}: {}", self.key, e)))
    }
}

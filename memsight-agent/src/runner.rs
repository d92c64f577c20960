//! Agent lifecycle: session setup, status reporting and the sampling loop.

use std::sync::Arc;

use memsight_common::connect;

use crate::config::{AgentConfig, Settings};
use crate::error::AgentError;
use crate::grace::GraceController;
use crate::publisher::MetricPublisher;
use crate::sampler::{Sampler, host_source};
use crate::scheduler::Scheduler;
use crate::sink::ZenohSink;
use crate::status::StatusPublisher;

/// Owns the Zenoh session and the resolved settings of a running agent.
///
/// Handles:
/// - Settings resolution
/// - Zenoh connection (credentials are checked here, before any tick)
/// - Status publishing
/// - Running the scheduler until a fatal error
pub struct AgentRunner {
    /// Agent name for logging and status.
    name: String,
    /// Agent version.
    version: String,
    /// Immutable runtime settings.
    settings: Settings,
    /// Zenoh session.
    session: Arc<zenoh::Session>,
}

impl AgentRunner {
    /// Resolve settings and connect to Zenoh.
    pub async fn new(name: impl Into<String>, config: &AgentConfig) -> Result<Self, AgentError> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION").to_string();

        let settings = config.settings()?;

        tracing::info!(agent = %name, version = %version, "Starting agent");

        let session = Arc::new(connect(&config.zenoh).await?);

        Ok(Self {
            name,
            version,
            settings,
            session,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Arc<zenoh::Session> {
        &self.session
    }

    /// Status metadata describing this agent.
    pub fn metadata(&self) -> serde_json::Value {
        let settings = &self.settings;
        serde_json::json!({
            "source": settings.source,
            "namespace": settings.namespace,
            "period_secs": settings.period.as_secs(),
            "unit": settings.unit.as_str(),
            "grace": settings.grace,
            "dimensions": settings.dimensions,
        })
    }

    /// Run the sampling loop until it fails.
    ///
    /// Publishes "running" status before the first tick and, best-effort,
    /// "error" status once the loop stops. Always returns the fatal error.
    pub async fn run(self) -> AgentError {
        let settings = self.settings.clone();
        let status = StatusPublisher::new(
            self.session.clone(),
            &settings.key_prefix,
            &self.name,
            &self.version,
        );

        if let Err(e) = status.publish_running(self.metadata()).await {
            tracing::warn!(error = %e, "Failed to publish running status");
        }

        let sink = ZenohSink::new(
            self.session.clone(),
            &settings.key_prefix,
            &settings.source,
            settings.format,
        );
        tracing::info!(key = %sink.key_for(&settings.namespace), "Publishing memory metrics");

        let scheduler = Scheduler::new(
            settings.period,
            Sampler::new(host_source()),
            MetricPublisher::new(sink, &settings.namespace, settings.unit, settings.dimensions),
            GraceController::new(settings.grace),
        );

        let Err(err) = scheduler.run().await;

        if let Err(e) = status.publish_error(err.stage(), err.to_string()).await {
            tracing::warn!(error = %e, "Failed to publish error status");
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "Error closing Zenoh session");
        }

        err
    }
}

//! Memory utilization agent.
//!
//! Samples host memory at a fixed period and publishes it to Zenoh. Exits
//! non-zero when the host cannot be read or when publishing keeps failing
//! beyond the configured grace count.

use anyhow::Result;
use memsight_common::{LoggingConfig, init_tracing};

use memsight_agent::args::AgentArgs;
use memsight_agent::config::AgentConfig;
use memsight_agent::error::AgentError;
use memsight_agent::runner::AgentRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = AgentArgs::parse();

    // Load configuration; logging falls back to defaults if that fails
    let config = AgentConfig::from_args(&args);
    let logging = match &config {
        Ok(config) => config.logging.clone(),
        Err(_) => LoggingConfig {
            level: args.log_level.clone().unwrap_or_else(|| "info".to_string()),
            ..LoggingConfig::default()
        },
    };
    init_tracing(&logging).map_err(|e| anyhow::anyhow!("{}", e))?;

    let config = config.map_err(|e| fatal(e.into()))?;

    let runner = AgentRunner::new("memsight-agent", &config)
        .await
        .map_err(fatal)?;

    Err(fatal(runner.run().await))
}

/// Log a fatal error with the label of the stage that failed.
fn fatal(err: AgentError) -> anyhow::Error {
    let stage = err.stage();
    tracing::error!(stage, error = %err, "fatal");
    anyhow::Error::new(err).context(stage)
}

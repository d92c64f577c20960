//! memsight Common Library
//!
//! This crate provides shared types and utilities for the memsight agent:
//!
//! - [`telemetry`] - Metric data model (`MetricRecord`, `MetricBatch`, `Unit`, `DimensionSet`)
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Shared configuration sections (Zenoh, logging)
//! - [`session`] - Zenoh session management
//! - [`keyexpr`] - Key expression builders and parsers
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod keyexpr;
pub mod serialization;
pub mod session;
pub mod telemetry;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, ZenohAuth, ZenohConfig};
pub use error::{Error, Result};
pub use keyexpr::{
    KEY_PREFIX, ParsedBatchKey, batch_key, parse_batch_key, sanitize_key, status_key,
    validate_key_prefix, validate_namespace,
};
pub use serialization::{Format, decode, decode_auto, encode};
pub use session::connect;
pub use telemetry::{Dimension, DimensionSet, MetricBatch, MetricRecord, Unit};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}

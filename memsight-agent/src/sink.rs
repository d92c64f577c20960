//! Remote metrics sink.

use std::future::Future;
use std::sync::Arc;

use memsight_common::{Format, MetricBatch, MetricRecord, batch_key, encode};
use thiserror::Error;

/// Error submitting a batch.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Destination of metric batches.
pub trait MetricSink {
    /// Submit all records of one tick in a single call.
    fn submit_batch(
        &self,
        namespace: &str,
        records: &[MetricRecord],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Publishes each batch as one Zenoh put on `<prefix>/<namespace>/<source>`.
#[derive(Clone, Debug)]
pub struct ZenohSink {
    session: Arc<zenoh::Session>,
    key_prefix: String,
    source: String,
    format: Format,
}

impl ZenohSink {
    pub fn new(
        session: Arc<zenoh::Session>,
        key_prefix: impl Into<String>,
        source: impl Into<String>,
        format: Format,
    ) -> Self {
        Self {
            session,
            key_prefix: key_prefix.into(),
            source: source.into(),
            format,
        }
    }

    /// Key expression batches of `namespace` are published on.
    pub fn key_for(&self, namespace: &str) -> String {
        batch_key(&self.key_prefix, namespace, &self.source)
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl MetricSink for ZenohSink {
    async fn submit_batch(
        &self,
        namespace: &str,
        records: &[MetricRecord],
    ) -> Result<(), SinkError> {
        let key = self.key_for(namespace);
        let batch = MetricBatch {
            namespace: namespace.to_string(),
            source: self.source.clone(),
            records: records.to_vec(),
        };

        let payload =
            encode(&batch, self.format).map_err(|e| SinkError::Serialization(e.to_string()))?;

        self.session
            .put(&key, payload)
            .await
            .map_err(|e| SinkError::Transport(format!("{}: {}", key, e)))
    }
}

//! Metric publishing.

use std::time::Instant;

use memsight_common::{DimensionSet, MetricRecord, Unit};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::sampler::Sample;
use crate::sink::{MetricSink, SinkError};
use crate::units::convert;

pub const MEMORY_UTILIZATION: &str = "MemoryUtilization";
pub const MEMORY_USED: &str = "MemoryUsed";
pub const MEMORY_AVAILABLE: &str = "MemoryAvailable";

/// A batch could not be submitted.
#[derive(Debug, Error)]
#[error("Failed to publish batch to {namespace}: {source}")]
pub struct PublishError {
    pub namespace: String,
    #[source]
    pub source: SinkError,
}

impl PublishError {
    pub fn new(namespace: impl Into<String>, source: SinkError) -> Self {
        Self {
            namespace: namespace.into(),
            source,
        }
    }
}

/// Turns samples into metric batches and submits them to a sink.
pub struct MetricPublisher<S> {
    sink: S,
    namespace: String,
    unit: Unit,
    dimensions: DimensionSet,
}

impl<S: MetricSink> MetricPublisher<S> {
    pub fn new(sink: S, namespace: impl Into<String>, unit: Unit, dimensions: DimensionSet) -> Self {
        Self {
            sink,
            namespace: namespace.into(),
            unit,
            dimensions,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build the three records of a sample, all stamped with `timestamp`.
    pub fn records(&self, sample: &Sample, timestamp: i64) -> Vec<MetricRecord> {
        vec![
            MetricRecord::new(
                MEMORY_UTILIZATION,
                timestamp,
                Unit::Percent,
                sample.utilization as f64,
            ),
            MetricRecord::new(
                MEMORY_USED,
                timestamp,
                self.unit,
                convert(self.unit, sample.used),
            ),
            MetricRecord::new(
                MEMORY_AVAILABLE,
                timestamp,
                self.unit,
                convert(self.unit, sample.free),
            ),
        ]
        .into_iter()
        .map(|record| record.with_dimensions(self.dimensions.clone()))
        .collect()
    }

    /// Publish one sample as a single batch.
    pub async fn publish(&self, sample: &Sample) -> Result<(), PublishError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let records = self.records(sample, timestamp);

        for record in &records {
            info!(
                metric = %record.name,
                timestamp = record.timestamp,
                unit = %record.unit,
                value = record.value,
                "metric"
            );
        }

        let start = Instant::now();
        let result = self.sink.submit_batch(&self.namespace, &records).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                debug!(namespace = %self.namespace, duration_ms, "put");
                Ok(())
            }
            Err(e) => {
                warn!(namespace = %self.namespace, duration_ms, error = %e, "put");
                Err(PublishError::new(&self.namespace, e))
            }
        }
    }
}

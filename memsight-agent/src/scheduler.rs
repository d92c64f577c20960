//! Fixed-period sampling loop.

use std::convert::Infallible;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use crate::error::AgentError;
use crate::grace::{Action, GraceController};
use crate::publisher::MetricPublisher;
use crate::sampler::{HostStatSource, Sampler};
use crate::sink::MetricSink;

/// Drives sample → publish → grace accounting once per period.
///
/// Ticks never overlap: the next tick is only awaited once the current one
/// has finished, and ticks missed while a slow publish was in flight are
/// not replayed.
pub struct Scheduler<H, S> {
    period: Duration,
    sampler: Sampler<H>,
    publisher: MetricPublisher<S>,
    grace: GraceController,
}

impl<H: HostStatSource, S: MetricSink> Scheduler<H, S> {
    pub fn new(
        period: Duration,
        sampler: Sampler<H>,
        publisher: MetricPublisher<S>,
        grace: GraceController,
    ) -> Self {
        Self {
            period,
            sampler,
            publisher,
            grace,
        }
    }

    pub fn grace(&self) -> &GraceController {
        &self.grace
    }

    pub fn publisher(&self) -> &MetricPublisher<S> {
        &self.publisher
    }

    /// Run ticks until a fatal error occurs.
    ///
    /// The first tick fires one period after the call.
    pub async fn run(mut self) -> Result<Infallible, AgentError> {
        info!(
            period_secs = self.period.as_secs_f64(),
            namespace = %self.publisher.namespace(),
            grace = self.grace.threshold(),
            "Starting memory sampler"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await?;
        }
    }

    /// Run a single tick.
    ///
    /// A host read failure is returned immediately without touching the
    /// failure count. A publish failure is only returned once the grace
    /// budget is exhausted.
    pub async fn tick(&mut self) -> Result<(), AgentError> {
        let sample = self.sampler.sample()?;
        debug!(
            total = sample.total,
            used = sample.used,
            free = sample.free,
            utilization = sample.utilization,
            "Sampled memory"
        );

        let outcome = self.publisher.publish(&sample).await;
        let action = self.grace.record(outcome.as_ref().map(|_| ()));

        match (action, outcome) {
            (Action::Abort, Err(last)) => Err(AgentError::GraceExhausted {
                failures: self.grace.consecutive_failures(),
                threshold: self.grace.threshold(),
                last,
            }),
            (_, Err(e)) => {
                error!(
                    failures = self.grace.consecutive_failures(),
                    threshold = self.grace.threshold(),
                    error = %e,
                    "put"
                );
                Ok(())
            }
            (_, Ok(())) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{HostStatError, MemoryReading};
    use crate::sink::SinkError;
    use memsight_common::{DimensionSet, MetricRecord, Unit};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Always reports the same memory figures, or fails when `fail` is set.
    struct FixedHost {
        reading: MemoryReading,
        fail: bool,
    }

    impl FixedHost {
        fn ok() -> Self {
            Self {
                reading: MemoryReading {
                    total: 1000,
                    used: 250,
                    free: 750,
                },
                fail: false,
            }
        }

        fn broken() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    impl HostStatSource for FixedHost {
        fn read_memory(&mut self) -> Result<MemoryReading, HostStatError> {
            if self.fail {
                Err(HostStatError::Read("meminfo unavailable".into()))
            } else {
                Ok(self.reading)
            }
        }
    }

    /// Replays scripted outcomes (true = success); succeeds once exhausted.
    ///
    /// Submit instants are shared so they stay readable after `run` has
    /// consumed the scheduler.
    #[derive(Default)]
    struct ScriptedSink {
        outcomes: Mutex<VecDeque<bool>>,
        calls: Arc<Mutex<Vec<Instant>>>,
        latency: Duration,
    }

    impl ScriptedSink {
        fn new(outcomes: &[bool]) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MetricSink for ScriptedSink {
        async fn submit_batch(
            &self,
            _namespace: &str,
            _records: &[MetricRecord],
        ) -> Result<(), SinkError> {
            self.calls.lock().unwrap().push(Instant::now());
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let ok = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
            if ok {
                Ok(())
            } else {
                Err(SinkError::Transport("unreachable".into()))
            }
        }
    }

    fn scheduler<H: HostStatSource>(
        host: H,
        sink: ScriptedSink,
        threshold: u64,
    ) -> Scheduler<H, ScriptedSink> {
        Scheduler::new(
            Duration::from_secs(5),
            Sampler::new(host),
            MetricPublisher::new(sink, "System/Linux", Unit::Bytes, DimensionSet::new()),
            GraceController::new(threshold),
        )
    }

    #[tokio::test]
    async fn test_tick_tolerates_failures_within_grace() {
        let mut scheduler = scheduler(
            FixedHost::ok(),
            ScriptedSink::new(&[false, false, true, false, false, false, false]),
            3,
        );

        for _ in 0..6 {
            scheduler.tick().await.unwrap();
        }
        assert_eq!(scheduler.grace().consecutive_failures(), 3);

        let err = scheduler.tick().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::GraceExhausted {
                failures: 4,
                threshold: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_host_error_is_fatal_immediately() {
        let mut scheduler = scheduler(FixedHost::broken(), ScriptedSink::new(&[]), 3);

        let err = scheduler.tick().await.unwrap_err();
        assert!(matches!(err, AgentError::HostStat(_)));
        assert_eq!(err.stage(), "memGet");

        // Nothing was published and the grace budget is untouched.
        assert!(scheduler.publisher().sink().calls().is_empty());
        assert_eq!(scheduler.grace().consecutive_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_grace_exhausted() {
        let start = Instant::now();
        let sink = ScriptedSink::new(&[false, false, false]);
        let result = scheduler(FixedHost::ok(), sink, 2).run().await;

        let Err(err) = result;
        assert!(matches!(err, AgentError::GraceExhausted { failures: 3, .. }));
        assert_eq!(err.stage(), "put");

        // Three ticks, one period apart, the first one period after start.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_publish_delays_next_tick() {
        let start = Instant::now();
        let sink = ScriptedSink {
            latency: Duration::from_secs(12),
            ..ScriptedSink::new(&[false, false, false])
        };
        let calls = Arc::clone(&sink.calls);

        let Err(err) = scheduler(FixedHost::ok(), sink, 2).run().await;
        assert!(matches!(err, AgentError::GraceExhausted { failures: 3, .. }));

        // First tick one period in; every later tick starts as soon as the
        // previous 12 s publish returns, with no burst of missed ticks.
        let offsets: Vec<u64> = calls
            .lock()
            .unwrap()
            .iter()
            .map(|at| (*at - start).as_secs())
            .collect();
        assert_eq!(offsets, vec![5, 17, 29]);
    }
}

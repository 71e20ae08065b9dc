//! Broker publish loop with throughput tracking

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use super::errors::PublishError;
use super::models::Player;
use super::telemetry::HarvestMetrics;

/// Destination for serialized records.
///
/// Trait seam mirroring `PageSource`: the publish loop is driven against
/// mocks in tests, `KafkaSink` in production.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Publish one record and wait for the broker's durable acknowledgment
    async fn publish(&self, player: &Player) -> Result<(), PublishError>;
}

/// rdkafka-backed sink publishing JSON payloads. The producer is created
/// with `acks=all`, so the send future resolves only after all in-sync
/// replicas confirmed the write.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn new(producer: FutureProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn publish(&self, player: &Player) -> Result<(), PublishError> {
        let payload =
            serde_json::to_vec(player).map_err(|e| PublishError::Serialize(e.to_string()))?;

        let record = FutureRecord::<(), _>::to(&self.topic).payload(&payload);
        self.producer
            .send(record, Timeout::Never)
            .await
            .map_err(|(e, _)| PublishError::Kafka(e.to_string()))?;
        Ok(())
    }
}

/// Rolling publish counter and timer
#[derive(Debug)]
pub struct Throughput {
    every: u64,
    sent: u64,
    window_start: Instant,
}

/// One completed throughput window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputReport {
    pub records: u64,
    pub elapsed_secs: f64,
    pub per_sec: f64,
}

impl Throughput {
    /// Track throughput, reporting once per `every` records
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            sent: 0,
            window_start: Instant::now(),
        }
    }

    /// Count one published record. Returns a report exactly when the
    /// window fills, resetting the counter and timer.
    pub fn record(&mut self) -> Option<ThroughputReport> {
        self.sent += 1;
        if self.sent < self.every {
            return None;
        }

        // keep the denominator strictly positive even on coarse clocks
        let elapsed_secs = self.window_start.elapsed().as_secs_f64().max(f64::EPSILON);
        let report = ThroughputReport {
            records: self.sent,
            elapsed_secs,
            per_sec: self.sent as f64 / elapsed_secs,
        };

        self.sent = 0;
        self.window_start = Instant::now();
        Some(report)
    }
}

/// Drain the send channel one record at a time.
///
/// Publishing is strictly sequential: no outstanding unacknowledged send is
/// pipelined behind another. A broker failure is fatal to the loop and
/// surfaces through the returned error.
pub async fn publish_loop<S: RecordSink>(
    sink: S,
    mut rx: UnboundedReceiver<Player>,
    metrics: Arc<HarvestMetrics>,
    log_every: u64,
) -> Result<(), PublishError> {
    let mut throughput = Throughput::new(log_every);

    while let Some(player) = rx.recv().await {
        let started = Instant::now();
        sink.publish(&player).await?;

        metrics.record_publish_latency(started.elapsed().as_micros() as u64);
        metrics.records_published.fetch_add(1, Ordering::Relaxed);

        if let Some(report) = throughput.record() {
            info!(
                "published {} in {:.2} seconds, {:.2} msg/sec",
                report.records, report.elapsed_secs, report.per_sec
            );
        }
    }

    info!("send channel closed, publish loop exiting");
    Ok(())
}

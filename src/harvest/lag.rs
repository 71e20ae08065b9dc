//! Consumer lag measurement over read-only broker queries

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::TopicPartitionList;
use tracing::warn;

use super::errors::LagError;

/// Timeout applied to each metadata / offset query
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the total consumer lag for the target topic.
///
/// Trait seam so the fetch loop's admission check is testable without a
/// broker.
#[async_trait]
pub trait LagProbe: Send + Sync {
    /// Sum over partitions of (high watermark - committed offset)
    async fn total_lag(&self) -> Result<i64, LagError>;
}

/// Sum per-partition lag from (high watermark, committed offset) pairs.
/// Negative per-partition differences clamp to zero.
pub fn sum_partition_lag(pairs: &[(i64, i64)]) -> i64 {
    pairs
        .iter()
        .map(|(high, committed)| (high - committed).max(0))
        .sum()
}

/// rdkafka-backed lag monitor. Issues only read-only queries: topic
/// metadata, committed group offsets, and high watermarks. Never consumes.
pub struct KafkaLagMonitor {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaLagMonitor {
    pub fn new(consumer: StreamConsumer, topic: impl Into<String>) -> Self {
        Self {
            consumer,
            topic: topic.into(),
        }
    }

    fn partition_ids(&self) -> Result<Vec<i32>, LagError> {
        let metadata = self
            .consumer
            .fetch_metadata(Some(&self.topic), QUERY_TIMEOUT)
            .map_err(|e| LagError::Kafka(e.to_string()))?;

        Ok(metadata
            .topics()
            .iter()
            .find(|t| t.name() == self.topic)
            .map(|t| t.partitions().iter().map(|p| p.id()).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl LagProbe for KafkaLagMonitor {
    async fn total_lag(&self) -> Result<i64, LagError> {
        let partitions = self.partition_ids()?;
        if partitions.is_empty() {
            // consumer has not resolved topic metadata yet; recoverable
            warn!(topic = %self.topic, "topic has no partitions yet, reporting zero lag");
            return Ok(0);
        }

        let mut tpl = TopicPartitionList::new();
        for partition in &partitions {
            tpl.add_partition(&self.topic, *partition);
        }

        let committed = self
            .consumer
            .committed_offsets(tpl, QUERY_TIMEOUT)
            .map_err(|e| LagError::Kafka(e.to_string()))?;

        let mut pairs = Vec::with_capacity(partitions.len());
        for elem in committed.elements() {
            let (_low, high) = self
                .consumer
                .fetch_watermarks(&self.topic, elem.partition(), QUERY_TIMEOUT)
                .map_err(|e| LagError::Kafka(e.to_string()))?;
            // a group with no commit on the partition counts from zero
            let committed_offset = elem.offset().to_raw().filter(|o| *o >= 0).unwrap_or(0);
            pairs.push((high, committed_offset));
        }

        Ok(sum_partition_lag(&pairs))
    }
}

//! Pipeline wiring: Kafka clients, channels, and the three tasks

use std::sync::Arc;

use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::StreamConsumer;
use rdkafka::producer::FutureProducer;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::Config;

use super::lag::KafkaLagMonitor;
use super::publisher::{self, KafkaSink};
use super::source::UpstreamClient;
use super::telemetry::HarvestMetrics;
use super::{fetcher, relay};

/// Consumer used exclusively for lag measurement; it never polls records
fn create_consumer(config: &Config) -> Result<StreamConsumer> {
    ClientConfig::new()
        .set("bootstrap.servers", &config.kafka_host)
        .set("group.id", &config.consumer_group)
        .set("auto.offset.reset", "earliest")
        .create()
        .context("failed to create Kafka consumer")
}

/// Producer with durable-write acknowledgment from all in-sync replicas
fn create_producer(config: &Config) -> Result<FutureProducer> {
    ClientConfig::new()
        .set("bootstrap.servers", &config.kafka_host)
        .set("acks", "all")
        .create()
        .context("failed to create Kafka producer")
}

/// Run the harvest pipeline until terminated.
///
/// Three tasks on one runtime: the fetch loop, the relay forwarder, and the
/// publish loop, joined by two unbounded channels. Each channel has exactly
/// one producer task and one consumer task. There is no graceful-shutdown
/// protocol; ctrl-c or a fatal task error ends the process.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    info!(
        kafka_host = %config.kafka_host,
        endpoint = %config.endpoint,
        topic = %config.topic,
        batch_size = config.batch_size,
        "starting harvest pipeline"
    );

    let metrics = Arc::new(HarvestMetrics::new());

    let consumer = create_consumer(&config)?;
    let producer = create_producer(&config)?;

    let lag_monitor = KafkaLagMonitor::new(consumer, config.topic.clone());
    let upstream = UpstreamClient::new(&config.endpoint, &config.api_token);
    let sink = KafkaSink::new(producer, config.topic.clone());

    let (receive_tx, receive_rx) = mpsc::unbounded_channel();
    let (send_tx, send_rx) = mpsc::unbounded_channel();

    let fetch_task = tokio::spawn(fetcher::fetch_loop(
        upstream,
        lag_monitor,
        receive_tx,
        config.clone(),
        metrics.clone(),
    ));
    let relay_task = tokio::spawn(relay::forward(receive_rx, send_tx));
    let publish_task = tokio::spawn(publisher::publish_loop(
        sink,
        send_rx,
        metrics.clone(),
        config.throughput_log_every,
    ));

    tokio::select! {
        result = fetch_task => match result {
            Ok(Err(e)) => error!(error = %e, "fetch task failed"),
            Err(e) => error!(error = %e, "fetch task panicked"),
            Ok(Ok(())) => info!("fetch task exited"),
        },
        result = relay_task => match result {
            Err(e) => error!(error = %e, "relay task panicked"),
            Ok(()) => info!("relay task exited"),
        },
        result = publish_task => match result {
            Ok(Err(e)) => error!(error = %e, "publish task failed"),
            Err(e) => error!(error = %e, "publish task panicked"),
            Ok(Ok(())) => info!("publish task exited"),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    info!(telemetry = %metrics.snapshot(), "harvest pipeline stopped");
    Ok(())
}

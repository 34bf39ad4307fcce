use rdkafka::{
    consumer::{Consumer, StreamConsumer},
    types::RDKafkaErrorCode,
    ClientConfig, Offset, TopicPartitionList,
};
use std::{fmt, future::Future, io, sync::Arc, time::Duration};
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::config::SubscriberConfig;

pub use drain_loop::DrainLoop;
pub use error::{ConsumeError, StartupError};
pub use kafka::KafkaPartition;
pub use partition_loop::{PartitionLoop, PartitionSource};
pub use partition_message::PartitionMessage;
pub use relay::Relay;

mod drain_loop;
mod error;
mod kafka;
mod partition_loop;
mod partition_message;
mod relay;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriberState {
    Starting,
    Subscribing,
    Draining,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriberState::Starting => "starting",
            SubscriberState::Subscribing => "subscribing",
            SubscriberState::Draining => "draining",
            SubscriberState::ShuttingDown => "shutting down",
            SubscriberState::Stopped => "stopped",
        };

        f.write_str(name)
    }
}

fn enter(state: SubscriberState) {
    debug!(%state, "Subscriber state changed");
}

/// A consumer with every partition of the topic assigned and split into its
/// own queue. The consumer is the only broker connection; it is released once
/// by [`Subscriber::run`] after every reader has stopped.
pub struct Subscriber {
    consumer: Arc<StreamConsumer>,
    partitions: Vec<KafkaPartition>,
    topic: String,
}

impl Subscriber {
    pub async fn connect(config: &SubscriberConfig) -> Result<Self, StartupError> {
        enter(SubscriberState::Starting);

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .create()
            .map_err(StartupError::Consumer)?;

        let consumer = Arc::new(consumer);

        let ids = fetch_partitions(
            consumer.clone(),
            config.topic.clone(),
            config.metadata_timeout,
        )
        .await?;

        enter(SubscriberState::Subscribing);

        let offset = Offset::from(config.start_offset);

        let mut assignment = TopicPartitionList::new();

        for &id in &ids {
            assignment
                .add_partition_offset(&config.topic, id, offset)
                .map_err(StartupError::Assign)?;
        }

        consumer.assign(&assignment).map_err(StartupError::Assign)?;

        // assign deactivates previously split queues, so split only afterwards
        let mut partitions = Vec::with_capacity(ids.len());

        for id in ids {
            let queue = consumer
                .split_partition_queue(&config.topic, id)
                .ok_or(StartupError::PartitionQueue(id))?;

            partitions.push(KafkaPartition {
                partition: id,
                queue,
            });
        }

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            partitions = partitions.len(),
            start_offset = %config.start_offset,
            "Subscribed to all partitions"
        );

        Ok(Self {
            consumer,
            partitions,
            topic: config.topic.clone(),
        })
    }

    pub fn partitions(&self) -> Vec<i32> {
        self.partitions.iter().map(|p| p.partition).collect()
    }

    /// Relays every partition to `out` until `shutdown` resolves. Returns how
    /// many messages were printed.
    pub async fn run<W, F>(self, out: W, shutdown: F) -> io::Result<usize>
    where
        W: AsyncWrite + Unpin + Send + 'static,
        F: Future<Output = ()>,
    {
        let Self {
            consumer,
            partitions,
            topic,
        } = self;

        let relay = Relay::new(out, CancellationToken::new());

        relay.spawn(kafka::poll_client_errors(
            consumer.clone(),
            relay.token().clone(),
        ));

        info!(topic = %topic, "Waiting for messages");

        run_relay(relay, partitions, shutdown, move || close(consumer)).await
    }
}

/// Drives `relay` over `sources` until `shutdown` resolves or the relay
/// cancels itself. Every reader is joined and the queue drained before
/// `release` runs, exactly once.
pub async fn run_relay<P, F, R>(
    relay: Relay,
    sources: Vec<P>,
    shutdown: F,
    release: R,
) -> io::Result<usize>
where
    P: PartitionSource,
    F: Future<Output = ()>,
    R: FnOnce(),
{
    let partitions = sources.len();

    for source in sources {
        relay.spawn_partition(source);
    }

    enter(SubscriberState::Draining);

    info!(partitions, tasks = relay.tasks(), "Relaying partitions");

    let token = relay.token().clone();

    tokio::select! {
        _ = shutdown => {}
        _ = token.cancelled() => warn!("Relay stopped before shutdown was requested"),
    }

    enter(SubscriberState::ShuttingDown);

    token.cancel();

    let printed = relay.join().await;

    release();

    enter(SubscriberState::Stopped);

    printed
}

async fn fetch_partitions(
    consumer: Arc<StreamConsumer>,
    topic: String,
    timeout: Duration,
) -> Result<Vec<i32>, StartupError> {
    tokio::task::spawn_blocking(move || {
        let metadata = consumer
            .fetch_metadata(Some(&topic), timeout)
            .map_err(StartupError::Metadata)?;

        let topic_metadata = metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic)
            .ok_or_else(|| StartupError::UnknownTopic(topic.clone()))?;

        if let Some(err) = topic_metadata.error() {
            return Err(StartupError::Topic {
                topic: topic.clone(),
                code: RDKafkaErrorCode::from(err),
            });
        }

        let ids: Vec<i32> = topic_metadata.partitions().iter().map(|p| p.id()).collect();

        if ids.is_empty() {
            return Err(StartupError::NoPartitions(topic));
        }

        Ok(ids)
    })
    .await?
}

fn close(consumer: Arc<StreamConsumer>) {
    if let Err(err) = consumer.unassign() {
        warn!("Failed to unassign partitions: {}", err);
    }

    match Arc::try_unwrap(consumer) {
        Ok(consumer) => drop(consumer),
        Err(_) => warn!("Consumer still referenced after every reader stopped"),
    }

    info!("Broker connection closed");
}

use async_trait::async_trait;
use futures_util::StreamExt;
use rdkafka::{
    consumer::{stream_consumer::StreamPartitionQueue, DefaultConsumerContext, StreamConsumer},
    Offset,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::error::ConsumeError;
use super::partition_loop::PartitionSource;
use super::partition_message::PartitionMessage;
use crate::config::StartOffset;

impl From<StartOffset> for Offset {
    fn from(start: StartOffset) -> Self {
        match start {
            StartOffset::Newest => Offset::End,
            StartOffset::Oldest => Offset::Beginning,
        }
    }
}

/// A partition queue split off the shared consumer.
pub struct KafkaPartition {
    pub partition: i32,
    pub queue: StreamPartitionQueue<DefaultConsumerContext>,
}

#[async_trait]
impl PartitionSource for KafkaPartition {
    fn partition(&self) -> i32 {
        self.partition
    }

    async fn next(&mut self) -> Option<Result<PartitionMessage, ConsumeError>> {
        let next = self.queue.stream().next().await?;

        Some(
            next.map(|message| PartitionMessage::from_kafka(&message))
                .map_err(ConsumeError::from),
        )
    }
}

/// Polls the consumer's main queue. Split partitions never deliver records
/// here, but client level errors do, and the queue has to be served for the
/// partition queues to make progress.
pub async fn poll_client_errors(consumer: Arc<StreamConsumer>, token: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = consumer.recv() => match next {
                Ok(message) => {
                    let message = PartitionMessage::from_kafka(&message);

                    warn!(
                        partition = message.partition,
                        offset = message.offset,
                        "Record arrived on the main queue and was dropped"
                    );
                }
                Err(err) => {
                    warn!("error: {}", ConsumeError::from(err));
                }
            }
        }
    }

    debug!("Client error poller stopped");
}

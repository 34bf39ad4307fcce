use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::error::ConsumeError;
use super::partition_message::PartitionMessage;

/// One independently ordered sub-stream of the topic.
#[async_trait]
pub trait PartitionSource: Send + 'static {
    fn partition(&self) -> i32;

    /// `None` means the source will never yield again.
    async fn next(&mut self) -> Option<Result<PartitionMessage, ConsumeError>>;
}

pub struct PartitionLoop<P> {
    pub source: P,
    pub tx: UnboundedSender<PartitionMessage>,
    pub token: CancellationToken,
}

impl<P: PartitionSource> PartitionLoop<P> {
    pub async fn handle(mut self) {
        let partition = self.source.partition();

        debug!(partition, "Partition reader started");

        while let Some(next) = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                info!(partition, "interrupt signal received");
                return;
            }
            next = self.source.next() => next,
        } {
            match next {
                Ok(message) => {
                    if self.tx.send(message).is_err() {
                        warn!(partition, "Output closed, stopping partition reader");

                        return;
                    }
                }
                Err(err) => {
                    warn!(partition, "error: {}", err);

                    continue;
                }
            }
        }

        debug!(partition, "Partition exhausted");
    }
}

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use super::partition_message::PartitionMessage;

/// Single consumer of the shared queue. Runs until every sender is gone and
/// the queue is empty, returning how many messages were printed. A failed
/// write cancels `token`, which stops every reader feeding the queue.
pub struct DrainLoop<W> {
    pub rx: UnboundedReceiver<PartitionMessage>,
    pub out: W,
    pub token: CancellationToken,
}

impl<W: AsyncWrite + Unpin> DrainLoop<W> {
    pub async fn handle(mut self) -> io::Result<usize> {
        let result = self.print().await;

        if let Err(err) = &result {
            error!("Failed to write received message: {}", err);

            self.token.cancel();
        }

        result
    }

    async fn print(&mut self) -> io::Result<usize> {
        let mut printed = 0;

        while let Some(message) = self.rx.recv().await {
            self.out.write_all(message.to_line().as_bytes()).await?;
            self.out.flush().await?;

            printed += 1;
        }

        Ok(printed)
    }
}

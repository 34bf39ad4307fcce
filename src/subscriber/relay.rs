use std::{future::Future, io};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::drain_loop::DrainLoop;
use super::partition_loop::{PartitionLoop, PartitionSource};
use super::partition_message::PartitionMessage;

/// Fan-in of N partition readers into one unbounded queue drained by a single
/// printer task.
///
/// Readers are tracked so that [`Relay::join`] can wait for all of them before
/// the queue is closed; anything they forwarded is still printed. If printing
/// fails the drainer cancels the shared token, so the readers stop on their own.
pub struct Relay {
    tracker: TaskTracker,
    token: CancellationToken,
    tx: UnboundedSender<PartitionMessage>,
    drain: JoinHandle<io::Result<usize>>,
}

impl Relay {
    pub fn new<W>(out: W, token: CancellationToken) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<PartitionMessage>(); // unbounded so a slow stdout never stalls a partition

        let drain = tokio::task::spawn(
            DrainLoop {
                rx,
                out,
                token: token.clone(),
            }
            .handle(),
        );

        Self {
            tracker: TaskTracker::new(),
            token,
            tx,
            drain,
        }
    }

    pub fn spawn_partition<P: PartitionSource>(&self, source: P) {
        let partition_loop = PartitionLoop {
            source,
            tx: self.tx.clone(),
            token: self.token.clone(),
        };

        self.tracker.spawn(partition_loop.handle());
    }

    /// Tracks an auxiliary task that has to finish before the relay is joined.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Partition readers and auxiliary tasks still running.
    pub fn tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for every tracked task, then for the drainer to empty the queue.
    /// Does not cancel anything by itself.
    pub async fn join(self) -> io::Result<usize> {
        let Self {
            tracker, tx, drain, ..
        } = self;

        tracker.close();
        tracker.wait().await;

        drop(tx);

        match drain.await {
            Ok(result) => result,
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err)),
        }
    }
}

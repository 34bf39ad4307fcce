use rdkafka::{error::KafkaError, types::RDKafkaErrorCode};
use thiserror::Error;

/// A read failure on one partition or on the client itself. Logged, never fatal.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ConsumeError(#[from] pub KafkaError);

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to create consumer: {0}")]
    Consumer(KafkaError),
    #[error("failed to get partitions: {0}")]
    Metadata(KafkaError),
    #[error("topic {0} does not exist")]
    UnknownTopic(String),
    #[error("topic {topic} is unavailable: {code}")]
    Topic {
        topic: String,
        code: RDKafkaErrorCode,
    },
    #[error("topic {0} has no partitions")]
    NoPartitions(String),
    #[error("failed to assign partitions: {0}")]
    Assign(KafkaError),
    #[error("failed to create partition consumer for partition {0}")]
    PartitionQueue(i32),
    #[error("partition discovery was interrupted: {0}")]
    Discovery(#[from] tokio::task::JoinError),
}

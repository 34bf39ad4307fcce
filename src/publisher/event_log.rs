use async_trait::async_trait;
use rdkafka::{
    error::KafkaError,
    producer::{FutureProducer, FutureRecord, Producer},
    util::Timeout,
    ClientConfig,
};
use std::time::Duration;

use super::error::PublishError;
use super::event_record::EventRecord;

/// The partitioned log notifications are published to. `publish` resolves only
/// once the log has acknowledged the record or failed to.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn publish(&self, record: EventRecord) -> Result<(), PublishError>;
}

pub struct KafkaEventLog {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl KafkaEventLog {
    pub fn new(brokers: &str, topic: &str, send_timeout: Duration) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", send_timeout.as_millis().to_string())
            .create()?;

        Ok(Self {
            producer,
            topic: topic.to_owned(),
            send_timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for every in-flight record to be delivered. Called once on
    /// shutdown.
    pub fn flush(&self) -> Result<(), KafkaError> {
        self.producer.flush(Timeout::After(self.send_timeout))
    }
}

#[async_trait]
impl EventLog for KafkaEventLog {
    async fn publish(&self, record: EventRecord) -> Result<(), PublishError> {
        let delivery = self
            .producer
            .send(
                FutureRecord::to(&self.topic)
                    .key(record.key.as_str())
                    .payload(&record.payload),
                Timeout::After(self.send_timeout),
            )
            .await;

        match delivery {
            Ok(delivery) => {
                debug!(topic = %self.topic, key = %record.key, ?delivery, "Record delivered");
                Ok(())
            }
            Err((err, _)) => Err(PublishError::Kafka(err)),
        }
    }
}

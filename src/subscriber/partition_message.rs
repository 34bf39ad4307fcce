use rdkafka::message::Message;
use std::borrow::Cow;

/// Owned copy of a record read from one partition. The payload is never
/// decoded, it is surfaced as raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionMessage {
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
}

impl PartitionMessage {
    pub fn from_kafka<M: Message>(message: &M) -> Self {
        Self {
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.payload.as_deref().unwrap_or_default())
    }

    pub fn to_line(&self) -> String {
        format!("Received message: {}\n", self.text())
    }
}

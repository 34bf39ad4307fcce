use crate::models::Notification;

/// A record on its way to the event log. The partition key is the recipient's
/// id so every notification for one user lands on the same partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub key: String,
    pub payload: Vec<u8>,
}

impl EventRecord {
    pub fn from_notification(notification: &Notification) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: notification.to.id.to_string(),
            payload: notification.to_vec()?,
        })
    }
}

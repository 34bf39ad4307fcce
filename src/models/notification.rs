use serde::{Deserialize, Serialize};

use super::User;

/// Payload published to the event log. Field order is part of the wire
/// format: `from`, `to`, `message`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub from: User,
    pub to: User,
    pub message: String,
}

impl Notification {
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(slice)
    }
}

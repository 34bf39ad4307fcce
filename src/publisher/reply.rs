use serde::{Deserialize, Serialize};

/// Body of every `/send` response, success or failure.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
}

impl Reply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

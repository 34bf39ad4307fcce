use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rdkafka::error::KafkaError;
use std::net::SocketAddr;
use thiserror::Error;

use super::reply::Reply;
use crate::directory::UserNotFound;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct ValidationError(#[from] serde_json::Error);

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to marshal notification: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Kafka(#[from] KafkaError),
}

/// Everything that can go wrong while handling `POST /send`. Each variant maps
/// to exactly one status code; nothing is retried.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    UserNotFound(#[from] UserNotFound),
    #[error("{0}")]
    Publish(#[from] PublishError),
}

impl SendError {
    pub fn status(&self) -> StatusCode {
        match self {
            SendError::Validation(_) => StatusCode::BAD_REQUEST,
            SendError::UserNotFound(_) => StatusCode::NOT_FOUND,
            SendError::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SendError {
    fn into_response(self) -> Response {
        (self.status(), Json(Reply::new(self.to_string()))).into_response()
    }
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to setup producer: {0}")]
    Producer(#[from] KafkaError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

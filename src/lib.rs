//! Notification relay.
//!
//! `publisher` accepts `POST /send`, resolves both users and publishes the
//! notification to a Kafka topic keyed by the recipient id. `subscriber` reads
//! every partition of that topic and prints what arrives.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod directory;
pub mod init;
pub mod models;
pub mod publisher;
pub mod subscriber;

/// Resolves on the first interrupt signal.
pub async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("interrupt signal received"),
        Err(err) => error!("Failed to listen for interrupt signal: {}", err),
    }
}

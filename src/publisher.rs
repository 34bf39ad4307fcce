use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::config::PublisherConfig;
use crate::directory::UserDirectory;
use crate::models::{Notification, SendRequest};

pub use error::{PublishError, SendError, StartupError, ValidationError};
pub use event_log::{EventLog, KafkaEventLog};
pub use event_record::EventRecord;
pub use reply::Reply;

mod error;
mod event_log;
mod event_record;
mod reply;

pub const SENT: &str = "Message sent successfully";

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    pub event_log: Arc<dyn EventLog>,
}

impl AppState {
    pub fn new(users: UserDirectory, event_log: Arc<dyn EventLog>) -> Self {
        Self {
            users: Arc::new(users),
            event_log,
        }
    }

    /// Resolves both ends of the request. The sender is looked up first.
    pub fn notification(&self, request: SendRequest) -> Result<Notification, SendError> {
        let from = self.users.find(request.from_id)?.clone();
        let to = self.users.find(request.to_id)?.clone();

        Ok(Notification {
            from,
            to,
            message: request.message,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/send", post(send_message))
        .with_state(state)
}

async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Reply>, SendError> {
    let request = SendRequest::from_slice(&body).map_err(|err| {
        info!("Rejected malformed send request: {}", err);
        ValidationError::from(err)
    })?;

    let (from_id, to_id) = (request.from_id, request.to_id);

    let notification = state.notification(request).map_err(|err| {
        info!(from_id, to_id, "Rejected send request: {}", err);
        err
    })?;

    let record = EventRecord::from_notification(&notification).map_err(PublishError::from)?;

    if let Err(err) = state.event_log.publish(record).await {
        warn!(from_id, to_id, "Failed to publish notification: {}", err);

        return Err(err.into());
    }

    debug!(from_id, to_id, "Notification published");

    Ok(Json(Reply::new(SENT)))
}

/// Runs the HTTP side until `shutdown` resolves, then flushes the producer.
pub async fn serve(
    config: PublisherConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let event_log = Arc::new(KafkaEventLog::new(
        &config.brokers,
        &config.topic,
        config.send_timeout,
    )?);

    let state = AppState::new(config.users, event_log.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    info!(
        brokers = %config.brokers,
        topic = %event_log.topic(),
        "Producer is running on port {}",
        config.port
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(StartupError::Serve)?;

    if let Err(err) = event_log.flush() {
        warn!("Failed to flush producer: {}", err);
    }

    info!("Producer stopped");

    Ok(())
}

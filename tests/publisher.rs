use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rdkafka::{error::KafkaError, types::RDKafkaErrorCode};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use common::LogCapture;

mod common;

use notifications::{
    directory::UserDirectory,
    models::{Notification, User},
    publisher::{self, AppState, EventLog, EventRecord, PublishError, Reply},
};

#[derive(Default)]
struct RecordingEventLog {
    records: Mutex<Vec<EventRecord>>,
    fail_with: Option<RDKafkaErrorCode>,
}

impl RecordingEventLog {
    fn failing(code: RDKafkaErrorCode) -> Self {
        Self {
            records: Mutex::default(),
            fail_with: Some(code),
        }
    }

    fn records(&self) -> Vec<EventRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLog for RecordingEventLog {
    async fn publish(&self, record: EventRecord) -> Result<(), PublishError> {
        if let Some(code) = self.fail_with {
            return Err(PublishError::Kafka(KafkaError::MessageProduction(code)));
        }

        self.records.lock().unwrap().push(record);

        Ok(())
    }
}

fn john_and_jane() -> UserDirectory {
    UserDirectory::new(vec![User::new(1, "John"), User::new(2, "Jane")])
}

fn app(users: UserDirectory, event_log: Arc<RecordingEventLog>) -> Router {
    publisher::router(AppState::new(users, event_log))
}

async fn post(app: Router, body: &str) -> (StatusCode, Reply) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/send")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn publishes_notification_keyed_by_recipient() {
    let event_log = Arc::new(RecordingEventLog::default());

    let (status, reply) = post(
        app(john_and_jane(), event_log.clone()),
        r#"{"fromId":1,"toId":2,"message":"hi"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, Reply::new("Message sent successfully"));

    let records = event_log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "2");
    assert_eq!(
        records[0].payload,
        br#"{"from":{"id":1,"name":"John"},"to":{"id":2,"name":"Jane"},"message":"hi"}"#
    );
}

#[tokio::test]
async fn every_known_pair_is_published() {
    let users = UserDirectory::default();
    let ids = [1, 2, 3, 4];

    for from_id in ids {
        for to_id in ids {
            let event_log = Arc::new(RecordingEventLog::default());
            let body = format!(r#"{{"fromId":{},"toId":{},"message":"m{}{}"}}"#, from_id, to_id, from_id, to_id);

            let (status, _) = post(app(users.clone(), event_log.clone()), &body).await;

            assert_eq!(status, StatusCode::OK);

            let records = event_log.records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].key, to_id.to_string());

            let notification = Notification::from_slice(&records[0].payload).unwrap();
            assert_eq!(notification.from, *users.find(from_id).unwrap());
            assert_eq!(notification.to, *users.find(to_id).unwrap());
            assert_eq!(notification.message, format!("m{}{}", from_id, to_id));
        }
    }
}

#[tokio::test]
async fn unknown_recipient_is_not_found() {
    let event_log = Arc::new(RecordingEventLog::default());

    let (status, reply) = post(
        app(john_and_jane(), event_log.clone()),
        r#"{"fromId":1,"toId":99,"message":"hi"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(reply.message.contains("user not found"));
    assert!(event_log.records().is_empty());
}

#[tokio::test]
async fn unknown_sender_is_not_found() {
    let event_log = Arc::new(RecordingEventLog::default());

    let (status, reply) = post(
        app(john_and_jane(), event_log.clone()),
        r#"{"fromId":42,"toId":2,"message":"hi"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(reply.message, "user not found");
    assert!(event_log.records().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let event_log = Arc::new(RecordingEventLog::default());

    for body in [
        r#"{"fromId":1,"toId":2,"message":"hi""#,
        r#"{"fromId":1,"message":"hi"}"#,
        r#"{"fromId":"one","toId":2,"message":"hi"}"#,
        "",
    ] {
        let (status, reply) = post(app(john_and_jane(), event_log.clone()), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert!(!reply.message.is_empty());
    }

    assert!(event_log.records().is_empty());
}

#[tokio::test]
async fn publish_failure_is_an_internal_error() {
    let event_log = Arc::new(RecordingEventLog::failing(RDKafkaErrorCode::MessageTimedOut));

    let (status, reply) = post(
        app(john_and_jane(), event_log.clone()),
        r#"{"fromId":1,"toId":2,"message":"hi"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        reply.message,
        KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut).to_string()
    );
}

#[tokio::test]
async fn only_post_is_routed() {
    let event_log = Arc::new(RecordingEventLog::default());

    let response = app(john_and_jane(), event_log.clone())
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/send")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(event_log.records().is_empty());
}

#[tokio::test]
async fn rejected_requests_are_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let event_log = Arc::new(RecordingEventLog::default());

    let (status, _) = post(app(john_and_jane(), event_log.clone()), r#"{"fromId":1"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        app(john_and_jane(), event_log.clone()),
        r#"{"fromId":1,"toId":99,"message":"hi"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let contents = logs.contents();

    assert!(contents.contains("Rejected malformed send request"));
    assert!(contents.contains("Rejected send request: user not found"));
}

use std::{env, fmt, fs, str::FromStr, time::Duration};
use thiserror::Error;

use crate::directory::UserDirectory;
use crate::models::User;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BROKERS: &str = "localhost:9092";
const DEFAULT_TOPIC: &str = "notifications";
const DEFAULT_GROUP_ID: &str = "notifications-subscriber";
const DEFAULT_SEND_TIMEOUT_MS: u64 = 5000;
const DEFAULT_METADATA_TIMEOUT_MS: u64 = 10000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} environment variable could not be parsed: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("Failed to read users from {path}: {source}")]
    UsersFile {
        path: String,
        source: std::io::Error,
    },
    #[error("Users file {path} is not a valid user list: {source}")]
    UsersFormat {
        path: String,
        source: serde_json::Error,
    },
}

/// Where a partition subscription begins reading when the subscriber starts.
/// Nothing is committed, so this applies on every restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartOffset {
    /// Only records published after the subscription is opened.
    #[default]
    Newest,
    /// Everything the topic still retains.
    Oldest,
}

impl FromStr for StartOffset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "latest" | "end" => Ok(Self::Newest),
            "oldest" | "earliest" | "beginning" => Ok(Self::Oldest),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StartOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => f.write_str("newest"),
            Self::Oldest => f.write_str("oldest"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PublisherConfig {
    pub port: u16,
    pub brokers: String,
    pub topic: String,
    pub send_timeout: Duration,
    pub users: UserDirectory,
}

#[derive(Clone, Debug)]
pub struct SubscriberConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub start_offset: StartOffset,
    pub metadata_timeout: Duration,
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let users = match lookup("USERS_PATH") {
            Some(path) => load_users(&path)?,
            None => UserDirectory::default(),
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            brokers: lookup("KAFKA_BROKERS").unwrap_or_else(|| DEFAULT_BROKERS.to_owned()),
            topic: lookup("KAFKA_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_owned()),
            send_timeout: parse_timeout(&lookup, "SEND_TIMEOUT_MS", DEFAULT_SEND_TIMEOUT_MS)?,
            users,
        })
    }
}

impl SubscriberConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            brokers: lookup("KAFKA_BROKERS").unwrap_or_else(|| DEFAULT_BROKERS.to_owned()),
            topic: lookup("KAFKA_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_owned()),
            group_id: lookup("GROUP_ID").unwrap_or_else(|| DEFAULT_GROUP_ID.to_owned()),
            start_offset: parse_or(&lookup, "START_OFFSET", StartOffset::default())?,
            metadata_timeout: parse_timeout(
                &lookup,
                "METADATA_TIMEOUT_MS",
                DEFAULT_METADATA_TIMEOUT_MS,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

// librdkafka reads a zero timeout as "wait forever"
fn parse_timeout(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    match parse_or(lookup, key, default_ms)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".to_owned(),
        }),
        ms => Ok(Duration::from_millis(ms)),
    }
}

fn load_users(path: &str) -> Result<UserDirectory, ConfigError> {
    let raw = fs::read(path).map_err(|source| ConfigError::UsersFile {
        path: path.to_owned(),
        source,
    })?;

    let users: Vec<User> =
        serde_json::from_slice(&raw).map_err(|source| ConfigError::UsersFormat {
            path: path.to_owned(),
            source,
        })?;

    Ok(UserDirectory::new(users))
}

//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stale write for member {user_id} at version {version}")]
    Conflict { user_id: String, version: i64 },

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Outbound message delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Platform rejected message: {0}")]
    Rejected(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Inbound event decoding errors
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported event type: {0}")]
    Unsupported(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

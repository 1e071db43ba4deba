use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the schedule compiler and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing a required field or has a bad value.
    /// Fatal at load time; carries the offending value.
    #[error("config error: {0}")]
    Config(String),

    /// A time or time range string could not be parsed.
    #[error("invalid time value '{value}': {reason}")]
    Time { value: String, reason: String },

    /// The requested channel does not exist in the configuration.
    #[error("channel '{0}' not found in config")]
    UnknownChannel(String),

    /// A whole compilation pass produced no blocks for a channel.
    #[error("no schedule blocks generated for channel '{0}'")]
    EmptySchedule(String),

    /// The media-server catalog returned something unusable.
    #[error("media server: {0}")]
    MediaServer(String),

    /// HTTP transport failure talking to the catalog.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The stream publisher could not be started or controlled.
    #[error("publisher: {0}")]
    Publisher(String),

    /// A persisted schedule artifact was expected but not found.
    #[error("schedule not found: {}", .0.display())]
    ScheduleNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

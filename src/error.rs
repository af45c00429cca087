//! Error types shared by the fetch and aggregation pipeline.

use std::fmt;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum NeoError {
    #[error("feed request failed: {0}")]
    Network(reqwest::Error),

    #[error("feed endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("malformed record at {location}: {reason}")]
    MalformedRecord { location: String, reason: String },
}

impl NeoError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::Status(_) => FailureKind::NetworkFailure,
            Self::EmptyDataset(_) => FailureKind::EmptyDataset,
            Self::MalformedRecord { .. } => FailureKind::MalformedRecord,
        }
    }
}

// The request URL carries the API key, so it never makes it into the message.
impl From<reqwest::Error> for NeoError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.without_url())
    }
}

impl From<serde_json::Error> for NeoError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed(
            format!("line {} column {}", error.line(), error.column()),
            error.to_string(),
        )
    }
}

/// The three failure states the presentation layer tells apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    NetworkFailure,
    EmptyDataset,
    MalformedRecord,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkFailure => "network failure",
            Self::EmptyDataset => "empty dataset",
            Self::MalformedRecord => "malformed record",
        };
        f.write_str(name)
    }
}

/// Cloneable snapshot of a [`NeoError`], kept in the view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<NeoError> for Failure {
    fn from(error: NeoError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NeoError>;

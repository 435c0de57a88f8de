use std::fmt;

use catalog_core::{
    CatalogError, CatalogStats, Epoch, ImageRecord, ScrapeTicket, TaskId, TaskStatusReport,
};
use thiserror::Error;

/// Results reported back from the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageFetched {
        epoch: Epoch,
        page: u32,
        result: Result<Vec<ImageRecord>, ApiError>,
    },
    StatsFetched(Result<CatalogStats, ApiError>),
    ScrapeSubmitted(Result<ScrapeTicket, ApiError>),
    TaskStatus {
        task_id: TaskId,
        result: Result<TaskStatusReport, ApiError>,
    },
    JobImagesFetched {
        task_id: TaskId,
        result: Result<Vec<ImageRecord>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    NotFound,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

impl From<ApiError> for CatalogError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            FailureKind::NotFound => CatalogError::NotFound(err.message),
            _ => CatalogError::Transport(err.to_string()),
        }
    }
}

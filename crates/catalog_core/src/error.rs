use thiserror::Error;

/// Failures surfaced to the UI layer. Every variant carries a displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Network, timeout, bad status or undecodable response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote does not know the requested id (e.g. a task lost after a restart).
    #[error("not found: {0}")]
    NotFound(String),
    /// The remote reported the scrape job as failed.
    #[error("scrape failed: {0}")]
    RemoteFailure(String),
    /// Input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

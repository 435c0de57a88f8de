//! Catalog engine: HTTP access to the catalog service and effect execution.
mod api;
mod engine;
mod types;
mod wire;

pub use api::{ApiSettings, CatalogApi, ReqwestCatalogApi, DEFAULT_BASE_URL};
pub use engine::{EngineHandle, EngineSettings};
pub use types::{ApiError, EngineEvent, FailureKind};

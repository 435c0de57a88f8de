use std::time::Duration;

use catalog_core::{
    CatalogStats, ImageRecord, ListParams, ScrapeRequest, ScrapeTicket, TaskId, TaskStatusReport,
};
use catalog_logging::{catalog_debug, catalog_trace};
use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{ImageDto, ScrapeRequestDto, StatsDto, TaskDto};
use crate::{ApiError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Remote catalog operations used by the engine.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_images(&self, params: &ListParams) -> Result<Vec<ImageRecord>, ApiError>;

    async fn get_stats(&self) -> Result<CatalogStats, ApiError>;

    async fn submit_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeTicket, ApiError>;

    /// `FailureKind::NotFound` means the remote no longer knows the task.
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatusReport, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCatalogApi {
    base_url: Url,
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestCatalogApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            max_bytes: settings.max_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::new(FailureKind::NotFound, response.url().path().to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        catalog_trace!("Received {} bytes", bytes.len());

        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogApi for ReqwestCatalogApi {
    async fn list_images(&self, params: &ListParams) -> Result<Vec<ImageRecord>, ApiError> {
        let mut url = self.endpoint(&["images"])?;
        url.query_pairs_mut()
            .extend_pairs(params.query_pairs().iter().map(|(k, v)| (*k, v.as_str())));
        catalog_debug!("GET {}", url);
        let documents: Vec<ImageDto> = self.execute(self.client.get(url)).await?;
        Ok(documents.into_iter().map(ImageRecord::from).collect())
    }

    async fn get_stats(&self) -> Result<CatalogStats, ApiError> {
        let url = self.endpoint(&["stats"])?;
        catalog_debug!("GET {}", url);
        let stats: StatsDto = self.execute(self.client.get(url)).await?;
        Ok(stats.into())
    }

    async fn submit_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeTicket, ApiError> {
        let url = self.endpoint(&["scrape"])?;
        let body = serde_json::to_vec(&ScrapeRequestDto::from(request))
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        catalog_debug!("POST {} for category '{}'", url, request.category);
        let builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);
        let response: TaskDto = self.execute(builder).await?;
        response.into_ticket()
    }

    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatusReport, ApiError> {
        let url = self.endpoint(&["scrape", task_id.as_str()])?;
        catalog_trace!("GET {}", url);
        let response: TaskDto = self.execute(self.client.get(url)).await?;
        response.into_report()
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

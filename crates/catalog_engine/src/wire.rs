//! JSON shapes exchanged with the catalog service and their mapping to core types.

use catalog_core::{
    CatalogStats, CountEntry, ImageRecord, JobStatus, ScrapeRequest, ScrapeTicket, TaskId,
    TaskStatusReport, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, FALLBACK_CATEGORY,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiError, FailureKind};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageDto {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    title: String,
    image_url: String,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    scraped_at: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    r2_url: Option<String>,
    #[serde(default)]
    full_size_url: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ImageDto> for ImageRecord {
    fn from(dto: ImageDto) -> Self {
        let mirrored = non_empty(dto.r2_url);
        // Mirrored copy first, then the original location.
        let url = mirrored.clone().unwrap_or_else(|| dto.image_url.clone());
        let full_size_url = mirrored
            .or_else(|| non_empty(dto.full_size_url))
            .or_else(|| Some(dto.image_url.clone()));
        ImageRecord {
            id: dto.id.into(),
            title: dto.title,
            thumbnail_url: url.clone(),
            url,
            full_size_url,
            width: dto.width.filter(|w| *w > 0).unwrap_or(DEFAULT_IMAGE_WIDTH),
            height: dto.height.filter(|h| *h > 0).unwrap_or(DEFAULT_IMAGE_HEIGHT),
            tags: dto.tags,
            source: dto.source_url.unwrap_or_default(),
            category: non_empty(dto.category).unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            scraped_at: dto.scraped_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Accepts RFC 3339 as well as offset-less ISO timestamps, which are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Deserialize)]
struct CountDto {
    #[serde(rename = "_id", alias = "tag", alias = "source", alias = "category", default)]
    label: Option<String>,
    #[serde(default)]
    count: u64,
}

impl From<CountDto> for CountEntry {
    fn from(dto: CountDto) -> Self {
        CountEntry {
            label: non_empty(dto.label).unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            count: dto.count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatsDto {
    #[serde(default)]
    total_images: u64,
    #[serde(default)]
    top_tags: Vec<CountDto>,
    #[serde(default)]
    source_breakdown: Vec<CountDto>,
    #[serde(default)]
    category_breakdown: Vec<CountDto>,
}

impl From<StatsDto> for CatalogStats {
    fn from(dto: StatsDto) -> Self {
        CatalogStats {
            total_images: dto.total_images,
            top_tags: dto.top_tags.into_iter().map(Into::into).collect(),
            source_breakdown: dto.source_breakdown.into_iter().map(Into::into).collect(),
            category_breakdown: dto.category_breakdown.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ScrapeRequestDto<'a> {
    category: &'a str,
    max_images: u32,
}

impl<'a> From<&'a ScrapeRequest> for ScrapeRequestDto<'a> {
    fn from(request: &'a ScrapeRequest) -> Self {
        Self {
            category: &request.category,
            max_images: request.max_images,
        }
    }
}

/// Body of both the submission response and the status response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskDto {
    #[serde(default)]
    task_id: Option<String>,
    status: String,
    #[serde(default)]
    message: Option<String>,
}

fn parse_status(raw: &str) -> Result<JobStatus, ApiError> {
    raw.parse::<JobStatus>()
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

impl TaskDto {
    pub(crate) fn into_ticket(self) -> Result<ScrapeTicket, ApiError> {
        let task_id = non_empty(self.task_id)
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "response has no task_id"))?;
        Ok(ScrapeTicket {
            task_id: TaskId::new(task_id),
            status: parse_status(&self.status)?,
            message: non_empty(self.message),
        })
    }

    pub(crate) fn into_report(self) -> Result<TaskStatusReport, ApiError> {
        Ok(TaskStatusReport {
            status: parse_status(&self.status)?,
            message: non_empty(self.message),
        })
    }
}

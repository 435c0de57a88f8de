use std::fmt;

use chrono::{DateTime, Utc};

/// Stable identifier assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One catalog entry. Records are replaced wholesale on refetch, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: ImageId,
    pub title: String,
    pub url: String,
    pub full_size_url: Option<String>,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
    pub tags: Vec<String>,
    pub source: String,
    pub category: String,
    pub scraped_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_IMAGE_WIDTH: u32 = 1200;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 800;
pub const FALLBACK_CATEGORY: &str = "other";

impl ImageRecord {
    /// Minimal record with display defaults; remaining fields can be set afterwards.
    pub fn new(id: impl Into<ImageId>, title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            title: title.into(),
            full_size_url: None,
            thumbnail_url: url.clone(),
            url,
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
            tags: Vec::new(),
            source: String::new(),
            category: FALLBACK_CATEGORY.to_string(),
            scraped_at: None,
        }
    }

    /// URL to open when the image is shown at full size.
    pub fn full_size(&self) -> &str {
        self.full_size_url.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

/// Aggregate numbers for the stats panel. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub total_images: u64,
    pub top_tags: Vec<CountEntry>,
    pub source_breakdown: Vec<CountEntry>,
    pub category_breakdown: Vec<CountEntry>,
}

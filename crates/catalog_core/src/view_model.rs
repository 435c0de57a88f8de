use crate::{
    CatalogStats, Epoch, Filter, ImageRecord, JobStatus, PollerPhase, TaskId,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogViewModel {
    pub epoch: Epoch,
    pub filter: Filter,
    pub images: Vec<ImageRecord>,
    pub loading: bool,
    pub has_more: bool,
    pub feed_error: Option<String>,
    pub stats: Option<CatalogStats>,
    pub stats_error: Option<String>,
    pub selected: Option<ImageRecord>,
    pub scrape: ScrapeView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapeView {
    pub phase: PollerPhase,
    pub task_id: Option<TaskId>,
    pub status: Option<JobStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub images: Vec<ImageRecord>,
    pub images_loading: bool,
}

use crate::{
    CatalogError, CatalogStats, Epoch, FilterPatch, ImageId, ImageRecord, ScrapeTicket, TaskId,
    TaskStatusReport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// First render: load page 1 and the stats panel.
    Init,
    /// User changed one or more filters.
    FiltersChanged(FilterPatch),
    /// User cleared all filters.
    FiltersReset,
    /// Re-read page 1 under the current filters.
    Refresh,
    /// The rendered list is close to its end (scroll trigger).
    LoadMoreRequested,
    /// Engine finished a page fetch issued under `epoch`.
    PageLoaded {
        epoch: Epoch,
        page: u32,
        result: Result<Vec<ImageRecord>, CatalogError>,
    },
    /// User asked for fresh stats.
    StatsRequested,
    /// Engine finished a stats fetch.
    StatsLoaded(Result<CatalogStats, CatalogError>),
    /// User opened (or closed, with `None`) an image.
    ImageSelected(Option<ImageId>),
    /// User asked for a scrape job.
    ScrapeRequested { category: String, max_images: u32 },
    /// Engine finished submitting the scrape job.
    ScrapeAccepted(Result<ScrapeTicket, CatalogError>),
    /// Attach the poller to a job submitted elsewhere.
    TrackTask { task_id: TaskId },
    /// One poll tick's result.
    TaskStatusReceived {
        task_id: TaskId,
        result: Result<TaskStatusReport, CatalogError>,
    },
    /// Engine finished the post-completion listing.
    JobImagesLoaded {
        task_id: TaskId,
        result: Result<Vec<ImageRecord>, CatalogError>,
    },
    /// User dismissed the finished job.
    JobAcknowledged,
    /// The host is going away; stop all background work.
    Shutdown,
    /// Fallback for placeholder wiring.
    NoOp,
}

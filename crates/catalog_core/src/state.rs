use catalog_logging::catalog_debug;

use crate::view_model::{CatalogViewModel, ScrapeView};
use crate::{
    CatalogError, CatalogStats, Epoch, FilterStore, ImageId, PageRequest, PaginatedFeed,
    TaskPoller,
};

/// Everything the dispatcher owns. Each part has exactly one writer: the
/// filter store owns the epoch, the feed owns items and seen ids, the poller
/// owns the job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogState {
    filters: FilterStore,
    feed: PaginatedFeed,
    poller: TaskPoller,
    stats: Option<CatalogStats>,
    stats_error: Option<CatalogError>,
    selected: Option<ImageId>,
    dirty: bool,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose feed requests `page_size` items per page.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            feed: PaginatedFeed::with_page_size(page_size),
            ..Self::default()
        }
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn feed(&self) -> &PaginatedFeed {
        &self.feed
    }

    pub fn poller(&self) -> &TaskPoller {
        &self.poller
    }

    pub fn stats(&self) -> Option<&CatalogStats> {
        self.stats.as_ref()
    }

    pub fn stats_error(&self) -> Option<&CatalogError> {
        self.stats_error.as_ref()
    }

    pub fn view(&self) -> CatalogViewModel {
        let job = self.poller.job();
        CatalogViewModel {
            epoch: self.filters.epoch(),
            filter: self.filters.filter().clone(),
            images: self.feed.items().to_vec(),
            loading: self.feed.is_loading(),
            has_more: self.feed.has_more(),
            feed_error: self.feed.last_error().map(ToString::to_string),
            stats: self.stats.clone(),
            stats_error: self.stats_error.as_ref().map(ToString::to_string),
            selected: self
                .selected
                .as_ref()
                .and_then(|id| self.feed.get(id))
                .cloned(),
            scrape: ScrapeView {
                phase: self.poller.phase(),
                task_id: job.map(|job| job.id.clone()),
                status: job.map(|job| job.status),
                message: job.and_then(|job| job.message.clone()),
                error: self.poller.last_error().map(ToString::to_string),
                images: self.poller.job_images().to_vec(),
                images_loading: self.poller.images_loading(),
            },
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn poller_mut(&mut self) -> &mut TaskPoller {
        &mut self.poller
    }

    /// Runs a filter mutation and, before anything else can happen, drops
    /// every piece of state tied to the previous epoch. Returns the page-1
    /// request for the new epoch.
    pub(crate) fn start_epoch(
        &mut self,
        mutate: impl FnOnce(&mut FilterStore) -> Epoch,
    ) -> PageRequest {
        let epoch = mutate(&mut self.filters);
        catalog_debug!("Filter epoch advanced to {}", epoch);
        self.feed.reset(epoch);
        self.selected = None;
        self.mark_dirty();
        self.feed.load_first_page(&self.filters)
    }

    pub(crate) fn load_first_page(&mut self) -> PageRequest {
        self.mark_dirty();
        self.feed.load_first_page(&self.filters)
    }

    pub(crate) fn load_more(&mut self) -> Option<PageRequest> {
        let request = self.feed.load_more(&mut self.filters)?;
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn feed_mut(&mut self) -> &mut PaginatedFeed {
        &mut self.feed
    }

    pub(crate) fn set_stats(&mut self, result: Result<CatalogStats, CatalogError>) {
        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                self.stats_error = None;
            }
            // Previous numbers stay on screen.
            Err(err) => self.stats_error = Some(err),
        }
        self.mark_dirty();
    }

    /// Selects an image of the current feed; unknown ids clear the selection.
    pub(crate) fn select(&mut self, id: Option<ImageId>) {
        let next = id.filter(|id| self.feed.get(id).is_some());
        if next != self.selected {
            self.selected = next;
            self.mark_dirty();
        }
    }
}

use catalog_logging::{catalog_debug, catalog_warn};

use crate::{CatalogError, Deduplicator, Epoch, FilterStore, ImageId, ImageRecord, ListParams};

/// Page size shared by requests and the end-of-results heuristic.
pub const PAGE_SIZE: u32 = 20;

/// A page fetch to perform, stamped with the epoch it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub epoch: Epoch,
    pub params: ListParams,
}

impl PageRequest {
    pub fn page(&self) -> u32 {
        self.params.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page 1 replaced the feed contents.
    Replaced { count: usize },
    /// A continuation page appended its unique entries.
    Appended { added: usize, duplicates: usize },
    /// The fetch failed; existing items were kept and paging stopped.
    Failed,
    /// The response belongs to a superseded epoch or page and was ignored.
    Stale,
}

/// Ordered, deduplicated, incrementally loaded result list for one epoch.
///
/// `has_more` is inferred from batch size: a full page means "maybe more",
/// a short page means "done". The remote exposes no total or cursor, so an
/// exactly-full last page costs one extra empty request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedFeed {
    epoch: Epoch,
    items: Vec<ImageRecord>,
    dedupe: Deduplicator,
    has_more: bool,
    loading: bool,
    started: bool,
    pending_page: Option<u32>,
    last_error: Option<CatalogError>,
    page_size: u32,
}

impl Default for PaginatedFeed {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl PaginatedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            epoch: Epoch::default(),
            items: Vec::new(),
            dedupe: Deduplicator::new(),
            has_more: true,
            loading: false,
            started: false,
            pending_page: None,
            last_error: None,
            page_size: page_size.max(1),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn items(&self) -> &[ImageRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn seen_count(&self) -> usize {
        self.dedupe.len()
    }

    pub fn get(&self, id: &ImageId) -> Option<&ImageRecord> {
        self.items.iter().find(|record| &record.id == id)
    }

    /// Drops items, seen ids and paging state together and adopts `epoch`.
    pub fn reset(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        self.items.clear();
        self.dedupe.reset();
        self.has_more = true;
        self.loading = false;
        self.started = false;
        self.pending_page = None;
        self.last_error = None;
    }

    /// Starts loading page 1 of the store's current epoch.
    pub fn load_first_page(&mut self, store: &FilterStore) -> PageRequest {
        if store.epoch() != self.epoch {
            self.reset(store.epoch());
        }
        self.last_error = None;
        self.started = true;
        self.begin(store, 1)
    }

    /// Starts loading the next page, or returns `None` while a load is in
    /// flight or after the end of results. The loading flag is set before the
    /// request leaves, so a second trigger cannot issue a duplicate fetch.
    pub fn load_more(&mut self, store: &mut FilterStore) -> Option<PageRequest> {
        if self.loading || !self.has_more || !self.started || store.epoch() != self.epoch {
            return None;
        }
        store.advance_page();
        Some(self.begin(store, store.filter().page))
    }

    fn begin(&mut self, store: &FilterStore, page: u32) -> PageRequest {
        self.loading = true;
        self.pending_page = Some(page);
        let mut params = store.params(self.page_size);
        params.page = page;
        PageRequest {
            epoch: self.epoch,
            params,
        }
    }

    /// Applies a fetch result. Results for another epoch or an unexpected page
    /// leave the feed untouched.
    pub fn apply_page(
        &mut self,
        epoch: Epoch,
        page: u32,
        result: Result<Vec<ImageRecord>, CatalogError>,
    ) -> PageOutcome {
        if epoch != self.epoch || self.pending_page != Some(page) {
            catalog_debug!(
                "Discarding stale page {} of epoch {} (current epoch {}, pending {:?})",
                page,
                epoch,
                self.epoch,
                self.pending_page
            );
            return PageOutcome::Stale;
        }
        self.pending_page = None;
        self.loading = false;

        let batch = match result {
            Ok(batch) => batch,
            Err(err) => {
                catalog_warn!("Page {} of epoch {} failed: {}", page, epoch, err);
                self.has_more = false;
                self.last_error = Some(err);
                return PageOutcome::Failed;
            }
        };

        let full_page = batch.len() == self.page_size as usize;
        let received = batch.len();
        if page == 1 {
            self.items.clear();
            self.dedupe.reset();
            self.items = self.dedupe.filter_new(batch);
            self.has_more = full_page;
            PageOutcome::Replaced {
                count: self.items.len(),
            }
        } else {
            let fresh = self.dedupe.filter_new(batch);
            let added = fresh.len();
            self.items.extend(fresh);
            // A full page made only of repeats means the remote is replaying
            // earlier results; paging further would loop forever.
            self.has_more = full_page && added > 0;
            PageOutcome::Appended {
                added,
                duplicates: received - added,
            }
        }
    }
}

//! Catalog core: pure state machine for the filtered image feed and the
//! scrape job poller.
mod dedupe;
mod effect;
mod error;
mod feed;
mod filter;
mod image;
mod msg;
mod poller;
mod state;
mod update;
mod view_model;

pub use dedupe::Deduplicator;
pub use effect::Effect;
pub use error::CatalogError;
pub use feed::{PageOutcome, PageRequest, PaginatedFeed, PAGE_SIZE};
pub use filter::{
    Epoch, Filter, FilterPatch, FilterStore, ListParams, SortOption, SortOrder, Source,
    DEFAULT_CATEGORY,
};
pub use image::{
    CatalogStats, CountEntry, ImageId, ImageRecord, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
    FALLBACK_CATEGORY,
};
pub use msg::Msg;
pub use poller::{
    category_from_message, JobStatus, PollStep, PollerPhase, ScrapeJob, ScrapeRequest,
    ScrapeTicket, TaskId, TaskPoller, TaskStatusReport, JOB_IMAGES_LIMIT, MAX_SCRAPE_IMAGES,
};
pub use state::CatalogState;
pub use update::update;
pub use view_model::{CatalogViewModel, ScrapeView};

use crate::{ListParams, PageRequest, ScrapeRequest, TaskId};

/// Side effects requested by [`crate::update`]; executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(PageRequest),
    FetchStats,
    SubmitScrape(ScrapeRequest),
    StartPolling { task_id: TaskId },
    StopPolling { task_id: TaskId },
    FetchJobImages { task_id: TaskId, params: ListParams },
}

use std::time::Duration;

use catalog_core::{Effect, Msg};
use catalog_engine::{EngineEvent, EngineHandle};
use catalog_logging::{catalog_debug, catalog_info, catalog_warn};

/// Hands effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => {
                    catalog_debug!(
                        "FetchPage epoch={} page={}",
                        request.epoch,
                        request.page()
                    );
                    self.engine.fetch_page(request.epoch, request.params);
                }
                Effect::FetchStats => self.engine.fetch_stats(),
                Effect::SubmitScrape(request) => {
                    catalog_info!(
                        "SubmitScrape category='{}' max_images={}",
                        request.category,
                        request.max_images
                    );
                    self.engine.submit_scrape(request);
                }
                Effect::StartPolling { task_id } => self.engine.start_polling(task_id),
                Effect::StopPolling { task_id } => self.engine.stop_polling(task_id),
                Effect::FetchJobImages { task_id, params } => {
                    self.engine.fetch_job_images(task_id, params)
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PageFetched {
            epoch,
            page,
            result,
        } => Msg::PageLoaded {
            epoch,
            page,
            result: result.map_err(Into::into),
        },
        EngineEvent::StatsFetched(result) => {
            if let Err(err) = &result {
                catalog_warn!("Stats fetch failed: {}", err);
            }
            Msg::StatsLoaded(result.map_err(Into::into))
        }
        EngineEvent::ScrapeSubmitted(result) => Msg::ScrapeAccepted(result.map_err(Into::into)),
        EngineEvent::TaskStatus { task_id, result } => Msg::TaskStatusReceived {
            task_id,
            result: result.map_err(Into::into),
        },
        EngineEvent::JobImagesFetched { task_id, result } => Msg::JobImagesLoaded {
            task_id,
            result: result.map_err(Into::into),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{CatalogError, TaskId};
    use catalog_engine::{ApiError, FailureKind};

    #[test]
    fn not_found_status_keeps_its_kind() {
        let msg = map_event(EngineEvent::TaskStatus {
            task_id: TaskId::new("t"),
            result: Err(ApiError {
                kind: FailureKind::NotFound,
                message: "/api/v1/scrape/t".to_string(),
            }),
        });
        match msg {
            Msg::TaskStatusReceived { result: Err(err), .. } => assert!(err.is_not_found()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_failures_become_transport_errors() {
        let msg = map_event(EngineEvent::StatsFetched(Err(ApiError {
            kind: FailureKind::HttpStatus(502),
            message: "502 Bad Gateway".to_string(),
        })));
        assert_eq!(
            msg,
            Msg::StatsLoaded(Err(CatalogError::Transport(
                "http status 502: 502 Bad Gateway".to_string()
            )))
        );
    }
}

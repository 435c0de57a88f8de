use catalog_logging::{catalog_debug, catalog_info};

use crate::{CatalogState, Effect, Msg, PageOutcome, PollStep};

/// Pure update function: applies a message to state and returns any effects.
///
/// Epoch changes reset the feed inside the same call that returns the new
/// page-1 request, so no request for a superseded query can be issued.
pub fn update(mut state: CatalogState, msg: Msg) -> (CatalogState, Vec<Effect>) {
    let effects = match msg {
        Msg::Init => {
            let request = if state.filters().filter().page == 1 {
                state.load_first_page()
            } else {
                state.start_epoch(|filters| filters.refresh())
            };
            vec![Effect::FetchPage(request), Effect::FetchStats]
        }
        Msg::FiltersChanged(patch) => {
            let request = state.start_epoch(|filters| filters.update_filters(patch));
            vec![Effect::FetchPage(request)]
        }
        Msg::FiltersReset => {
            let request = state.start_epoch(|filters| filters.reset_filters());
            vec![Effect::FetchPage(request)]
        }
        Msg::Refresh => {
            let request = state.start_epoch(|filters| filters.refresh());
            vec![Effect::FetchPage(request)]
        }
        Msg::LoadMoreRequested => match state.load_more() {
            Some(request) => vec![Effect::FetchPage(request)],
            None => {
                catalog_debug!("Load more ignored (loading or end of results)");
                Vec::new()
            }
        },
        Msg::PageLoaded {
            epoch,
            page,
            result,
        } => {
            let outcome = state.feed_mut().apply_page(epoch, page, result);
            if outcome != PageOutcome::Stale {
                state.mark_dirty();
            }
            if let PageOutcome::Appended { duplicates, .. } = outcome {
                if duplicates > 0 {
                    catalog_debug!("Dropped {} duplicate images from page {}", duplicates, page);
                }
            }
            Vec::new()
        }
        Msg::StatsRequested => vec![Effect::FetchStats],
        Msg::StatsLoaded(result) => {
            state.set_stats(result);
            Vec::new()
        }
        Msg::ImageSelected(id) => {
            state.select(id);
            Vec::new()
        }
        Msg::ScrapeRequested {
            category,
            max_images,
        } => {
            state.mark_dirty();
            match state.poller_mut().submit(&category, max_images) {
                Ok(request) => {
                    catalog_info!(
                        "Submitting scrape category={} max_images={}",
                        request.category,
                        request.max_images
                    );
                    vec![Effect::SubmitScrape(request)]
                }
                Err(_) => Vec::new(),
            }
        }
        Msg::ScrapeAccepted(result) => {
            state.mark_dirty();
            match state.poller_mut().accept(result) {
                Some(task_id) => vec![Effect::StartPolling { task_id }],
                None => Vec::new(),
            }
        }
        Msg::TrackTask { task_id } => {
            state.mark_dirty();
            match state.poller_mut().track(task_id) {
                Ok(task_id) => vec![Effect::StartPolling { task_id }],
                Err(_) => Vec::new(),
            }
        }
        Msg::TaskStatusReceived { task_id, result } => {
            let step = state.poller_mut().apply_status(&task_id, result);
            if step != PollStep::Ignored {
                state.mark_dirty();
            }
            match step {
                PollStep::Ignored | PollStep::Continue => Vec::new(),
                PollStep::Completed { images } => vec![
                    Effect::StopPolling {
                        task_id: task_id.clone(),
                    },
                    Effect::FetchJobImages {
                        task_id,
                        params: images,
                    },
                ],
                PollStep::Failed | PollStep::Lost => vec![Effect::StopPolling { task_id }],
            }
        }
        Msg::JobImagesLoaded { task_id, result } => {
            if state.poller_mut().apply_job_images(&task_id, result) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::JobAcknowledged => {
            if state.poller_mut().acknowledge() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Shutdown => match state.poller_mut().teardown() {
            Some(task_id) => {
                state.mark_dirty();
                vec![Effect::StopPolling { task_id }]
            }
            None => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use catalog_core::{Epoch, ListParams, ScrapeRequest, TaskId};
use catalog_logging::{catalog_debug, catalog_error, catalog_info, catalog_warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, CatalogApi, ReqwestCatalogApi};
use crate::{ApiError, EngineEvent, FailureKind};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub api: ApiSettings,
    /// Delay between two status checks of one task.
    pub poll_interval: Duration,
    /// Upper bound for a single status check, on top of the request timeout.
    pub poll_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: Duration::from_millis(2000),
            poll_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PollTiming {
    interval: Duration,
    timeout: Duration,
}

enum EngineCommand {
    FetchPage { epoch: Epoch, params: ListParams },
    FetchStats,
    SubmitScrape(ScrapeRequest),
    StartPolling { task_id: TaskId },
    StopPolling { task_id: TaskId },
    FetchJobImages { task_id: TaskId, params: ListParams },
}

/// Runs remote calls on a background thread and reports results as
/// [`EngineEvent`]s. Dropping the handle cancels every poll loop.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    shutdown: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, ApiError> {
        let api = ReqwestCatalogApi::new(settings.api.clone())?;
        Ok(Self::with_api(Arc::new(api), settings))
    }

    /// Uses `api` for every remote call; `settings.api` is ignored.
    pub fn with_api(api: Arc<dyn CatalogApi>, settings: EngineSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let timing = PollTiming {
            interval: settings.poll_interval.max(Duration::from_millis(1)),
            timeout: settings.poll_timeout,
        };

        let worker_shutdown = shutdown.clone();
        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    catalog_error!("Engine runtime could not start: {}", err);
                    return;
                }
            };
            let mut polls: HashMap<TaskId, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                if worker_shutdown.is_cancelled() {
                    break;
                }
                polls.retain(|_, token| !token.is_cancelled());
                match command {
                    EngineCommand::StartPolling { task_id } => {
                        if let Some(previous) = polls.remove(&task_id) {
                            previous.cancel();
                        }
                        let token = worker_shutdown.child_token();
                        polls.insert(task_id.clone(), token.clone());
                        catalog_info!("Polling task {} every {:?}", task_id, timing.interval);
                        runtime.spawn(poll_loop(
                            api.clone(),
                            task_id,
                            timing,
                            token,
                            event_tx.clone(),
                        ));
                    }
                    EngineCommand::StopPolling { task_id } => {
                        if let Some(token) = polls.remove(&task_id) {
                            catalog_debug!("Stopping poll loop for task {}", task_id);
                            token.cancel();
                        }
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        let token = worker_shutdown.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                biased;
                                _ = token.cancelled() => {}
                                _ = handle_command(api.as_ref(), command, event_tx) => {}
                            }
                        });
                    }
                }
            }
            for token in polls.values() {
                token.cancel();
            }
            catalog_debug!("Engine thread stopped");
        });

        Self {
            cmd_tx,
            event_rx,
            shutdown,
        }
    }

    pub fn fetch_page(&self, epoch: Epoch, params: ListParams) {
        self.send(EngineCommand::FetchPage { epoch, params });
    }

    pub fn fetch_stats(&self) {
        self.send(EngineCommand::FetchStats);
    }

    pub fn submit_scrape(&self, request: ScrapeRequest) {
        self.send(EngineCommand::SubmitScrape(request));
    }

    /// Starts (or restarts) the status loop for `task_id`.
    pub fn start_polling(&self, task_id: TaskId) {
        self.send(EngineCommand::StartPolling { task_id });
    }

    pub fn stop_polling(&self, task_id: TaskId) {
        self.send(EngineCommand::StopPolling { task_id });
    }

    pub fn fetch_job_images(&self, task_id: TaskId, params: ListParams) {
        self.send(EngineCommand::FetchJobImages { task_id, params });
    }

    /// Cancels every poll loop and in-flight request. Later commands are ignored.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            catalog_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_command(
    api: &dyn CatalogApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchPage { epoch, params } => {
            let page = params.page;
            let result = api.list_images(&params).await;
            EngineEvent::PageFetched {
                epoch,
                page,
                result,
            }
        }
        EngineCommand::FetchStats => EngineEvent::StatsFetched(api.get_stats().await),
        EngineCommand::SubmitScrape(request) => {
            EngineEvent::ScrapeSubmitted(api.submit_scrape(&request).await)
        }
        EngineCommand::FetchJobImages { task_id, params } => {
            let result = api.list_images(&params).await;
            EngineEvent::JobImagesFetched { task_id, result }
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling { .. } => return,
    };
    let _ = event_tx.send(event);
}

/// Checks the task once per interval until it is cancelled, reaches a
/// terminal status, or the remote stops knowing it.
async fn poll_loop(
    api: Arc<dyn CatalogApi>,
    task_id: TaskId,
    timing: PollTiming,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut ticker = tokio::time::interval(timing.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            outcome = tokio::time::timeout(timing.timeout, api.task_status(&task_id)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::new(
                        FailureKind::Timeout,
                        format!("status check exceeded {:?}", timing.timeout),
                    )),
                }
            }
        };

        let finished = match &result {
            Ok(report) => report.status.is_terminal(),
            Err(err) => err.kind == FailureKind::NotFound,
        };
        if let Err(err) = &result {
            if !finished {
                catalog_warn!("Status check for task {} failed: {}", task_id, err);
            }
        }

        if token.is_cancelled() {
            break;
        }
        let event = EngineEvent::TaskStatus {
            task_id: task_id.clone(),
            result,
        };
        if event_tx.send(event).is_err() || finished {
            break;
        }
    }
    token.cancel();
    catalog_debug!("Poll loop for task {} ended", task_id);
}

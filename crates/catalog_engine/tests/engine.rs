use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catalog_core::{
    CatalogStats, Epoch, FilterStore, ImageRecord, JobStatus, ListParams, ScrapeRequest,
    ScrapeTicket, TaskId, TaskStatusReport,
};
use catalog_engine::{
    ApiError, CatalogApi, EngineEvent, EngineHandle, EngineSettings, FailureKind,
};

const WAIT: Duration = Duration::from_secs(2);

/// Scripted remote: status checks pop from `statuses`, then repeat `running`.
#[derive(Default)]
struct FakeApi {
    statuses: Mutex<VecDeque<Result<TaskStatusReport, ApiError>>>,
    status_calls: AtomicUsize,
    status_delay: Option<Duration>,
}

impl FakeApi {
    fn with_statuses(statuses: Vec<Result<TaskStatusReport, ApiError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

fn report(status: JobStatus) -> Result<TaskStatusReport, ApiError> {
    Ok(TaskStatusReport {
        status,
        message: None,
    })
}

#[async_trait::async_trait]
impl CatalogApi for FakeApi {
    async fn list_images(&self, params: &ListParams) -> Result<Vec<ImageRecord>, ApiError> {
        Ok((0..params.limit.min(3))
            .map(|i| {
                let id = format!("p{}-{}", params.page, i);
                ImageRecord::new(id.clone(), id.clone(), format!("https://img/{id}"))
            })
            .collect())
    }

    async fn get_stats(&self) -> Result<CatalogStats, ApiError> {
        Ok(CatalogStats {
            total_images: 3,
            ..CatalogStats::default()
        })
    }

    async fn submit_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeTicket, ApiError> {
        Ok(ScrapeTicket {
            task_id: TaskId::new(format!("task-{}", request.category)),
            status: JobStatus::Running,
            message: None,
        })
    }

    async fn task_status(&self, _task_id: &TaskId) -> Result<TaskStatusReport, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| report(JobStatus::Running))
    }
}

fn settings(interval_ms: u64) -> EngineSettings {
    EngineSettings {
        poll_interval: Duration::from_millis(interval_ms),
        poll_timeout: Duration::from_millis(200),
        ..EngineSettings::default()
    }
}

fn next_status(engine: &EngineHandle) -> Option<(TaskId, Result<TaskStatusReport, ApiError>)> {
    match engine.recv_timeout(WAIT)? {
        EngineEvent::TaskStatus { task_id, result } => Some((task_id, result)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn page_fetch_reports_epoch_and_page() {
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), settings(20));
    let mut params = FilterStore::new().params(20);
    params.page = 2;
    engine.fetch_page(Epoch::default(), params);

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::PageFetched {
            epoch,
            page,
            result,
        }) => {
            assert_eq!(epoch, Epoch::default());
            assert_eq!(page, 2);
            assert_eq!(result.expect("page").len(), 3);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn stats_and_submission_round_trip_through_events() {
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), settings(20));
    engine.fetch_stats();
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::StatsFetched(Ok(stats))) => assert_eq!(stats.total_images, 3),
        other => panic!("unexpected event {other:?}"),
    }

    engine.submit_scrape(ScrapeRequest {
        category: "dogs".to_string(),
        max_images: 10,
    });
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::ScrapeSubmitted(Ok(ticket))) => {
            assert_eq!(ticket.task_id, TaskId::new("task-dogs"))
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn poll_loop_ends_after_terminal_status() {
    let api = Arc::new(FakeApi::with_statuses(vec![
        report(JobStatus::Running),
        report(JobStatus::Completed),
    ]));
    let engine = EngineHandle::with_api(api.clone(), settings(20));
    let task = TaskId::new("t1");
    engine.start_polling(task.clone());

    let (id, first) = next_status(&engine).expect("first tick");
    assert_eq!(id, task);
    assert_eq!(first.expect("status").status, JobStatus::Running);
    let (_, second) = next_status(&engine).expect("second tick");
    assert_eq!(second.expect("status").status, JobStatus::Completed);

    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(api.calls(), 2);
    assert!(engine.try_recv().is_none());
}

#[test]
fn poll_loop_ends_when_task_is_unknown() {
    let api = Arc::new(FakeApi::with_statuses(vec![Err(ApiError {
        kind: FailureKind::NotFound,
        message: "Task not found".to_string(),
    })]));
    let engine = EngineHandle::with_api(api.clone(), settings(20));
    engine.start_polling(TaskId::new("lost"));

    let (_, result) = next_status(&engine).expect("one tick");
    assert_eq!(result.expect_err("lost").kind, FailureKind::NotFound);
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(api.calls(), 1);
}

#[test]
fn transient_errors_keep_polling() {
    let api = Arc::new(FakeApi::with_statuses(vec![
        Err(ApiError {
            kind: FailureKind::Network,
            message: "connection refused".to_string(),
        }),
        report(JobStatus::Failed),
    ]));
    let engine = EngineHandle::with_api(api.clone(), settings(20));
    engine.start_polling(TaskId::new("flaky"));

    let (_, first) = next_status(&engine).expect("first tick");
    assert_eq!(first.expect_err("transient").kind, FailureKind::Network);
    let (_, second) = next_status(&engine).expect("second tick");
    assert_eq!(second.expect("status").status, JobStatus::Failed);
}

#[test]
fn stop_polling_prevents_further_status_requests() {
    let api = Arc::new(FakeApi::default());
    let engine = EngineHandle::with_api(api.clone(), settings(30));
    let task = TaskId::new("t2");
    engine.start_polling(task.clone());
    next_status(&engine).expect("first tick");

    engine.stop_polling(task);
    std::thread::sleep(Duration::from_millis(60));
    let calls = api.calls();
    while engine.try_recv().is_some() {}
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(api.calls(), calls);
    assert!(engine.try_recv().is_none());
}

#[test]
fn slow_status_checks_are_reported_as_timeouts() {
    let api = Arc::new(FakeApi {
        status_delay: Some(Duration::from_millis(500)),
        ..FakeApi::default()
    });
    let engine = EngineHandle::with_api(api, settings(20));
    engine.start_polling(TaskId::new("slow"));

    let (_, result) = next_status(&engine).expect("tick");
    assert_eq!(result.expect_err("timed out").kind, FailureKind::Timeout);
}

#[test]
fn dropping_the_handle_cancels_polling() {
    let api = Arc::new(FakeApi::default());
    let engine = EngineHandle::with_api(api.clone(), settings(20));
    engine.start_polling(TaskId::new("t3"));
    next_status(&engine).expect("first tick");

    drop(engine);
    std::thread::sleep(Duration::from_millis(60));
    let calls = api.calls();
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(api.calls(), calls);
}

use std::fmt;
use std::str::FromStr;

use catalog_logging::{catalog_debug, catalog_info, catalog_warn};

use crate::{CatalogError, ImageRecord, ListParams};

/// Largest scrape a single job may request.
pub const MAX_SCRAPE_IMAGES: u32 = 1000;
/// Upper bound of the one-shot listing fetched when a job completes.
pub const JOB_IMAGES_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(CatalogError::Transport(format!(
                "unknown job status '{other}'"
            ))),
        }
    }
}

/// Validated body of a scrape submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub category: String,
    pub max_images: u32,
}

/// Remote acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTicket {
    pub task_id: TaskId,
    pub status: JobStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusReport {
    pub status: JobStatus,
    pub message: Option<String>,
}

/// The one job tracked by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeJob {
    pub id: TaskId,
    pub status: JobStatus,
    pub message: Option<String>,
    /// Category requested at submission; unknown for jobs attached by id.
    pub category: Option<String>,
    pub max_images: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
    NotFound,
}

impl PollerPhase {
    pub fn is_active(self) -> bool {
        matches!(self, PollerPhase::Submitting | PollerPhase::Polling)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollerPhase::Completed | PollerPhase::Failed | PollerPhase::NotFound
        )
    }
}

/// What the dispatcher must do after a status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Report for a job we are not polling.
    Ignored,
    /// Still pending/running, or a transient error; keep polling.
    Continue,
    /// Stop polling and fetch the job's images with these parameters.
    Completed { images: ListParams },
    /// Stop polling; the job reported failure.
    Failed,
    /// Stop polling; the remote no longer knows the job.
    Lost,
}

/// Drives at most one scrape job: `Idle → Submitting → Polling → {Completed, Failed, NotFound}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPoller {
    phase: PollerPhase,
    pending: Option<ScrapeRequest>,
    job: Option<ScrapeJob>,
    last_error: Option<CatalogError>,
    job_images: Vec<ImageRecord>,
    images_loading: bool,
}

impl TaskPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PollerPhase {
        self.phase
    }

    pub fn job(&self) -> Option<&ScrapeJob> {
        self.job.as_ref()
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.job.as_ref().map(|job| &job.id)
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    pub fn job_images(&self) -> &[ImageRecord] {
        &self.job_images
    }

    pub fn images_loading(&self) -> bool {
        self.images_loading
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Validates and records a submission. Rejected while another job is
    /// submitting or polling; an unacknowledged terminal job is replaced.
    pub fn submit(&mut self, category: &str, max_images: u32) -> Result<ScrapeRequest, CatalogError> {
        let category = match self.validate_submission(category, max_images) {
            Ok(category) => category,
            Err(err) => {
                catalog_warn!("Scrape request rejected: {}", err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let request = ScrapeRequest {
            category,
            max_images,
        };
        self.phase = PollerPhase::Submitting;
        self.pending = Some(request.clone());
        self.job = None;
        self.last_error = None;
        self.job_images.clear();
        self.images_loading = false;
        Ok(request)
    }

    fn validate_submission(&self, category: &str, max_images: u32) -> Result<String, CatalogError> {
        if self.is_active() {
            return Err(CatalogError::Validation(
                "a scrape job is already in progress".to_string(),
            ));
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(CatalogError::Validation(
                "category must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_SCRAPE_IMAGES).contains(&max_images) {
            return Err(CatalogError::Validation(format!(
                "max images must be between 1 and {MAX_SCRAPE_IMAGES}, got {max_images}"
            )));
        }
        Ok(category.to_string())
    }

    /// Applies the submission response. Returns the task to start polling.
    pub fn accept(&mut self, result: Result<ScrapeTicket, CatalogError>) -> Option<TaskId> {
        if self.phase != PollerPhase::Submitting {
            catalog_debug!("Ignoring submission response in phase {:?}", self.phase);
            return None;
        }
        let request = self.pending.take();
        match result {
            Ok(ticket) => {
                catalog_info!("Scrape job {} accepted ({})", ticket.task_id, ticket.status.as_str());
                self.phase = PollerPhase::Polling;
                self.job = Some(ScrapeJob {
                    id: ticket.task_id.clone(),
                    status: ticket.status,
                    message: ticket.message,
                    category: request.as_ref().map(|r| r.category.clone()),
                    max_images: request.as_ref().map(|r| r.max_images),
                });
                Some(ticket.task_id)
            }
            Err(err) => {
                catalog_warn!("Scrape submission failed: {}", err);
                self.phase = PollerPhase::Idle;
                self.last_error = Some(err);
                None
            }
        }
    }

    /// Attaches to a job submitted elsewhere. Its category is recovered from
    /// the status message once the job completes.
    pub fn track(&mut self, task_id: TaskId) -> Result<TaskId, CatalogError> {
        let task_id = match self.validate_track(task_id) {
            Ok(task_id) => task_id,
            Err(err) => {
                catalog_warn!("Track request rejected: {}", err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        self.phase = PollerPhase::Polling;
        self.pending = None;
        self.last_error = None;
        self.job_images.clear();
        self.images_loading = false;
        self.job = Some(ScrapeJob {
            id: task_id.clone(),
            status: JobStatus::Pending,
            message: None,
            category: None,
            max_images: None,
        });
        Ok(task_id)
    }

    fn validate_track(&self, task_id: TaskId) -> Result<TaskId, CatalogError> {
        if self.is_active() {
            return Err(CatalogError::Validation(
                "a scrape job is already in progress".to_string(),
            ));
        }
        let trimmed = task_id.as_str().trim();
        if trimmed.is_empty() {
            return Err(CatalogError::Validation("task id must not be empty".to_string()));
        }
        Ok(TaskId::new(trimmed))
    }

    /// Applies one poll result for `task_id`.
    pub fn apply_status(
        &mut self,
        task_id: &TaskId,
        result: Result<TaskStatusReport, CatalogError>,
    ) -> PollStep {
        if self.phase != PollerPhase::Polling || self.task_id() != Some(task_id) {
            catalog_debug!("Ignoring status for task {} in phase {:?}", task_id, self.phase);
            return PollStep::Ignored;
        }

        let report = match result {
            Ok(report) => report,
            Err(CatalogError::NotFound(message)) => {
                catalog_warn!("Task {} is unknown to the remote: {}", task_id, message);
                self.phase = PollerPhase::NotFound;
                self.job = None;
                return PollStep::Lost;
            }
            Err(err) => {
                catalog_warn!("Status check for task {} failed, will retry: {}", task_id, err);
                self.last_error = Some(err);
                return PollStep::Continue;
            }
        };

        self.last_error = None;
        let Some(job) = self.job.as_mut() else {
            return PollStep::Ignored;
        };
        job.status = report.status;
        if report.message.is_some() {
            job.message = report.message;
        }

        match report.status {
            JobStatus::Pending | JobStatus::Running => PollStep::Continue,
            JobStatus::Completed => {
                catalog_info!("Scrape job {} completed", task_id);
                self.phase = PollerPhase::Completed;
                self.images_loading = true;
                PollStep::Completed {
                    images: ListParams::recent_in_category(
                        self.resolved_category(),
                        JOB_IMAGES_LIMIT,
                    ),
                }
            }
            JobStatus::Failed => {
                let message = job
                    .message
                    .clone()
                    .unwrap_or_else(|| "scrape job failed".to_string());
                catalog_warn!("Scrape job {} failed: {}", task_id, message);
                self.phase = PollerPhase::Failed;
                self.last_error = Some(CatalogError::RemoteFailure(message));
                PollStep::Failed
            }
        }
    }

    /// Applies the one-shot listing fetched after completion.
    pub fn apply_job_images(
        &mut self,
        task_id: &TaskId,
        result: Result<Vec<ImageRecord>, CatalogError>,
    ) -> bool {
        if !self.images_loading || self.task_id() != Some(task_id) {
            return false;
        }
        self.images_loading = false;
        match result {
            Ok(images) => {
                catalog_info!("Loaded {} images for job {}", images.len(), task_id);
                self.job_images = images;
            }
            Err(err) => {
                catalog_warn!("Loading images for job {} failed: {}", task_id, err);
                self.last_error = Some(err);
            }
        }
        true
    }

    /// The requested category is authoritative; the message is only consulted
    /// for jobs attached by id.
    pub fn resolved_category(&self) -> Option<String> {
        let job = self.job.as_ref()?;
        job.category
            .clone()
            .or_else(|| job.message.as_deref().and_then(category_from_message))
    }

    /// Returns a terminal poller to `Idle`. Job images stay visible until the
    /// next submission, so a job whose images are still loading is kept.
    pub fn acknowledge(&mut self) -> bool {
        if !self.phase.is_terminal() || self.images_loading {
            return false;
        }
        self.phase = PollerPhase::Idle;
        self.job = None;
        self.pending = None;
        self.images_loading = false;
        true
    }

    /// Abandons any job. Returns the task whose polling must be cancelled.
    pub fn teardown(&mut self) -> Option<TaskId> {
        let polling = (self.phase == PollerPhase::Polling)
            .then(|| self.task_id().cloned())
            .flatten();
        self.phase = PollerPhase::Idle;
        self.job = None;
        self.pending = None;
        self.images_loading = false;
        polling
    }
}

/// Extracts the text between the first pair of single quotes, as in
/// `Successfully downloaded 12 images for category 'nature'`.
pub fn category_from_message(message: &str) -> Option<String> {
    let mut parts = message.split('\'');
    parts.next()?;
    let candidate = parts.next()?;
    // Without a closing quote there is no delimited value.
    parts.next()?;
    let candidate = candidate.trim();
    (!candidate.is_empty()).then(|| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_read_between_quotes() {
        assert_eq!(
            category_from_message("Download started for category 'nature'"),
            Some("nature".to_string())
        );
        assert_eq!(category_from_message("no quotes here"), None);
        assert_eq!(category_from_message("dangling 'quote"), None);
        assert_eq!(category_from_message("empty '' value"), None);
    }

    #[test]
    fn submit_validates_category_and_count() {
        let mut poller = TaskPoller::new();
        assert!(matches!(poller.submit("  ", 10), Err(CatalogError::Validation(_))));
        assert!(matches!(poller.submit("cats", 0), Err(CatalogError::Validation(_))));
        assert!(matches!(poller.submit("cats", 1001), Err(CatalogError::Validation(_))));
        assert_eq!(poller.phase(), PollerPhase::Idle);

        let request = poller.submit(" cats ", 1000).unwrap();
        assert_eq!(request.category, "cats");
        assert_eq!(poller.phase(), PollerPhase::Submitting);
    }

    #[test]
    fn second_submit_is_rejected_while_active() {
        let mut poller = TaskPoller::new();
        poller.submit("cats", 5).unwrap();
        assert!(poller.submit("dogs", 5).is_err());
        poller.accept(Ok(ScrapeTicket {
            task_id: "t1".into(),
            status: JobStatus::Running,
            message: None,
        }));
        assert!(poller.submit("dogs", 5).is_err());
        assert!(poller.track("t2".into()).is_err());
    }

    #[test]
    fn tracked_job_takes_category_from_message() {
        let mut poller = TaskPoller::new();
        let task: TaskId = "abc".into();
        poller.track(task.clone()).unwrap();
        let step = poller.apply_status(
            &task,
            Ok(TaskStatusReport {
                status: JobStatus::Completed,
                message: Some("Successfully downloaded 3 images for category 'food'".into()),
            }),
        );
        match step {
            PollStep::Completed { images } => {
                assert_eq!(images.category.as_deref(), Some("food"));
                assert_eq!(images.limit, JOB_IMAGES_LIMIT);
                assert_eq!(images.page, 1);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn rejected_track_records_the_reason() {
        let mut poller = TaskPoller::new();
        assert!(poller.track("  ".into()).is_err());
        assert_eq!(poller.phase(), PollerPhase::Idle);
        assert!(matches!(poller.last_error(), Some(CatalogError::Validation(_))));

        assert_eq!(poller.track(" abc ".into()), Ok(TaskId::new("abc")));
        assert_eq!(poller.last_error(), None);
    }

    #[test]
    fn acknowledge_waits_for_job_images() {
        let mut poller = TaskPoller::new();
        let task: TaskId = "abc".into();
        poller.track(task.clone()).unwrap();
        poller.apply_status(
            &task,
            Ok(TaskStatusReport {
                status: JobStatus::Completed,
                message: Some("done for category 'food'".into()),
            }),
        );
        assert!(poller.images_loading());
        assert!(!poller.acknowledge());
        assert_eq!(poller.phase(), PollerPhase::Completed);

        let images = vec![ImageRecord::new("f1", "soup", "https://cdn/f1.jpg")];
        assert!(poller.apply_job_images(&task, Ok(images.clone())));
        assert!(poller.acknowledge());
        assert_eq!(poller.phase(), PollerPhase::Idle);
        assert_eq!(poller.job_images(), images.as_slice());
    }

    #[test]
    fn teardown_reports_task_to_cancel() {
        let mut poller = TaskPoller::new();
        poller.track("abc".into()).unwrap();
        assert_eq!(poller.teardown(), Some(TaskId::new("abc")));
        assert_eq!(poller.phase(), PollerPhase::Idle);
        assert_eq!(poller.teardown(), None);
    }
}

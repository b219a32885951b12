//! Drives one download from submission to a saved artifact.
//!
//! The controller owns a single [`Session`]. A new submission or a reset
//! bumps the session generation; every asynchronous continuation captures
//! the generation it was started under and is dropped if it no longer
//! matches. The polling timer is a spawned task owned through a
//! [`CancellationToken`] and exists exactly while the state is `Polling`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::artifact::ArtifactSaver;
use crate::backend::Backend;
use crate::config::{POLL_INTERVAL, SAVE_RESET_DELAY};
use crate::errors::ClientError;
use crate::history::{entry_now, HistoryRecorder};
use crate::types::{DownloadRequest, MediaKind, Quality, StatusReport, TaskStatus};

const DEFAULT_FILENAME: &str = "Download";

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Idle,
    Submitting,
    Polling {
        task_id: String,
    },
    Ready {
        task_id: String,
        filename: String,
        file_size: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Submitting | SessionState::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ready { .. } | SessionState::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub task_id: Option<String>,
    pub submitted_url: String,
    pub kind: MediaKind,
    pub quality: Quality,
    pub state: SessionState,
    pub last_status: Option<StatusReport>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            task_id: None,
            submitted_url: String::new(),
            kind: MediaKind::Video,
            quality: Quality::Best,
            state: SessionState::Idle,
            last_status: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub save_reset_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            save_reset_delay: SAVE_RESET_DELAY,
        }
    }
}

/// What happened to a status report handed to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Progress,
    Finished,
    Discarded,
}

struct Inner {
    session: Session,
    generation: u64,
    poll_timer: Option<CancellationToken>,
    reset_timer: Option<CancellationToken>,
}

impl Inner {
    fn stop_timers(&mut self) {
        if let Some(token) = self.poll_timer.take() {
            token.cancel();
        }
        if let Some(token) = self.reset_timer.take() {
            token.cancel();
        }
    }

    fn stop_polling(&mut self) {
        if let Some(token) = self.poll_timer.take() {
            token.cancel();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    backend: Arc<dyn Backend>,
    history: Arc<HistoryRecorder>,
    saver: Arc<dyn ArtifactSaver>,
    transfers: TaskTracker,
    snapshots: watch::Sender<Session>,
    options: SessionOptions,
}

#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn Backend>,
        history: Arc<HistoryRecorder>,
        saver: Arc<dyn ArtifactSaver>,
        options: SessionOptions,
    ) -> Self {
        let (snapshots, _) = watch::channel(Session::default());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    session: Session::default(),
                    generation: 0,
                    poll_timer: None,
                    reset_timer: None,
                }),
                backend,
                history,
                saver,
                transfers: TaskTracker::new(),
                snapshots,
                options,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> Session {
        self.shared.inner.lock().await.session.clone()
    }

    #[cfg(test)]
    pub async fn has_poll_timer(&self) -> bool {
        self.shared.inner.lock().await.poll_timer.is_some()
    }

    fn publish(&self, inner: &Inner) {
        self.shared.snapshots.send_replace(inner.session.clone());
    }

    /// Edits the url field. Ignored while a submission is in flight.
    pub async fn set_url(&self, url: &str) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if inner.session.state.is_loading() {
            debug!("url is locked while a download is in progress");
            return false;
        }
        inner.session.submitted_url = url.to_string();
        self.publish(&inner);
        true
    }

    pub async fn submit(
        &self,
        url: &str,
        kind: MediaKind,
        quality: Quality,
    ) -> Result<(), ClientError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ClientError::EmptyUrl);
        }

        let quality = quality.for_kind(kind);
        let request = DownloadRequest {
            url: url.to_string(),
            format: kind,
            quality,
        };

        let generation = {
            let mut inner = self.shared.inner.lock().await;
            inner.stop_timers();
            inner.generation += 1;
            inner.session = Session {
                task_id: None,
                submitted_url: url.to_string(),
                kind,
                quality,
                state: SessionState::Submitting,
                last_status: Some(StatusReport::starting()),
            };
            self.publish(&inner);
            inner.generation
        };
        info!("submitting {url} as {} ({})", kind.as_str(), quality.as_str());

        let result = self.shared.backend.submit(&request).await;

        let mut inner = self.shared.inner.lock().await;
        if inner.generation != generation {
            debug!("submit response for superseded session dropped");
            return Ok(());
        }

        match result {
            Ok(task_id) => {
                info!("task {task_id} accepted");
                let token = CancellationToken::new();
                inner.session.task_id = Some(task_id.clone());
                inner.session.state = SessionState::Polling {
                    task_id: task_id.clone(),
                };
                inner.poll_timer = Some(token.clone());
                self.publish(&inner);
                drop(inner);

                let controller = self.clone();
                tokio::spawn(async move {
                    controller.poll_loop(task_id, generation, token).await;
                });
            }
            Err(err) => {
                let message = match err {
                    ClientError::SubmissionFailed(message) => message,
                    other => other.to_string(),
                };
                warn!("submit failed: {message}");
                inner.session.state = SessionState::Failed {
                    message: message.clone(),
                };
                inner.session.last_status = Some(StatusReport::new(TaskStatus::Error, message));
                self.publish(&inner);
            }
        }
        Ok(())
    }

    /// One tick per interval, each awaited before the next is issued.
    async fn poll_loop(&self, task_id: String, generation: u64, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.shared.options.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = self.shared.backend.poll(&task_id) => result,
            };

            match result {
                Ok(report) => {
                    if self.apply_report(generation, &task_id, report).await
                        != ReportOutcome::Progress
                    {
                        break;
                    }
                }
                Err(err) => warn!("poll for {task_id} failed, retrying: {err}"),
            }
        }
        debug!("polling for {task_id} stopped");
    }

    /// Folds a status report into the session if it still belongs to it.
    pub async fn apply_report(
        &self,
        generation: u64,
        task_id: &str,
        report: StatusReport,
    ) -> ReportOutcome {
        let mut inner = self.shared.inner.lock().await;
        let current = matches!(
            &inner.session.state,
            SessionState::Polling { task_id: polling } if polling == task_id
        );
        if inner.generation != generation || !current {
            debug!("stale report for {task_id} dropped");
            return ReportOutcome::Discarded;
        }

        let report = report.clamp_progress();
        match report.status {
            TaskStatus::Queued | TaskStatus::Downloading => {
                inner.session.last_status = Some(report);
                self.publish(&inner);
                ReportOutcome::Progress
            }
            TaskStatus::Ready => {
                inner.stop_polling();
                let filename = report
                    .filename
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
                inner.session.state = SessionState::Ready {
                    task_id: task_id.to_string(),
                    filename: filename.clone(),
                    file_size: report.file_size_str.clone(),
                };
                inner.session.last_status = Some(report);
                let entry = entry_now(&inner.session.submitted_url, &filename, inner.session.kind);
                self.publish(&inner);
                drop(inner);

                info!("task {task_id} ready: {filename}");
                self.shared.history.record(entry).await;
                ReportOutcome::Finished
            }
            TaskStatus::Error => {
                inner.stop_polling();
                warn!("task {task_id} failed: {}", report.message);
                inner.session.state = SessionState::Failed {
                    message: report.message.clone(),
                };
                inner.session.last_status = Some(report);
                self.publish(&inner);
                ReportOutcome::Finished
            }
        }
    }

    #[cfg(test)]
    pub async fn generation(&self) -> u64 {
        self.shared.inner.lock().await.generation
    }

    /// Starts the artifact transfer and schedules the return to `Idle`.
    pub async fn save(&self) -> Result<(), ClientError> {
        let mut inner = self.shared.inner.lock().await;
        let (task_id, filename) = match &inner.session.state {
            SessionState::Ready {
                task_id, filename, ..
            } => (task_id.clone(), filename.clone()),
            _ => return Err(ClientError::NotReady),
        };
        if inner.reset_timer.is_some() {
            debug!("save already in progress");
            return Ok(());
        }

        let url = self.shared.backend.artifact_url(&task_id);
        let saver = self.shared.saver.clone();
        self.shared.transfers.spawn(async move {
            if let Err(err) = saver.save(&url, &filename).await {
                error!("saving {filename} failed: {err:#}");
            }
        });

        let token = CancellationToken::new();
        inner.reset_timer = Some(token.clone());
        let generation = inner.generation;
        drop(inner);

        let controller = self.clone();
        let delay = self.shared.options.save_reset_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => controller.reset_after_save(generation).await,
            }
        });
        Ok(())
    }

    /// Artifact transfers started by `save` that have not finished yet.
    pub fn pending_transfers(&self) -> usize {
        self.shared.transfers.len()
    }

    /// Waits for every artifact transfer started so far.
    pub async fn wait_for_transfers(&self) {
        self.shared.transfers.close();
        self.shared.transfers.wait().await;
        self.shared.transfers.reopen();
    }

    async fn reset_after_save(&self, generation: u64) {
        let mut inner = self.shared.inner.lock().await;
        if inner.generation != generation {
            return;
        }
        inner.reset_timer = None;
        inner.generation += 1;
        let session = &mut inner.session;
        session.state = SessionState::Idle;
        session.task_id = None;
        session.last_status = None;
        session.submitted_url.clear();
        self.publish(&inner);
    }

    /// Forgets the current session. The url field is kept.
    pub async fn reset(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.stop_timers();
        inner.generation += 1;
        let session = &mut inner.session;
        session.state = SessionState::Idle;
        session.task_id = None;
        session.last_status = None;
        self.publish(&inner);
    }
}

//! Cancellable status polling for PDF summarization jobs.
//!
//! Each tracked job owns exactly one poll loop, keyed by job id and guarded
//! by a `CancellationToken`, so removal and teardown never leave an orphaned
//! timer behind. Every loop start gets a generation number, and a loop only
//! applies a poll result while it still owns its timer entry, so a response
//! arriving after the job was removed or restarted is discarded.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use hrgate_backend::{BackendClient, JobStatusPayload};
use hrgate_types::{JobState, TrackedJob, POLL_INTERVAL_MS};

/// Backend-reported job phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedState {
    Processing,
    Completed,
    Failed,
}

/// One status poll result
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub state: ReportedState,
    pub progress: Option<f32>,
    pub message: Option<String>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl StatusReport {
    /// Map the raw backend payload; unknown states keep the poll loop alive
    pub fn from_payload(payload: JobStatusPayload) -> Self {
        let state = match payload.status.as_str() {
            "completed" => ReportedState::Completed,
            "failed" => ReportedState::Failed,
            _ => ReportedState::Processing,
        };
        Self {
            state,
            progress: payload.progress,
            message: payload.message,
            result: payload.result,
            error: payload.error,
        }
    }
}

/// Where poll ticks get their answers from; the backend client in
/// production, a scripted stub in tests
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn status(&self, job_id: &str) -> Result<StatusReport>;
}

#[async_trait]
impl JobStatusSource for BackendClient {
    async fn status(&self, job_id: &str) -> Result<StatusReport> {
        let payload = self.job_status(job_id).await?;
        Ok(StatusReport::from_payload(payload))
    }
}

/// Tracks uploaded PDFs through their backend jobs
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, TrackedJob>>>,
    timers: Arc<RwLock<HashMap<String, (u64, CancellationToken)>>>,
    generations: AtomicU64,
    interval: Duration,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(POLL_INTERVAL_MS))
    }
}

impl JobTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            timers: Arc::new(RwLock::new(HashMap::new())),
            generations: AtomicU64::new(0),
            interval,
        }
    }

    pub async fn get(&self, job_id: &str) -> Option<TrackedJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// All tracked jobs in no particular order
    pub async fn list(&self) -> Vec<TrackedJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    pub async fn has_timer(&self, job_id: &str) -> bool {
        self.timers.read().await.contains_key(job_id)
    }

    /// Register an uploaded job and start its poll loop. Re-starting an id
    /// cancels the previous loop first, keeping one timer per job id.
    pub async fn start(&self, source: Arc<dyn JobStatusSource>, mut job: TrackedJob) {
        let job_id = job.job_id.clone();
        job.state = JobState::Processing;

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        {
            let mut timers = self.timers.write().await;
            if let Some((_, previous)) = timers.insert(job_id.clone(), (generation, token.clone()))
            {
                previous.cancel();
            }
        }
        self.jobs.write().await.insert(job_id.clone(), job);

        let jobs = Arc::clone(&self.jobs);
        let timers = Arc::clone(&self.timers);
        let interval = self.interval;

        tokio::spawn(async move {
            loop {
                let report = source.status(&job_id).await;

                // The job may have been removed, or restarted under a newer
                // generation, while the request was in flight; drop the
                // result instead of clobbering the current state. Holding
                // the timers read guard across the apply keeps a concurrent
                // restart from swapping the job underneath it.
                let terminal = {
                    let timers_guard = timers.read().await;
                    if timers_guard.get(&job_id).map(|(gen, _)| *gen) != Some(generation) {
                        break;
                    }
                    let mut jobs = jobs.write().await;
                    let Some(job) = jobs.get_mut(&job_id) else {
                        break;
                    };
                    match report {
                        Ok(report) => match report.state {
                            ReportedState::Processing => {
                                if let Some(progress) = report.progress {
                                    job.progress = progress;
                                }
                                if report.message.is_some() {
                                    job.message = report.message;
                                }
                                false
                            }
                            ReportedState::Completed => {
                                job.state = JobState::Completed;
                                job.progress = 100.0;
                                job.summary = report.result;
                                job.message = report.message;
                                true
                            }
                            ReportedState::Failed => {
                                job.state = JobState::Error;
                                job.message = Some(
                                    report
                                        .error
                                        .unwrap_or_else(|| "Processing failed".to_string()),
                                );
                                true
                            }
                        },
                        Err(e) => {
                            job.state = JobState::Error;
                            job.message = Some(e.to_string());
                            true
                        }
                    }
                };

                if terminal {
                    // Only tear down our own timer entry; a restart may
                    // already have installed a successor.
                    let mut timers_guard = timers.write().await;
                    if timers_guard.get(&job_id).map(|(gen, _)| *gen) == Some(generation) {
                        if let Some((_, token)) = timers_guard.remove(&job_id) {
                            token.cancel();
                        }
                    }
                    break;
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });
    }

    /// Drop a job and cancel its poll loop
    pub async fn remove(&self, job_id: &str) -> bool {
        if let Some((_, token)) = self.timers.write().await.remove(job_id) {
            token.cancel();
        }
        self.jobs.write().await.remove(job_id).is_some()
    }

    /// Cancel every outstanding poll loop (service teardown)
    pub async fn shutdown(&self) {
        let mut timers = self.timers.write().await;
        for (_, (_, token)) in timers.drain() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Replays a fixed sequence of poll answers
    struct ScriptedSource {
        reports: Mutex<VecDeque<Result<StatusReport>>>,
        polls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(reports: Vec<Result<StatusReport>>) -> Arc<Self> {
            Arc::new(Self {
                reports: Mutex::new(reports.into()),
                polls: AtomicUsize::new(0),
            })
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobStatusSource for ScriptedSource {
        async fn status(&self, _job_id: &str) -> Result<StatusReport> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.reports
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| panic!("polled after the script ran out"))
        }
    }

    /// Sits on its single answer until the delay elapses
    struct SlowSource {
        delay: Duration,
        report: Mutex<Option<Result<StatusReport>>>,
    }

    impl SlowSource {
        fn new(delay: Duration, report: Result<StatusReport>) -> Arc<Self> {
            Arc::new(Self {
                delay,
                report: Mutex::new(Some(report)),
            })
        }
    }

    #[async_trait]
    impl JobStatusSource for SlowSource {
        async fn status(&self, _job_id: &str) -> Result<StatusReport> {
            tokio::time::sleep(self.delay).await;
            self.report
                .lock()
                .await
                .take()
                .unwrap_or_else(|| panic!("polled after the answer was taken"))
        }
    }

    fn processing(progress: f32) -> Result<StatusReport> {
        Ok(StatusReport {
            state: ReportedState::Processing,
            progress: Some(progress),
            message: Some("working".into()),
            result: None,
            error: None,
        })
    }

    fn completed() -> Result<StatusReport> {
        Ok(StatusReport {
            state: ReportedState::Completed,
            progress: Some(100.0),
            message: Some("done".into()),
            result: Some(serde_json::json!({ "summary": "short version" })),
            error: None,
        })
    }

    fn failed(reason: &str) -> Result<StatusReport> {
        Ok(StatusReport {
            state: ReportedState::Failed,
            progress: None,
            message: None,
            result: None,
            error: Some(reason.into()),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed_then_stops() {
        let tracker = JobTracker::new(Duration::from_millis(50));
        let source = ScriptedSource::new(vec![processing(20.0), processing(60.0), completed()]);

        tracker
            .start(source.clone(), TrackedJob::new("job-1", "doc.pdf", 123))
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        let job = tracker.get("job-1").await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.progress, 100.0);
        assert!(job.summary.is_some());
        // terminal state cancelled the timer, so the script is never re-read
        assert_eq!(source.poll_count(), 3);
        assert!(!tracker.has_timer("job-1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_becomes_error_and_polling_stops() {
        let tracker = JobTracker::new(Duration::from_millis(50));
        let source = ScriptedSource::new(vec![processing(10.0), failed("corrupt file")]);

        tracker
            .start(source.clone(), TrackedJob::new("job-2", "doc.pdf", 123))
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        let job = tracker.get("job-2").await.unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.message.as_deref(), Some("corrupt file"));
        assert_eq!(source.poll_count(), 2);
        assert!(!tracker.has_timer("job-2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_terminal() {
        let tracker = JobTracker::new(Duration::from_millis(50));
        let source = ScriptedSource::new(vec![Err(anyhow::anyhow!("connection refused"))]);

        tracker
            .start(source.clone(), TrackedJob::new("job-3", "doc.pdf", 123))
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        let job = tracker.get("job-3").await.unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(source.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_cancels_the_poll_loop() {
        let tracker = JobTracker::new(Duration::from_millis(50));
        // endless processing; removal must be what stops it
        let source = ScriptedSource::new(vec![
            processing(5.0),
            processing(10.0),
            processing(15.0),
            processing(20.0),
        ]);

        tracker
            .start(source.clone(), TrackedJob::new("job-4", "doc.pdf", 123))
            .await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(tracker.remove("job-4").await);
        let polls_at_removal = source.poll_count();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(source.poll_count() <= polls_at_removal + 1);
        assert!(tracker.get("job-4").await.is_none());
        assert!(!tracker.has_timer("job-4").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_a_job_id_replaces_the_old_timer() {
        let tracker = JobTracker::new(Duration::from_millis(50));
        let first = ScriptedSource::new(vec![processing(5.0), processing(10.0), processing(15.0)]);
        let second = ScriptedSource::new(vec![completed()]);

        tracker
            .start(first.clone(), TrackedJob::new("job-5", "a.pdf", 1))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        tracker
            .start(second.clone(), TrackedJob::new("job-5", "b.pdf", 2))
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        let job = tracker.get("job-5").await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.file_name, "b.pdf");
        assert_eq!(second.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_of_a_replaced_loop_is_discarded() {
        let tracker = JobTracker::new(Duration::from_millis(50));

        // the first loop's only answer lands after the job was re-uploaded
        let first = SlowSource::new(Duration::from_millis(30), failed("superseded upload"));
        tracker
            .start(first, TrackedJob::new("job-6", "a.pdf", 1))
            .await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = ScriptedSource::new(vec![processing(40.0), completed()]);
        tracker
            .start(second.clone(), TrackedJob::new("job-6", "b.pdf", 2))
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        // the late failure never touched the restarted job or its timer
        let job = tracker.get("job-6").await.unwrap();
        assert_eq!(job.file_name, "b.pdf");
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.progress, 100.0);
        assert_eq!(second.poll_count(), 2);
        assert!(!tracker.has_timer("job-6").await);
    }
}

//! Job lifecycle state and the in-process job registry.
//!
//! A [`Job`] walks the forward-only status chain as the pipeline runs. The
//! [`JobStore`] is an injected registry; the orchestrator is the only
//! component that mutates job state, and every stage output is published in
//! the same critical section that flips the status, so concurrent readers
//! never observe a half-written stage.

use crate::error::{NotatError, Result};
use crate::export::ExportFormat;
use crate::notes::StructuredNotes;
use crate::segmenter::ProcessedText;
use crate::summarizer::Summary;
use crate::transcription::Transcript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Lifecycle status of a job.
///
/// Transitions run strictly forward; `Failed` is terminal and reachable from
/// anywhere. `Ready` → `Exporting` → `Ready` is the sole permitted cycle, an
/// export sub-transition that leaves the primary status `Ready` between
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Uploaded,
    Transcribing,
    Segmenting,
    Summarizing,
    Assembling,
    Ready,
    Exporting,
    Failed,
}

impl JobStatus {
    /// Whether a direct transition to `next` is legal.
    pub fn can_transition(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Failed, _) => false,
            (_, Failed) => true,
            (Created, Uploaded) => true,
            (Uploaded, Transcribing) => true,
            (Transcribing, Segmenting) => true,
            (Segmenting, Summarizing) => true,
            (Summarizing, Assembling) => true,
            (Assembling, Ready) => true,
            (Ready, Exporting) => true,
            (Exporting, Ready) => true,
            _ => false,
        }
    }

    /// Whether the job has completed its pipeline.
    pub fn is_ready(self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Exporting)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Created => "created",
            JobStatus::Uploaded => "uploaded",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Segmenting => "segmenting",
            JobStatus::Summarizing => "summarizing",
            JobStatus::Assembling => "assembling",
            JobStatus::Ready => "ready",
            JobStatus::Exporting => "exporting",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Stage and message of a failed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub stage: String,
    pub message: String,
}

/// One end-to-end processing request for a single uploaded media file.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub source_filename: String,
    pub source_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<JobError>,
    /// Stage outputs, monotonically appended as the pipeline advances.
    pub transcript: Option<Arc<Transcript>>,
    pub processed: Option<Arc<ProcessedText>>,
    pub summary: Option<Arc<Summary>>,
    pub notes: Option<Arc<StructuredNotes>>,
    /// Export artifacts keyed by format. Grows; entries overwrite on re-export.
    pub artifacts: HashMap<ExportFormat, PathBuf>,
}

impl Job {
    /// Create a fresh job record in `Created` state.
    pub fn new(source_filename: String, source_path: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Created,
            source_filename,
            source_path,
            created_at: now,
            updated_at: now,
            error: None,
            transcript: None,
            processed: None,
            summary: None,
            notes: None,
            artifacts: HashMap::new(),
        }
    }
}

/// Concurrency-safe in-process job registry.
///
/// Jobs are looked up and updated under a single lock; a `transition` call
/// publishes stage output and the status flip atomically.
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new job.
    pub fn insert(&self, job: Job) -> Uuid {
        let id = job.id;
        self.jobs.write().unwrap().insert(id, job);
        id
    }

    /// Snapshot a job by id.
    pub fn get(&self, id: Uuid) -> Result<Job> {
        self.jobs
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| NotatError::NotFound(format!("Unknown job: {}", id)))
    }

    /// Transition a job to `next`, applying `publish` to the record in the
    /// same critical section.
    ///
    /// Illegal transitions are rejected without mutating the record.
    pub fn transition(
        &self,
        id: Uuid,
        next: JobStatus,
        publish: impl FnOnce(&mut Job),
    ) -> Result<()> {
        let mut jobs = self.jobs.write().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| NotatError::NotFound(format!("Unknown job: {}", id)))?;

        if !job.status.can_transition(next) {
            return Err(NotatError::Validation(format!(
                "Job {} cannot transition from {} to {}",
                id, job.status, next
            )));
        }

        publish(job);
        job.status = next;
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Flip a job to `Failed`, recording the failing stage and message.
    pub fn fail(&self, id: Uuid, stage: &str, message: &str) {
        let mut jobs = self.jobs.write().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status.can_transition(JobStatus::Failed) {
                job.status = JobStatus::Failed;
                job.error = Some(JobError {
                    stage: stage.to_string(),
                    message: message.to_string(),
                });
                job.updated_at = Utc::now();
            }
        }
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job(store: &JobStore) -> Uuid {
        store.insert(Job::new("lecture.mp3".into(), PathBuf::from("/tmp/lecture.mp3")))
    }

    #[test]
    fn test_forward_chain_is_legal() {
        use JobStatus::*;
        let chain = [Created, Uploaded, Transcribing, Segmenting, Summarizing, Assembling, Ready];
        for pair in chain.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_skipping_or_backward_transitions() {
        use JobStatus::*;
        assert!(!Uploaded.can_transition(Segmenting));
        assert!(!Created.can_transition(Ready));
        assert!(!Segmenting.can_transition(Transcribing));
        assert!(!Ready.can_transition(Uploaded));
    }

    #[test]
    fn test_failed_is_terminal() {
        use JobStatus::*;
        assert!(Transcribing.can_transition(Failed));
        assert!(Ready.can_transition(Failed));
        assert!(!Failed.can_transition(Uploaded));
        assert!(!Failed.can_transition(Ready));
    }

    #[test]
    fn test_export_cycle_is_the_only_return_edge() {
        use JobStatus::*;
        assert!(Ready.can_transition(Exporting));
        assert!(Exporting.can_transition(Ready));
        assert!(!Exporting.can_transition(Uploaded));
    }

    #[test]
    fn test_store_rejects_illegal_transition() {
        let store = JobStore::new();
        let id = new_job(&store);

        let err = store.transition(id, JobStatus::Ready, |_| {}).unwrap_err();
        assert!(matches!(err, NotatError::Validation(_)));
        // Status unchanged after rejection.
        assert_eq!(store.get(id).unwrap().status, JobStatus::Created);
    }

    #[test]
    fn test_unknown_job_is_not_found() {
        let store = JobStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()),
            Err(NotatError::NotFound(_))
        ));
    }

    #[test]
    fn test_output_published_with_status_flip() {
        let store = JobStore::new();
        let id = new_job(&store);

        store.transition(id, JobStatus::Uploaded, |_| {}).unwrap();
        store.transition(id, JobStatus::Transcribing, |_| {}).unwrap();

        let transcript = Arc::new(Transcript::with_duration(vec![], 10.0, None));
        store
            .transition(id, JobStatus::Segmenting, |job| {
                job.transcript = Some(transcript.clone());
            })
            .unwrap();

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Segmenting);
        assert!(job.transcript.is_some());
    }

    #[test]
    fn test_fail_records_stage_and_message() {
        let store = JobStore::new();
        let id = new_job(&store);

        store.fail(id, "transcription", "cannot decode media");

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        let err = job.error.unwrap();
        assert_eq!(err.stage, "transcription");
        assert_eq!(err.message, "cannot decode media");
    }

    #[test]
    fn test_concurrent_jobs_are_isolated() {
        let store = Arc::new(JobStore::new());
        let ids: Vec<Uuid> = (0..8).map(|_| new_job(&store)).collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.transition(id, JobStatus::Uploaded, |_| {}).unwrap();
                    store.transition(id, JobStatus::Transcribing, |_| {}).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for id in ids {
            assert_eq!(store.get(id).unwrap().status, JobStatus::Transcribing);
        }
    }
}

//! Pipeline orchestrator for Notat.
//!
//! Owns the job lifecycle and drives each job through transcription,
//! segmentation, summarization, assembly, and export. The orchestrator is
//! the only component that mutates job status, and it is the sole entry
//! point the CLI and HTTP shells talk to.

use crate::config::Settings;
use crate::error::{NotatError, Result};
use crate::export::{ExportArtifact, ExportFormat, ExportSelection, Exporter};
use crate::jobs::{Job, JobError, JobStatus, JobStore};
use crate::notes::{NoteAssembler, StructuredNotes};
use crate::segmenter::{Definition, Segmenter, Topic};
use crate::summarizer::{ExtractiveEngine, OpenAiSummaryEngine, Summarizer, SummaryEngine};
use crate::transcription::{SpeechEngine, WhisperEngine};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The main orchestrator for the Notat pipeline.
pub struct Orchestrator {
    settings: Settings,
    speech_engine: Arc<dyn SpeechEngine>,
    fallback_engine: Option<Arc<dyn SpeechEngine>>,
    segmenter: Arc<Segmenter>,
    summarizer: Summarizer,
    assembler: NoteAssembler,
    exporter: Exporter,
    store: Arc<JobStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with engines chosen from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let speech_engine: Arc<dyn SpeechEngine> =
            Arc::new(WhisperEngine::with_model(&settings.transcription.model));

        let fallback_engine: Option<Arc<dyn SpeechEngine>> = settings
            .transcription
            .fallback_model
            .as_deref()
            .map(|model| Arc::new(WhisperEngine::with_model(model)) as Arc<dyn SpeechEngine>);

        let summary_engine: Arc<dyn SummaryEngine> =
            match settings.summarization.engine.as_str() {
                "openai" => Arc::new(OpenAiSummaryEngine::new(&settings.summarization.model)),
                _ => Arc::new(ExtractiveEngine::new()),
            };

        Self::with_components(
            settings,
            speech_engine,
            fallback_engine,
            summary_engine,
            Arc::new(JobStore::new()),
        )
    }

    /// Create an orchestrator with injected components.
    pub fn with_components(
        settings: Settings,
        speech_engine: Arc<dyn SpeechEngine>,
        fallback_engine: Option<Arc<dyn SpeechEngine>>,
        summary_engine: Arc<dyn SummaryEngine>,
        store: Arc<JobStore>,
    ) -> Result<Self> {
        std::fs::create_dir_all(settings.upload_dir())?;
        std::fs::create_dir_all(settings.temp_dir())?;

        let segmenter = Arc::new(Segmenter::new(settings.segmentation.clone()));
        let summarizer = Summarizer::new(summary_engine, settings.summarization.clone());
        let exporter = Exporter::new(settings.output_dir(), &settings.export.default_title)?;

        Ok(Self {
            settings,
            speech_engine,
            fallback_engine,
            segmenter,
            summarizer,
            assembler: NoteAssembler::new(),
            exporter,
            store,
        })
    }

    /// The job registry.
    pub fn store(&self) -> Arc<JobStore> {
        self.store.clone()
    }

    /// The settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register an uploaded media file and create its job.
    ///
    /// Format and size validation is the caller's responsibility; this only
    /// rejects structurally unusable input.
    #[instrument(skip(self, bytes), fields(filename = %filename))]
    pub async fn create_job(&self, filename: &str, bytes: &[u8]) -> Result<Uuid> {
        if filename.trim().is_empty() {
            return Err(NotatError::Validation("Filename must not be empty".into()));
        }
        if bytes.is_empty() {
            return Err(NotatError::Validation("Uploaded file is empty".into()));
        }

        // Keep only the final path component so uploads cannot escape the
        // upload directory.
        let safe_name = std::path::Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| NotatError::Validation(format!("Unusable filename: {}", filename)))?;

        let job = Job::new(safe_name.to_string(), std::path::PathBuf::new());
        let job_id = job.id;
        let path = self
            .settings
            .upload_dir()
            .join(format!("{}_{}", job_id, safe_name));

        tokio::fs::write(&path, bytes).await?;

        self.store.insert(job);
        self.store.transition(job_id, JobStatus::Uploaded, |job| {
            job.source_path = path;
        })?;

        info!("Job {} created for {}", job_id, safe_name);
        Ok(job_id)
    }

    /// Run the full pipeline for an uploaded job, blocking through all
    /// stages.
    ///
    /// Any stage failure flips the job to `Failed` with the failing stage
    /// and a human-readable message, then propagates.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn run_pipeline(&self, job_id: Uuid) -> Result<PipelineReport> {
        let job = self.store.get(job_id)?;
        if job.status != JobStatus::Uploaded {
            return Err(NotatError::Validation(format!(
                "Job {} is {}, expected uploaded",
                job_id, job.status
            )));
        }

        match self.run_stages(&job).await {
            Ok(report) => Ok(report),
            Err(e) => {
                let stage = e.stage().unwrap_or("pipeline");
                self.store.fail(job_id, stage, &e.to_string());
                Err(e)
            }
        }
    }

    async fn run_stages(&self, job: &Job) -> Result<PipelineReport> {
        let job_id = job.id;
        let language = self.settings.transcription.language.clone();

        // Stage 1: transcription, with one degraded retry when configured.
        self.store.transition(job_id, JobStatus::Transcribing, |_| {})?;
        info!("Job {}: transcribing {}", job_id, job.source_filename);

        let transcript = match self
            .speech_engine
            .transcribe(&job.source_path, language.as_deref())
            .await
        {
            Ok(t) => t,
            Err(primary_err) => match &self.fallback_engine {
                Some(fallback) => {
                    warn!(
                        "Job {}: engine {} failed ({}), retrying with {}",
                        job_id,
                        self.speech_engine.name(),
                        primary_err,
                        fallback.name()
                    );
                    fallback
                        .transcribe(&job.source_path, language.as_deref())
                        .await?
                }
                None => return Err(primary_err),
            },
        };
        let transcript = Arc::new(transcript);

        // Stage 2: segmentation. CPU-bound, so it runs off the async threads.
        self.store.transition(job_id, JobStatus::Segmenting, |job| {
            job.transcript = Some(transcript.clone());
        })?;
        info!(
            "Job {}: segmenting {:.0}s transcript",
            job_id, transcript.duration_seconds
        );

        let segmenter = self.segmenter.clone();
        let seg_input = transcript.clone();
        let processed = tokio::task::spawn_blocking(move || segmenter.segment(&seg_input))
            .await
            .map_err(|e| NotatError::Segmentation(format!("Segmentation task failed: {e}")))??;
        let processed = Arc::new(processed);

        // Stage 3: summarization.
        self.store.transition(job_id, JobStatus::Summarizing, |job| {
            job.processed = Some(processed.clone());
        })?;
        info!("Job {}: summarizing {} topics", job_id, processed.topics.len());

        let summary = Arc::new(self.summarizer.summarize(&processed).await?);

        // Stage 4: assembly.
        self.store.transition(job_id, JobStatus::Assembling, |job| {
            job.summary = Some(summary.clone());
        })?;

        let notes = Arc::new(self.assembler.assemble(&transcript, &processed, &summary)?);

        self.store.transition(job_id, JobStatus::Ready, |job| {
            job.notes = Some(notes.clone());
        })?;
        info!("Job {}: ready ({} sections)", job_id, notes.section_count);

        Ok(PipelineReport::from_notes(job_id, &notes))
    }

    /// Current status of a job and which stage outputs exist.
    pub fn status(&self, job_id: Uuid) -> Result<StatusReport> {
        let job = self.store.get(job_id)?;

        let mut artifacts: Vec<ExportFormat> = job.artifacts.keys().copied().collect();
        artifacts.sort();

        Ok(StatusReport {
            job_id,
            status: job.status,
            error: job.error,
            available: AvailableOutputs {
                transcript: job.transcript.is_some(),
                processed_data: job.processed.is_some(),
                summary: job.summary.is_some(),
                structured_notes: job.notes.is_some(),
            },
            artifacts,
        })
    }

    /// Export a ready job into one format, or all of them.
    ///
    /// A single-format failure flips the job to `Failed`; `all` instead
    /// reports per-format outcomes and the job returns to `Ready`.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub fn export_job(
        &self,
        job_id: Uuid,
        selection: ExportSelection,
        title: Option<&str>,
    ) -> Result<ExportReport> {
        let job = self.store.get(job_id)?;
        let notes = match (&job.status, &job.notes) {
            (JobStatus::Ready, Some(notes)) => notes.clone(),
            _ => {
                return Err(NotatError::Validation(format!(
                    "Job {} is {}, export requires a ready job",
                    job_id, job.status
                )))
            }
        };

        self.store.transition(job_id, JobStatus::Exporting, |_| {})?;

        match selection {
            ExportSelection::Single(format) => {
                match self.exporter.export(&notes, format, job_id, title) {
                    Ok(artifact) => {
                        self.store.transition(job_id, JobStatus::Ready, |job| {
                            job.artifacts.insert(format, artifact.file_path.clone());
                        })?;
                        Ok(ExportReport::Single {
                            job_id,
                            format,
                            file_path: artifact.file_path.display().to_string(),
                        })
                    }
                    Err(e) => {
                        self.store.fail(job_id, "export", &e.to_string());
                        Err(e)
                    }
                }
            }
            ExportSelection::All => {
                let outcomes = self.exporter.export_all(&notes, job_id, title);

                let succeeded: Vec<ExportArtifact> = outcomes
                    .iter()
                    .filter_map(|(_, r)| r.as_ref().ok().cloned())
                    .collect();
                self.store.transition(job_id, JobStatus::Ready, |job| {
                    for artifact in &succeeded {
                        job.artifacts
                            .insert(artifact.format, artifact.file_path.clone());
                    }
                })?;

                let files: BTreeMap<ExportFormat, FormatOutcome> = outcomes
                    .into_iter()
                    .map(|(format, result)| {
                        let outcome = match result {
                            Ok(artifact) => FormatOutcome::Success {
                                file_path: artifact.file_path.display().to_string(),
                            },
                            Err(e) => FormatOutcome::Error {
                                error: e.to_string(),
                            },
                        };
                        (format, outcome)
                    })
                    .collect();

                Ok(ExportReport::All { job_id, files })
            }
        }
    }

    /// Raw bytes and content type of a previously exported artifact.
    pub fn artifact(&self, job_id: Uuid, format: ExportFormat) -> Result<(Vec<u8>, &'static str)> {
        let job = self.store.get(job_id)?;
        if !job.artifacts.contains_key(&format) {
            return Err(NotatError::NotFound(format!(
                "Job {} has no exported {} artifact",
                job_id, format
            )));
        }

        let bytes = self.exporter.read_artifact(job_id, format)?;
        Ok((bytes, format.content_type()))
    }
}

// === Report types ===

/// Result of a completed pipeline run, shaped for external consumers.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub job_id: Uuid,
    pub transcript: TranscriptReport,
    pub processed_data: ProcessedReport,
    pub summaries: SummariesReport,
    pub structured_notes: NotesReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    pub text: String,
    pub duration: f64,
    pub language: Option<String>,
    pub segment_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    pub word_count: usize,
    pub sentence_count: usize,
    pub section_count: usize,
    pub keywords: Vec<String>,
    pub key_phrases: Vec<String>,
    pub sections: Vec<SectionReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub title: String,
    pub text: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummariesReport {
    pub overall_summary: String,
    pub bullet_points: Vec<String>,
    pub bullet_point_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotesReport {
    pub topics: Vec<Topic>,
    pub definitions: Vec<Definition>,
    pub key_takeaways: Vec<String>,
    pub quick_revision: Vec<String>,
}

impl PipelineReport {
    fn from_notes(job_id: Uuid, notes: &StructuredNotes) -> Self {
        Self {
            job_id,
            transcript: TranscriptReport {
                text: notes.transcript.text.clone(),
                duration: notes.transcript.duration_seconds,
                language: notes.transcript.language.clone(),
                segment_count: notes.transcript.segment_count,
            },
            processed_data: ProcessedReport {
                word_count: notes.word_count,
                sentence_count: notes.sentence_count,
                section_count: notes.section_count,
                keywords: notes.keywords.clone(),
                key_phrases: notes.key_phrases.clone(),
                sections: notes
                    .topics
                    .iter()
                    .map(|t| SectionReport {
                        title: t.title.clone(),
                        text: t.body.clone(),
                        keywords: t.keywords.clone(),
                    })
                    .collect(),
            },
            summaries: SummariesReport {
                overall_summary: notes.summary.overall_summary.clone(),
                bullet_points: notes.summary.bullet_points.clone(),
                bullet_point_count: notes.summary.bullet_points.len(),
            },
            structured_notes: NotesReport {
                topics: notes.topics.clone(),
                definitions: notes.definitions.clone(),
                key_takeaways: notes.summary.key_takeaways.clone(),
                quick_revision: notes.summary.quick_revision_items.clone(),
            },
        }
    }
}

/// Status snapshot of a job.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub job_id: Uuid,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub available: AvailableOutputs,
    pub artifacts: Vec<ExportFormat>,
}

/// Which stage outputs exist for a job.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableOutputs {
    pub transcript: bool,
    pub processed_data: bool,
    pub summary: bool,
    pub structured_notes: bool,
}

/// Result of an export request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExportReport {
    Single {
        job_id: Uuid,
        format: ExportFormat,
        file_path: String,
    },
    All {
        job_id: Uuid,
        files: BTreeMap<ExportFormat, FormatOutcome>,
    },
}

/// Per-format outcome of an `all` export.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FormatOutcome {
    Success { file_path: String },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{Transcript, TranscriptSegment};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSpeechEngine {
        text: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockSpeechEngine {
        fn speaking(text: &str) -> Self {
            Self {
                text: text.to_string(),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                text: String::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechEngine for MockSpeechEngine {
        async fn transcribe(&self, _path: &Path, _language: Option<&str>) -> Result<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NotatError::Transcription("cannot decode media".into()));
            }
            if self.text.is_empty() {
                return Ok(Transcript::with_duration(vec![], 60.0, Some("en".into())));
            }
            Ok(Transcript::new(
                vec![TranscriptSegment::new(0.0, 60.0, self.text.clone())],
                Some("en".to_string()),
            ))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn test_settings(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.join("data").display().to_string();
        settings.general.upload_dir = dir.join("uploads").display().to_string();
        settings.general.temp_dir = dir.join("temp").display().to_string();
        settings.export.output_dir = dir.join("output").display().to_string();
        settings
    }

    fn orchestrator_with(
        dir: &Path,
        speech: Arc<dyn SpeechEngine>,
        fallback: Option<Arc<dyn SpeechEngine>>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            test_settings(dir),
            speech,
            fallback,
            Arc::new(ExtractiveEngine::new()),
            Arc::new(JobStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_pipeline_reaches_ready() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking(
                "the cat sat on the mat. the dog ran fast.",
            )),
            None,
        );

        let job_id = orch.create_job("lecture.mp3", b"fake media").await.unwrap();
        let report = orch.run_pipeline(job_id).await.unwrap();

        assert_eq!(report.processed_data.section_count, 1);
        assert!(report.processed_data.keywords.contains(&"cat".to_string()));
        assert!(report.processed_data.keywords.contains(&"dog".to_string()));
        assert!(!report.summaries.overall_summary.is_empty());
        assert!(report.summaries.bullet_point_count <= 5);

        let status = orch.status(job_id).unwrap();
        assert_eq!(status.status, JobStatus::Ready);
        assert!(status.available.transcript);
        assert!(status.available.structured_notes);
    }

    #[tokio::test]
    async fn test_transcription_failure_flips_job_to_failed() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(dir.path(), Arc::new(MockSpeechEngine::failing()), None);

        let job_id = orch.create_job("broken.mp3", b"junk").await.unwrap();
        let err = orch.run_pipeline(job_id).await.unwrap_err();
        assert!(matches!(err, NotatError::Transcription(_)));

        let status = orch.status(job_id).unwrap();
        assert_eq!(status.status, JobStatus::Failed);
        assert_eq!(status.error.unwrap().stage, "transcription");
    }

    #[tokio::test]
    async fn test_degraded_retry_rescues_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::failing()),
            Some(Arc::new(MockSpeechEngine::speaking(
                "fallback transcript arrived safely here.",
            ))),
        );

        let job_id = orch.create_job("flaky.mp3", b"media").await.unwrap();
        let report = orch.run_pipeline(job_id).await.unwrap();

        assert!(report.transcript.text.contains("fallback"));
        assert_eq!(orch.status(job_id).unwrap().status, JobStatus::Ready);
    }

    #[tokio::test]
    async fn test_silent_audio_reaches_ready_with_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(dir.path(), Arc::new(MockSpeechEngine::speaking("")), None);

        let job_id = orch.create_job("silence.wav", b"media").await.unwrap();
        let report = orch.run_pipeline(job_id).await.unwrap();

        assert_eq!(report.summaries.overall_summary, "");
        assert!(report.summaries.bullet_points.is_empty());
        assert_eq!(orch.status(job_id).unwrap().status, JobStatus::Ready);
    }

    #[tokio::test]
    async fn test_pipeline_cannot_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking("one sentence of content here.")),
            None,
        );

        let job_id = orch.create_job("lecture.mp3", b"media").await.unwrap();
        orch.run_pipeline(job_id).await.unwrap();

        let err = orch.run_pipeline(job_id).await.unwrap_err();
        assert!(matches!(err, NotatError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_job_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking("text")),
            None,
        );

        assert!(matches!(
            orch.create_job("", b"media").await,
            Err(NotatError::Validation(_))
        ));
        assert!(matches!(
            orch.create_job("lecture.mp3", b"").await,
            Err(NotatError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_export_and_artifact_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking(
                "the cat sat on the mat. the dog ran fast.",
            )),
            None,
        );

        let job_id = orch.create_job("lecture.mp3", b"media").await.unwrap();
        orch.run_pipeline(job_id).await.unwrap();

        let report = orch
            .export_job(
                job_id,
                ExportSelection::Single(ExportFormat::Markdown),
                None,
            )
            .unwrap();
        let ExportReport::Single { file_path, .. } = report else {
            panic!("expected single-format report");
        };
        assert!(std::path::Path::new(&file_path).is_file());

        let (bytes, content_type) = orch.artifact(job_id, ExportFormat::Markdown).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(content_type, "text/markdown");

        // Job is back at Ready and repeated exports keep working.
        assert_eq!(orch.status(job_id).unwrap().status, JobStatus::Ready);
        orch.export_job(job_id, ExportSelection::All, None).unwrap();
        assert_eq!(orch.status(job_id).unwrap().artifacts.len(), 3);
    }

    #[tokio::test]
    async fn test_export_before_ready_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking("text here.")),
            None,
        );

        let job_id = orch.create_job("lecture.mp3", b"media").await.unwrap();
        let err = orch
            .export_job(job_id, ExportSelection::Single(ExportFormat::Pdf), None)
            .unwrap_err();
        assert!(matches!(err, NotatError::Validation(_)));
    }

    #[tokio::test]
    async fn test_artifact_not_found_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking("text here today folks.")),
            None,
        );

        let job_id = orch.create_job("lecture.mp3", b"media").await.unwrap();
        orch.run_pipeline(job_id).await.unwrap();

        let err = orch.artifact(job_id, ExportFormat::Pdf).unwrap_err();
        assert!(matches!(err, NotatError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_use_disjoint_artifact_paths() {
        let dir = tempfile::tempdir().unwrap();
        let orch = Arc::new(orchestrator_with(
            dir.path(),
            Arc::new(MockSpeechEngine::speaking(
                "concurrency lecture sentence one. concurrency lecture sentence two.",
            )),
            None,
        ));

        let a = orch.create_job("first.mp3", b"media a").await.unwrap();
        let b = orch.create_job("second.mp3", b"media b").await.unwrap();

        let (ra, rb) = tokio::join!(orch.run_pipeline(a), orch.run_pipeline(b));
        ra.unwrap();
        rb.unwrap();

        let ea = orch
            .export_job(a, ExportSelection::Single(ExportFormat::Markdown), None)
            .unwrap();
        let eb = orch
            .export_job(b, ExportSelection::Single(ExportFormat::Markdown), None)
            .unwrap();

        let (ExportReport::Single { file_path: pa, .. }, ExportReport::Single { file_path: pb, .. }) =
            (ea, eb)
        else {
            panic!("expected single-format reports");
        };
        assert_ne!(pa, pb);
    }
}

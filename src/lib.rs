//! Notat - Lecture Notes from Recorded Audio
//!
//! Turns a recorded lecture (audio or video) into structured study notes
//! through a pipeline: transcription, topic segmentation, summarization,
//! and multi-format export, coordinated by a job lifecycle.
//!
//! The name "Notat" comes from the Norwegian/Scandinavian word for "note."
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `jobs` - Job lifecycle state and the in-process registry
//! - `transcription` - Speech-to-text engine abstraction
//! - `segmenter` - Transcript cleaning, topic segmentation, extraction
//! - `summarizer` - Chunked summarization with extractive fallback
//! - `notes` - Structured notes assembly
//! - `export` - Markdown/PDF/DOCX rendering
//! - `orchestrator` - Pipeline coordination
//! - `cli` - Command line and HTTP shells
//!
//! # Example
//!
//! ```rust,no_run
//! use notat::config::Settings;
//! use notat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let bytes = std::fs::read("lecture.mp3")?;
//!     let job_id = orchestrator.create_job("lecture.mp3", &bytes).await?;
//!     let report = orchestrator.run_pipeline(job_id).await?;
//!     println!("{} sections", report.processed_data.section_count);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod jobs;
pub mod notes;
pub mod openai;
pub mod orchestrator;
pub mod segmenter;
pub mod summarizer;
pub mod transcription;

pub use error::{NotatError, Result};

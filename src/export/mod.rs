//! Rendering of structured notes into export artifacts.
//!
//! Rendering is presentation-only: topic order, definitions grouping, and
//! numbered lists come straight from the notes document; nothing is
//! re-derived or re-ranked here. Artifacts are keyed by (job id, format) and
//! idempotently regenerable; a re-export overwrites.

mod docx;
mod markdown;
mod pdf;

pub use markdown::{render_markdown, to_plain_text};

use crate::error::{NotatError, Result};
use crate::notes::StructuredNotes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Docx,
}

impl ExportFormat {
    /// All concrete formats, in render order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Markdown, ExportFormat::Pdf, ExportFormat::Docx];

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// MIME content type for download responses.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Docx => write!(f, "docx"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            _ => Err(format!("Unknown format: {}. Use markdown, pdf, or docx.", s)),
        }
    }
}

/// An export request: one concrete format, or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSelection {
    Single(ExportFormat),
    All,
}

impl std::str::FromStr for ExportSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(ExportSelection::All)
        } else {
            s.parse::<ExportFormat>().map(ExportSelection::Single)
        }
    }
}

/// A rendered file derived from structured notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_path: PathBuf,
}

/// Renders structured notes into files under an output directory.
pub struct Exporter {
    output_dir: PathBuf,
    default_title: String,
}

impl Exporter {
    /// Create an exporter writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, default_title: &str) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            default_title: default_title.to_string(),
        })
    }

    /// Path an artifact of this (job, format) pair lands at.
    pub fn artifact_path(&self, job_id: Uuid, format: ExportFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", job_id, format.extension()))
    }

    /// Render notes into a single format, overwriting any previous artifact.
    pub fn export(
        &self,
        notes: &StructuredNotes,
        format: ExportFormat,
        job_id: Uuid,
        title: Option<&str>,
    ) -> Result<ExportArtifact> {
        let title = title.unwrap_or(&self.default_title);
        let path = self.artifact_path(job_id, format);
        debug!("Rendering {} artifact to {:?}", format, path);

        match format {
            ExportFormat::Markdown => {
                let content = markdown::render_markdown(notes, title);
                std::fs::write(&path, content)
                    .map_err(|e| NotatError::Export(format!("Failed to write markdown: {e}")))?;
            }
            ExportFormat::Pdf => pdf::render_pdf(notes, title, &path)?,
            ExportFormat::Docx => docx::render_docx(notes, title, &path)?,
        }

        info!("Exported {} notes for job {}", format, job_id);
        Ok(ExportArtifact {
            format,
            file_path: path,
        })
    }

    /// Render all formats, tolerating partial failure.
    ///
    /// Each format gets its own outcome so callers can tell exactly which
    /// renderers succeeded; one failing renderer never aborts the others.
    pub fn export_all(
        &self,
        notes: &StructuredNotes,
        job_id: Uuid,
        title: Option<&str>,
    ) -> Vec<(ExportFormat, Result<ExportArtifact>)> {
        ExportFormat::ALL
            .iter()
            .map(|&format| (format, self.export(notes, format, job_id, title)))
            .collect()
    }

    /// Read back a previously exported artifact.
    ///
    /// Fails with `NotFound` when this (job, format) pair has never been
    /// exported.
    pub fn read_artifact(&self, job_id: Uuid, format: ExportFormat) -> Result<Vec<u8>> {
        let path = self.artifact_path(job_id, format);
        if !path.is_file() {
            return Err(NotatError::NotFound(format!(
                "No {} artifact for job {}",
                format, job_id
            )));
        }
        Ok(std::fs::read(&path)?)
    }

    /// The directory artifacts are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

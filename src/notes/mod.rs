//! Structured notes assembly.
//!
//! Pure aggregation of already-computed stage outputs into the canonical
//! format-independent notes document. No extraction logic lives here;
//! assembling twice from identical inputs yields identical structure.

use crate::error::{NotatError, Result};
use crate::segmenter::{Definition, ProcessedText, Topic};
use crate::summarizer::Summary;
use crate::transcription::Transcript;
use serde::{Deserialize, Serialize};

/// Transcript metadata carried into the notes document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptInfo {
    pub text: String,
    pub duration_seconds: f64,
    pub language: Option<String>,
    pub segment_count: usize,
}

/// The canonical aggregate of all derived note content for one job.
///
/// Assembled once per job and cached for the job's lifetime; the exporter
/// consumes this and derives nothing further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredNotes {
    pub transcript: TranscriptInfo,
    /// Ordered topics, chronological.
    pub topics: Vec<Topic>,
    /// Definitions in order of appearance.
    pub definitions: Vec<Definition>,
    pub summary: Summary,
    /// Document-level keywords.
    pub keywords: Vec<String>,
    /// Document-level key phrases.
    pub key_phrases: Vec<String>,
    pub word_count: usize,
    pub sentence_count: usize,
    pub section_count: usize,
}

/// Builds [`StructuredNotes`] from completed stage outputs.
pub struct NoteAssembler;

impl NoteAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the notes document.
    ///
    /// Fails only when upstream output is structurally absent, which means
    /// the orchestrator sequenced stages incorrectly, not a runtime
    /// condition.
    pub fn assemble(
        &self,
        transcript: &Transcript,
        processed: &ProcessedText,
        summary: &Summary,
    ) -> Result<StructuredNotes> {
        if processed.topics.is_empty() {
            return Err(NotatError::Assembly(
                "Segmentation output has no topics; stages ran out of order".into(),
            ));
        }

        Ok(StructuredNotes {
            transcript: TranscriptInfo {
                text: transcript.full_text.clone(),
                duration_seconds: transcript.duration_seconds,
                language: transcript.language.clone(),
                segment_count: transcript.segments.len(),
            },
            topics: processed.topics.clone(),
            definitions: processed.definitions.clone(),
            summary: summary.clone(),
            keywords: processed.keywords.clone(),
            key_phrases: processed.key_phrases.clone(),
            word_count: processed.word_count,
            sentence_count: processed.sentence_count,
            section_count: processed.section_count(),
        })
    }
}

impl Default for NoteAssembler {
    fn default() -> Self {
        Self::new()
    }
}

//! Transcription module for Notat.
//!
//! Wraps a speech-to-text engine behind the [`SpeechEngine`] trait so any
//! backing engine (local model, remote service) can be substituted without
//! touching pipeline logic. The default binding is OpenAI Whisper.

mod models;
mod whisper;

pub use models::{format_timestamp, Transcript, TranscriptSegment};
pub use whisper::{is_api_key_configured, WhisperEngine};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Capability interface over a speech-to-text engine.
///
/// A single failed attempt surfaces to the orchestrator; engines do not retry
/// internally.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe a media file into a timestamped transcript.
    ///
    /// `language` is an optional hint (e.g., "en"); None lets the engine
    /// auto-detect.
    async fn transcribe(&self, media_path: &Path, language: Option<&str>) -> Result<Transcript>;

    /// Engine identifier for logging.
    fn name(&self) -> &str;
}

//! OpenAI Whisper speech engine implementation.
//!
//! Video inputs have their audio track extracted with ffmpeg into a scoped
//! temporary directory that is removed on success and failure alike.

use super::{SpeechEngine, Transcript, TranscriptSegment};
use crate::error::{NotatError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Supported audio file extensions (passed to the engine as-is).
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff",
];

/// Supported video file extensions (audio will be extracted first).
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v", "mpeg", "mpg",
];

/// OpenAI Whisper-based speech engine.
pub struct WhisperEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperEngine {
    /// Create a new Whisper engine with the default model.
    pub fn new() -> Self {
        Self::with_model("whisper-1")
    }

    /// Create a new Whisper engine with a specific model.
    pub fn with_model(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }

    fn is_video_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn is_audio_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Extract the audio track from a video file using ffmpeg.
    async fn extract_audio(source: &Path, temp_dir: &Path) -> Result<PathBuf> {
        let dest = temp_dir.join("audio.mp3");
        debug!("Extracting audio track from {:?}", source);

        let result = Command::new("ffmpeg")
            .arg("-i").arg(source)
            .arg("-vn")
            .arg("-codec:a").arg("libmp3lame")
            .arg("-qscale:a").arg("2")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(&dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(dest),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(NotatError::Transcription(format!(
                    "Cannot decode media file: {}",
                    err.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NotatError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(NotatError::Transcription(format!("ffmpeg error: {e}"))),
        }
    }

    async fn transcribe_audio(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Transcript> {
        let file_bytes = tokio::fs::read(audio_path).await?;

        if file_bytes.is_empty() {
            return Err(NotatError::Transcription(
                "Media file contains no audio data".into(),
            ));
        }

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| NotatError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| NotatError::OpenAI(format!("Whisper API error: {}", e)))?;

        let duration = response.duration as f64;

        // Parse segments from verbose JSON; fall back to a single segment
        // spanning the full duration when the engine returns none.
        let segments: Vec<TranscriptSegment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::new(
                            s.start as f64,
                            s.end as f64,
                            s.text.trim().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                let text = response.text.trim().to_string();
                if text.is_empty() {
                    vec![]
                } else {
                    vec![TranscriptSegment::new(0.0, duration, text)]
                }
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(Transcript::with_duration(
            segments,
            duration,
            Some(response.language),
        ))
    }
}

impl Default for WhisperEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    #[instrument(skip(self), fields(media_path = %media_path.display()))]
    async fn transcribe(&self, media_path: &Path, language: Option<&str>) -> Result<Transcript> {
        if !media_path.exists() {
            return Err(NotatError::Transcription(format!(
                "Media file not found: {}",
                media_path.display()
            )));
        }

        if !Self::is_audio_file(media_path) && !Self::is_video_file(media_path) {
            return Err(NotatError::Transcription(format!(
                "Unsupported media format: {}",
                media_path.display()
            )));
        }

        // Scoped temp dir: decoded-audio artifacts are removed when this
        // drops, on success and failure paths alike.
        let temp_dir = tempfile::tempdir()?;

        let audio_path = if Self::is_video_file(media_path) {
            info!("Video input, extracting audio track");
            Self::extract_audio(media_path, temp_dir.path()).await?
        } else {
            media_path.to_path_buf()
        };

        let transcript = self.transcribe_audio(&audio_path, language).await?;

        drop(temp_dir);
        Ok(transcript)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_format_detection() {
        assert!(WhisperEngine::is_audio_file(Path::new("lecture.mp3")));
        assert!(WhisperEngine::is_audio_file(Path::new("lecture.WAV")));
        assert!(WhisperEngine::is_video_file(Path::new("lecture.mp4")));
        assert!(!WhisperEngine::is_audio_file(Path::new("lecture.txt")));
        assert!(!WhisperEngine::is_video_file(Path::new("lecture")));
    }

    #[tokio::test]
    async fn test_missing_file_is_transcription_error() {
        let engine = WhisperEngine::new();
        let err = engine
            .transcribe(Path::new("/nonexistent/lecture.mp3"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, NotatError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_unsupported_format_is_transcription_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not media").unwrap();

        let engine = WhisperEngine::new();
        let err = engine.transcribe(&path, None).await.unwrap_err();
        assert!(matches!(err, NotatError::Transcription(_)));
    }
}

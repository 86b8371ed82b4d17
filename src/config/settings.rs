//! Configuration settings for Notat.
//!
//! Every heuristic threshold used by the pipeline lives here with a documented
//! default, so behavior is reproducible in tests rather than buried in constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub segmentation: SegmentationSettings,
    pub summarization: SummarizationSettings,
    pub export: ExportSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for uploaded media files.
    pub upload_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.notat".to_string(),
            upload_dir: "~/.notat/uploads".to_string(),
            temp_dir: "/tmp/notat".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription model to use.
    pub model: String,
    /// Degraded model to retry with after a failed attempt. None disables the retry.
    pub fallback_model: Option<String>,
    /// Language hint passed to the engine (None = auto-detect).
    pub language: Option<String>,
    /// Maximum media duration to process (in seconds).
    pub max_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            fallback_model: None,
            language: None,
            max_duration_seconds: 14400, // 4 hours
        }
    }
}

/// Topic segmentation and extraction settings.
///
/// The boundary heuristic starts a new topic when a sentence run of at least
/// `min_topic_sentences` has accumulated and lexical similarity to the next
/// sentence drops below `boundary_similarity`, or when the sentence opens with
/// a structural marker ("moving on", "next topic", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Minimum sentences per topic. Shorter runs never split; an undersized
    /// trailing topic merges into its predecessor.
    pub min_topic_sentences: usize,
    /// Maximum sentences per topic before a split is forced.
    pub max_topic_sentences: usize,
    /// Jaccard similarity threshold below which a topic shift is assumed (0.0-1.0).
    pub boundary_similarity: f64,
    /// Number of trailing sentences compared against the next sentence.
    pub window_sentences: usize,
    /// Keywords kept per topic.
    pub max_topic_keywords: usize,
    /// Keywords kept at document level.
    pub max_document_keywords: usize,
    /// Key phrases kept at document level.
    pub max_document_phrases: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            min_topic_sentences: 4,
            max_topic_sentences: 14,
            boundary_similarity: 0.12,
            window_sentences: 3,
            max_topic_keywords: 8,
            max_document_keywords: 15,
            max_document_phrases: 10,
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// Summarization engine (extractive, openai).
    pub engine: String,
    /// Model for the openai engine.
    pub model: String,
    /// Character budget per chunk fed to the engine. Oversized topics are
    /// split at sentence boundaries to fit.
    pub chunk_char_budget: usize,
    /// Maximum chunks summarized concurrently.
    pub max_concurrent_chunks: usize,
    /// Maximum bullet points in the final summary.
    pub max_bullet_points: usize,
    /// Maximum key takeaways.
    pub max_takeaways: usize,
    /// Maximum quick-revision items.
    pub max_revision_items: usize,
    /// Fall back to the extractive scorer when the engine fails on a chunk,
    /// instead of failing the job.
    pub extractive_fallback: bool,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            engine: "extractive".to_string(),
            model: "gpt-4o-mini".to_string(),
            chunk_char_budget: 4000,
            max_concurrent_chunks: 3,
            max_bullet_points: 8,
            max_takeaways: 6,
            max_revision_items: 8,
            extractive_fallback: true,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory where rendered artifacts are written.
    pub output_dir: String,
    /// Document title used when the caller does not supply one.
    pub default_title: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.notat/output".to_string(),
            default_title: "Lecture Notes".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::NotatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded upload directory path.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.upload_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded export output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.export.output_dir)
    }
}

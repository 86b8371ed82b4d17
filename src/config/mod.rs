//! Configuration management for Notat.

mod settings;

pub use settings::{
    ExportSettings, GeneralSettings, SegmentationSettings, Settings, SummarizationSettings,
    TranscriptionSettings,
};

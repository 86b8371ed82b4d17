//! Data models for segmentation output.

use serde::{Deserialize, Serialize};

/// A contiguous, coherent span of the transcript treated as one note-worthy
/// unit. Topic order always reflects chronological appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Position in the transcript (0-based, chronological).
    pub index: usize,
    /// Short derived title.
    pub title: String,
    /// Full body text of the topic.
    pub body: String,
    /// Condensed per-sentence bullets.
    pub bullets: Vec<String>,
    /// Frequency-ranked keywords for this topic.
    pub keywords: Vec<String>,
    /// Ranked content-word bigrams for this topic.
    pub key_phrases: Vec<String>,
}

impl Topic {
    /// An empty placeholder topic, used for empty transcripts.
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            title: "Untitled Topic".to_string(),
            body: String::new(),
            bullets: vec![],
            keywords: vec![],
            key_phrases: vec![],
        }
    }

    /// Sentences of the topic body.
    pub fn sentences(&self) -> Vec<&str> {
        self.body
            .split_terminator(['.', '!', '?'])
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// An opportunistically extracted term definition.
///
/// Uniqueness by term is not enforced; renderers apply last-wins ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

/// Output of the segmentation stage: cleaned text plus derived structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedText {
    /// Normalized transcript text (fillers stripped).
    pub cleaned_text: String,
    /// Ordered topic sections.
    pub topics: Vec<Topic>,
    /// Extracted definitions, in order of appearance.
    pub definitions: Vec<Definition>,
    /// Document-level keywords ranked by global frequency.
    pub keywords: Vec<String>,
    /// Document-level key phrases ranked by global frequency.
    pub key_phrases: Vec<String>,
    /// Word count of the cleaned text.
    pub word_count: usize,
    /// Sentence count of the cleaned text.
    pub sentence_count: usize,
}

impl ProcessedText {
    /// Number of topic sections.
    pub fn section_count(&self) -> usize {
        self.topics.len()
    }
}

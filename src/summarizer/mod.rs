//! Summarization over segmented topics.
//!
//! The backing engine has a bounded input size, so topics are packed into
//! chunks under a character budget and summarized independently. Chunk
//! summaries are concatenated strictly in original chunk order; no
//! cross-chunk rewriting is attempted.

mod extractive;
mod openai;

pub use extractive::{
    compress_sentence, extractive_summary, merge_sentences, score_sentence, split_sentences,
    word_frequencies, ExtractiveEngine,
};
pub use openai::OpenAiSummaryEngine;

use crate::config::SummarizationSettings;
use crate::error::{NotatError, Result};
use crate::segmenter::ProcessedText;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Capability interface over a summarization engine.
///
/// Implementations summarize one bounded-size chunk of text; chunk planning
/// and reassembly live in [`Summarizer`].
#[async_trait]
pub trait SummaryEngine: Send + Sync {
    /// Summarize a single chunk of text into a compressed paragraph.
    async fn summarize_chunk(&self, text: &str) -> Result<String>;

    /// Engine identifier for logging.
    fn name(&self) -> &str;
}

/// Derived summary for one job. Always regenerated wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Concatenated chunk summaries, in original chunk order.
    pub overall_summary: String,
    /// Ranked bullet points.
    pub bullet_points: Vec<String>,
    /// Key takeaways (importance-marked sentences).
    pub key_takeaways: Vec<String>,
    /// Quick-revision items (definitions and key terms).
    pub quick_revision_items: Vec<String>,
}

impl Summary {
    /// An empty-but-valid summary, used for silent or empty transcripts.
    pub fn empty() -> Self {
        Self {
            overall_summary: String::new(),
            bullet_points: vec![],
            key_takeaways: vec![],
            quick_revision_items: vec![],
        }
    }
}

/// A planned chunk of topic text awaiting summarization.
#[derive(Debug, Clone)]
struct SummaryChunk {
    index: usize,
    text: String,
}

/// Coordinates chunk planning, engine fan-out, and bullet derivation.
pub struct Summarizer {
    engine: Arc<dyn SummaryEngine>,
    config: SummarizationSettings,
}

impl Summarizer {
    /// Create a summarizer around an engine.
    pub fn new(engine: Arc<dyn SummaryEngine>, config: SummarizationSettings) -> Self {
        Self { engine, config }
    }

    /// Summarize segmented topics into a [`Summary`].
    ///
    /// Chunks are summarized concurrently; concatenation order is determined
    /// by original chunk index, never completion order. A failed chunk falls
    /// back to the extractive scorer when `extractive_fallback` is enabled,
    /// otherwise the failure propagates.
    #[instrument(skip_all, fields(engine = self.engine.name(), topics = processed.topics.len()))]
    pub async fn summarize(&self, processed: &ProcessedText) -> Result<Summary> {
        if processed.cleaned_text.trim().is_empty() {
            debug!("Empty input, producing empty summary");
            return Ok(Summary::empty());
        }

        let chunks = self.plan_chunks(processed);
        debug!("Planned {} chunks", chunks.len());

        let mut results: Vec<(usize, String)> = Vec::with_capacity(chunks.len());
        let mut stream = stream::iter(chunks.into_iter())
            .map(|chunk| async move {
                let result = self.engine.summarize_chunk(&chunk.text).await;
                (chunk.index, chunk.text, result)
            })
            .buffer_unordered(self.config.max_concurrent_chunks.max(1));

        while let Some((index, text, result)) = stream.next().await {
            match result {
                Ok(summary) => results.push((index, summary)),
                Err(e) if self.config.extractive_fallback => {
                    warn!("Chunk {} failed ({}), using extractive fallback", index, e);
                    results.push((index, extractive_summary(&text)));
                }
                Err(e) => {
                    return Err(NotatError::Summarization(format!(
                        "Chunk {} failed: {}",
                        index, e
                    )));
                }
            }
        }

        // Reassemble by original chunk index, not completion order.
        results.sort_by_key(|(index, _)| *index);
        let overall_summary = results
            .into_iter()
            .map(|(_, s)| s)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let bullet_points = self.derive_bullets(processed, &overall_summary);
        let key_takeaways = self.derive_takeaways(processed);
        let quick_revision_items = self.derive_revision_items(processed);

        Ok(Summary {
            overall_summary,
            bullet_points,
            key_takeaways,
            quick_revision_items,
        })
    }

    /// Pack topics into chunks under the character budget.
    ///
    /// A single oversized topic is split at sentence boundaries rather than
    /// truncated; chunking is by character budget, never by topic count.
    fn plan_chunks(&self, processed: &ProcessedText) -> Vec<SummaryChunk> {
        let budget = self.config.chunk_char_budget.max(1);
        let mut pieces: Vec<String> = Vec::new();

        for topic in &processed.topics {
            if topic.body.is_empty() {
                continue;
            }
            if topic.body.len() <= budget {
                let mut piece = topic.body.clone();
                if !piece.ends_with(['.', '!', '?']) {
                    piece.push('.');
                }
                pieces.push(piece);
            } else {
                pieces.extend(split_text_at_sentences(&topic.body, budget));
            }
        }

        let mut chunks: Vec<SummaryChunk> = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            if !current.is_empty() && current.len() + piece.len() + 1 > budget {
                chunks.push(SummaryChunk {
                    index: chunks.len(),
                    text: std::mem::take(&mut current),
                });
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
        if !current.is_empty() {
            chunks.push(SummaryChunk {
                index: chunks.len(),
                text: current,
            });
        }

        chunks
    }

    /// Bullet points: sentences of the overall summary plus high-salience
    /// topic sentences (ones carrying document keywords), re-ranked and capped.
    fn derive_bullets(&self, processed: &ProcessedText, overall_summary: &str) -> Vec<String> {
        let mut candidates: Vec<String> = split_sentences(overall_summary);

        for topic in &processed.topics {
            for sentence in topic.sentences() {
                let lower = sentence.to_lowercase();
                let salient = processed.keywords.iter().any(|kw| lower.contains(kw));
                if salient {
                    candidates.push(sentence.to_string());
                }
            }
        }

        let word_freq = word_frequencies(&processed.cleaned_text);
        let total = candidates.len().max(1);

        let mut scored: Vec<(String, f64)> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let pos = i as f64 / total as f64;
                let score = score_sentence(&s, &word_freq, pos);
                (s, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut seen = std::collections::HashSet::new();
        let mut bullets = Vec::new();
        for (sentence, _) in scored {
            let compressed = compress_sentence(&sentence);
            if compressed.split_whitespace().count() < 4 {
                continue;
            }
            let key = compressed
                .to_lowercase()
                .split_whitespace()
                .take(5)
                .collect::<Vec<_>>()
                .join(" ");
            if !seen.insert(key) {
                continue;
            }

            let mut bullet = compressed;
            if !bullet.ends_with(['.', '!', '?']) {
                bullet.push('.');
            }
            bullets.push(bullet);

            if bullets.len() >= self.config.max_bullet_points {
                break;
            }
        }

        bullets
    }

    /// Key takeaways: the highest-scoring sentences of the cleaned text.
    fn derive_takeaways(&self, processed: &ProcessedText) -> Vec<String> {
        let sentences = split_sentences(&processed.cleaned_text);
        let word_freq = word_frequencies(&processed.cleaned_text);

        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let pos = i as f64 / sentences.len().max(1) as f64;
                (i, score_sentence(s, &word_freq, pos))
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut picks: Vec<usize> = scored
            .iter()
            .take(self.config.max_takeaways)
            .map(|(i, _)| *i)
            .collect();
        picks.sort_unstable();

        picks
            .into_iter()
            .map(|i| {
                let mut t = compress_sentence(&sentences[i]);
                if !t.ends_with(['.', '!', '?']) {
                    t.push('.');
                }
                t
            })
            .collect()
    }

    /// Quick-revision items: definitions first, then remaining key terms.
    fn derive_revision_items(&self, processed: &ProcessedText) -> Vec<String> {
        let mut items: Vec<String> = processed
            .definitions
            .iter()
            .map(|d| format!("{}: {}", d.term, d.definition))
            .collect();

        let defined: std::collections::HashSet<String> = processed
            .definitions
            .iter()
            .map(|d| d.term.to_lowercase())
            .collect();

        for kw in &processed.keywords {
            if items.len() >= self.config.max_revision_items {
                break;
            }
            if !defined.contains(&kw.to_lowercase()) {
                items.push(format!("Key term: {}", kw));
            }
        }

        items.truncate(self.config.max_revision_items);
        items
    }
}

/// Split text into pieces not exceeding `budget` characters, breaking at
/// sentence boundaries. A single sentence longer than the budget becomes its
/// own piece rather than being cut mid-sentence.
fn split_text_at_sentences(text: &str, budget: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let sentence = format!("{}.", sentence);
        if !current.is_empty() && current.len() + sentence.len() + 1 > budget {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

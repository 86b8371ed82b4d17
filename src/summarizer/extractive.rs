//! Extractive summarization engine.
//!
//! Scores sentences by keyword frequency, importance markers, length, and
//! position, then rebuilds a compressed paragraph from the top-ranked ones.
//! Serves as the offline default engine and as the per-chunk fallback when a
//! remote engine fails.

use super::SummaryEngine;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Phrases that mark a sentence as likely important.
const IMPORTANCE_MARKERS: &[&str] = &[
    "important", "key", "significant", "essential", "crucial", "main",
    "fundamental", "primary", "critical", "core", "definition", "defined",
    "means", "refers", "called", "known", "example", "such as", "for instance",
    "therefore", "thus", "hence", "conclusion", "result", "because", "reason",
    "purpose", "advantage", "disadvantage", "benefit", "method", "technique",
    "process", "step", "rule", "principle", "concept", "type", "category",
];

/// Sentence openings stripped during compression.
const FILLER_OPENINGS: &[&str] = &[
    "so ", "well ", "now ", "okay ", "basically ", "essentially ", "actually ",
    "right ", "as we know ", "as we discussed ", "as mentioned ", "as i said ",
    "you know ", "you see ", "i think ", "i believe ",
];

/// Minimal stop word set for frequency counting.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "and", "or",
    "but", "in", "on", "at", "to", "for", "of", "with", "by", "it", "its",
    "this", "that", "as", "from", "has", "have", "had", "not", "will", "would",
    "can", "could", "we", "they", "you", "he", "she", "i", "my", "your", "our",
    "their", "so", "if",
];

/// Offline extractive summarization engine.
pub struct ExtractiveEngine;

impl ExtractiveEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryEngine for ExtractiveEngine {
    async fn summarize_chunk(&self, text: &str) -> Result<String> {
        Ok(extractive_summary(text))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Split text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split_terminator(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Frequency map over lowercased alphabetic words (stop words excluded).
pub fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for word in text.split_whitespace() {
        let w: String = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if w.len() > 2 && w.chars().all(|c| c.is_alphabetic()) && !STOP_WORDS.contains(&w.as_str())
        {
            *freq.entry(w).or_default() += 1;
        }
    }
    freq
}

/// Score a sentence for extraction.
///
/// `position` is the sentence's relative position in the document (0.0-1.0);
/// openings and closings score higher.
pub fn score_sentence(sentence: &str, word_freq: &HashMap<String, usize>, position: f64) -> f64 {
    let words: Vec<String> = sentence
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    let wc = words.len();

    if wc < 4 {
        return 0.0;
    }

    let mut score = 0.0;
    if wc > 50 {
        score -= 1.0;
    }

    for w in &words {
        let trimmed = w.trim_matches(|c: char| !c.is_alphanumeric());
        if let Some(f) = word_freq.get(trimmed) {
            score += *f as f64 * 0.5;
        }
    }

    let lower = sentence.to_lowercase();
    for marker in IMPORTANCE_MARKERS {
        if lower.contains(marker) {
            score += 2.0;
        }
    }

    if (8..=30).contains(&wc) {
        score += 2.0;
    } else if (5..=40).contains(&wc) {
        score += 1.0;
    }

    if position < 0.2 {
        score += 1.5;
    } else if position > 0.9 {
        score += 1.0;
    }

    if sentence.chars().any(|c| c.is_ascii_digit()) {
        score += 0.5;
    }

    score
}

/// Shorten a sentence by stripping filler openings and capitalizing.
pub fn compress_sentence(sentence: &str) -> String {
    let mut s = sentence.trim().trim_end_matches(['.', '!', '?']).to_string();

    loop {
        let lower = s.to_lowercase();
        let Some(opening) = FILLER_OPENINGS.iter().find(|o| lower.starts_with(*o)) else {
            break;
        };
        s = s[opening.len()..].trim_start_matches(',').trim().to_string();
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Generate a compressed extractive summary of a text.
///
/// Picks roughly the top 40% of sentences (between 2 and 5), re-orders them by
/// original position, and merges them with near-duplicates removed.
pub fn extractive_summary(text: &str) -> String {
    let sentences = split_sentences(text);
    let word_count = text.split_whitespace().count();

    // Very short input: just compress.
    if word_count < 30 || sentences.len() <= 1 {
        return compress_sentence(text);
    }

    let word_freq = word_frequencies(text);

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let pos = i as f64 / sentences.len().max(1) as f64;
            (i, score_sentence(s, &word_freq, pos))
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let pick_count = (sentences.len() * 2 / 5).clamp(2, 5);
    let mut selected: Vec<usize> = scored.iter().take(pick_count).map(|(i, _)| *i).collect();
    selected.sort_unstable();

    let chosen: Vec<&str> = selected.iter().map(|&i| sentences[i].as_str()).collect();
    merge_sentences(&chosen)
}

/// Merge sentences into one paragraph, dropping near-duplicates
/// (same first five words) and compressing each survivor.
pub fn merge_sentences(sentences: &[&str]) -> String {
    let mut seen_starts = std::collections::HashSet::new();
    let mut parts = Vec::new();

    for s in sentences {
        let key = s
            .to_lowercase()
            .split_whitespace()
            .take(5)
            .collect::<Vec<_>>()
            .join(" ");
        if !seen_starts.insert(key) {
            continue;
        }
        let compressed = compress_sentence(s);
        if !compressed.is_empty() {
            parts.push(compressed);
        }
    }

    let mut summary = parts.join(". ");
    if !summary.is_empty() && !summary.ends_with('.') {
        summary.push('.');
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_strips_filler_openings() {
        assert_eq!(
            compress_sentence("so basically the heap is a tree."),
            "The heap is a tree"
        );
        assert_eq!(compress_sentence("Well, recursion works"), "Recursion works");
    }

    #[test]
    fn test_score_rewards_markers_and_position() {
        let freq = word_frequencies("recursion recursion base case function");
        let with_marker =
            score_sentence("The key concept here is recursion with a base case", &freq, 0.0);
        let without =
            score_sentence("We then went outside for a short break today", &freq, 0.5);
        assert!(with_marker > without);
    }

    #[test]
    fn test_short_sentences_score_zero() {
        let freq = HashMap::new();
        assert_eq!(score_sentence("Too short", &freq, 0.0), 0.0);
    }

    #[test]
    fn test_extractive_summary_compresses() {
        let text = "Sorting algorithms order elements of a list. The most important \
                    examples are quicksort and mergesort. Quicksort partitions around \
                    a pivot element. Mergesort splits the list and merges sorted halves. \
                    Both run in n log n time on average. We also mentioned bubble sort \
                    briefly. Bubble sort is mainly of historical interest. Stability \
                    matters when sorting records by multiple keys.";
        let summary = extractive_summary(text);

        assert!(!summary.is_empty());
        assert!(summary.split_whitespace().count() < text.split_whitespace().count());
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_merge_drops_near_duplicates() {
        let merged = merge_sentences(&[
            "The heap is a tree shaped structure",
            "The heap is a tree with extra rules",
            "Arrays store elements contiguously",
        ]);
        assert_eq!(merged.matches("The heap").count(), 1);
        assert!(merged.contains("Arrays store"));
    }

    #[tokio::test]
    async fn test_engine_contract() {
        let engine = ExtractiveEngine::new();
        let out = engine
            .summarize_chunk("The cat sat on the mat. The dog ran fast and far away today.")
            .await
            .unwrap();
        assert!(!out.is_empty());
        assert_eq!(engine.name(), "extractive");
    }
}

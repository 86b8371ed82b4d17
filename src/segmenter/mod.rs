//! Transcript segmentation and enrichment.
//!
//! Cleans transcript text, groups sentences into topic-bearing sections using
//! a lexical-shift boundary heuristic, and extracts keywords, key phrases, and
//! definitions. All thresholds come from [`SegmentationSettings`].

mod models;

pub use models::{Definition, ProcessedText, Topic};

use crate::config::SegmentationSettings;
use crate::error::Result;
use crate::transcription::Transcript;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Filler tokens removed during normalization. Lossy and irreversible.
const FILLER_WORDS: &[&str] = &[
    "um", "uh", "ah", "er", "erm", "you know", "i mean", "sort of", "kind of", "basically",
];

/// Structural markers that open a new topic.
const TOPIC_MARKERS: &[&str] = &[
    "next",
    "moving on",
    "now let's",
    "now lets",
    "let's move",
    "turning to",
    "another topic",
    "to summarize",
    "in conclusion",
    "finally",
];

/// Basic stop words excluded from keyword ranking.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "for",
    "from", "had", "has", "have", "he", "her", "his", "i", "if", "in", "is", "it", "its",
    "my", "not", "of", "on", "or", "our", "she", "so", "that", "the", "their", "they",
    "this", "to", "was", "we", "were", "will", "with", "would", "you", "your",
];

/// Splits a transcript into topics and extracts note-worthy content.
pub struct Segmenter {
    config: SegmentationSettings,
    filler_regex: Regex,
    bracket_regex: Regex,
    whitespace_regex: Regex,
    sentence_regex: Regex,
    definition_regex: Regex,
}

impl Segmenter {
    /// Create a segmenter with the given settings.
    pub fn new(config: SegmentationSettings) -> Self {
        let filler_pattern = format!(r"(?i)\b(?:{})\b", FILLER_WORDS.join("|"));

        Self {
            config,
            filler_regex: Regex::new(&filler_pattern).expect("Invalid regex"),
            // Bracketed annotations like [inaudible] and parenthetical asides
            bracket_regex: Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("Invalid regex"),
            whitespace_regex: Regex::new(r"\s+").expect("Invalid regex"),
            sentence_regex: Regex::new(r"[.!?]+").expect("Invalid regex"),
            definition_regex: Regex::new(
                r"(?i)^(?:a |an |the )?([a-z][a-z0-9' -]{2,40}?)\s+(?:is defined as|is called|refers to|means|is|are)\s+(.{8,})$",
            )
            .expect("Invalid regex"),
        }
    }

    /// Segment a transcript into topics, definitions, and keyword sets.
    ///
    /// Never fails on empty or degenerate input: an empty transcript yields a
    /// single empty topic so callers still see a valid structure.
    #[instrument(skip_all, fields(chars = transcript.full_text.len()))]
    pub fn segment(&self, transcript: &Transcript) -> Result<ProcessedText> {
        let cleaned = self.normalize(&transcript.full_text);
        let sentences = self.split_sentences(&cleaned);

        let word_count = cleaned.split_whitespace().count();
        let sentence_count = sentences.len();

        if sentences.is_empty() {
            debug!("Empty transcript, emitting a single empty topic");
            return Ok(ProcessedText {
                cleaned_text: cleaned,
                topics: vec![Topic::empty(0)],
                definitions: vec![],
                keywords: vec![],
                key_phrases: vec![],
                word_count,
                sentence_count,
            });
        }

        let runs = self.group_into_runs(&sentences);
        debug!("Grouped {} sentences into {} topics", sentences.len(), runs.len());

        let topics: Vec<Topic> = runs
            .iter()
            .enumerate()
            .map(|(index, run)| self.build_topic(index, run))
            .collect();

        let definitions = self.extract_definitions(&sentences);
        let keywords = self.aggregate_keywords(&topics, &cleaned);
        let key_phrases = self.aggregate_phrases(&topics, &sentences);

        Ok(ProcessedText {
            cleaned_text: cleaned,
            topics,
            definitions,
            keywords,
            key_phrases,
            word_count,
            sentence_count,
        })
    }

    /// Clean transcript text: collapse whitespace, strip fillers and
    /// bracketed asides.
    fn normalize(&self, text: &str) -> String {
        let text = self.bracket_regex.replace_all(text, " ");
        let text = self.filler_regex.replace_all(&text, " ");
        self.whitespace_regex
            .replace_all(&text, " ")
            .trim()
            .to_string()
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        self.sentence_regex
            .split(text)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Group sentences into topic runs.
    ///
    /// A new run starts when the current run holds at least
    /// `min_topic_sentences` and either the next sentence opens with a
    /// structural marker or lexical similarity to the trailing window drops
    /// below `boundary_similarity`. Runs are also capped at
    /// `max_topic_sentences`. The tie-break prefers fewer, larger topics: an
    /// undersized trailing run merges into its predecessor.
    fn group_into_runs(&self, sentences: &[String]) -> Vec<Vec<String>> {
        let mut runs: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for sentence in sentences {
            if !current.is_empty() {
                let forced = current.len() >= self.config.max_topic_sentences;
                let eligible = current.len() >= self.config.min_topic_sentences;
                let shift = eligible
                    && (self.starts_with_marker(sentence)
                        || self.window_similarity(&current, sentence)
                            < self.config.boundary_similarity);

                if forced || shift {
                    runs.push(std::mem::take(&mut current));
                }
            }
            current.push(sentence.clone());
        }

        if !current.is_empty() {
            // Merge an undersized tail into the previous topic.
            if current.len() < self.config.min_topic_sentences && !runs.is_empty() {
                runs.last_mut().unwrap().extend(current);
            } else {
                runs.push(current);
            }
        }

        runs
    }

    fn starts_with_marker(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        TOPIC_MARKERS.iter().any(|m| lower.starts_with(m))
    }

    /// Jaccard similarity between the trailing sentence window and the next
    /// sentence, over content words.
    fn window_similarity(&self, current: &[String], next: &str) -> f64 {
        let window_start = current.len().saturating_sub(self.config.window_sentences);
        let window_words: HashSet<String> = current[window_start..]
            .iter()
            .flat_map(|s| content_words(s))
            .collect();
        let next_words: HashSet<String> = content_words(next).into_iter().collect();

        if window_words.is_empty() || next_words.is_empty() {
            // Nothing to compare; assume continuity rather than forcing a split.
            return 1.0;
        }

        let intersection = window_words.intersection(&next_words).count() as f64;
        let union = window_words.union(&next_words).count() as f64;
        intersection / union
    }

    fn build_topic(&self, index: usize, run: &[String]) -> Topic {
        let body = run.join(". ");
        let keywords = rank_keywords(&body, self.config.max_topic_keywords);
        let key_phrases = rank_phrases(run, self.config.max_topic_keywords);
        let title = derive_title(run, &keywords);

        // One bullet per sentence, capped; renderers may use body or bullets.
        let bullets: Vec<String> = run
            .iter()
            .take(4)
            .map(|s| {
                let mut b = s.clone();
                if !b.ends_with(['.', '!', '?']) {
                    b.push('.');
                }
                b
            })
            .collect();

        Topic {
            index,
            title,
            body,
            bullets,
            keywords,
            key_phrases,
        }
    }

    /// Pattern-match definitions of the form `<term> is/refers to/means <definition>`.
    ///
    /// Ambiguous matches are kept; duplicates by term are allowed.
    fn extract_definitions(&self, sentences: &[String]) -> Vec<Definition> {
        let mut definitions = Vec::new();

        for sentence in sentences {
            if let Some(caps) = self.definition_regex.captures(sentence) {
                let term = caps[1].trim().to_string();
                let definition = caps[2].trim().to_string();

                // Terms longer than a short noun phrase are almost always
                // ordinary prose, not definitions.
                if term.split_whitespace().count() <= 4 {
                    definitions.push(Definition { term, definition });
                }
            }
        }

        definitions
    }

    /// Document-level keywords: de-duplicated union of per-topic keywords,
    /// ranked by global frequency.
    fn aggregate_keywords(&self, topics: &[Topic], cleaned_text: &str) -> Vec<String> {
        let global_freq = word_frequencies(cleaned_text);

        let mut union: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for topic in topics {
            for kw in &topic.keywords {
                if seen.insert(kw.clone()) {
                    union.push(kw.clone());
                }
            }
        }

        union.sort_by(|a, b| {
            let fa = global_freq.get(a).copied().unwrap_or(0);
            let fb = global_freq.get(b).copied().unwrap_or(0);
            fb.cmp(&fa).then_with(|| a.cmp(b))
        });
        union.truncate(self.config.max_document_keywords);
        union
    }

    /// Document-level key phrases: per-topic bigrams ranked by global frequency.
    fn aggregate_phrases(&self, topics: &[Topic], sentences: &[String]) -> Vec<String> {
        let mut global_freq: HashMap<String, usize> = HashMap::new();
        for sentence in sentences {
            let words = content_words(sentence);
            for pair in words.windows(2) {
                *global_freq.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
            }
        }

        let mut union: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for topic in topics {
            for phrase in &topic.key_phrases {
                if seen.insert(phrase.clone()) {
                    union.push(phrase.clone());
                }
            }
        }

        union.sort_by(|a, b| {
            let fa = global_freq.get(a).copied().unwrap_or(0);
            let fb = global_freq.get(b).copied().unwrap_or(0);
            fb.cmp(&fa).then_with(|| a.cmp(b))
        });
        union.truncate(self.config.max_document_phrases);
        union
    }
}

/// Lowercased content words of a sentence: alphanumeric, not a stop word,
/// longer than two characters.
fn content_words(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.len() > 2 && w.chars().all(|c| c.is_alphanumeric()))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Frequency map over the content words of a text.
fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for word in content_words(text) {
        *freq.entry(word).or_default() += 1;
    }
    freq
}

/// Rank content words of a text by frequency, capped at `top_n`.
fn rank_keywords(text: &str, top_n: usize) -> Vec<String> {
    let freq = word_frequencies(text);
    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(top_n).map(|(w, _)| w).collect()
}

/// Rank adjacent content-word bigrams of a sentence run, capped at `top_n`.
fn rank_phrases(run: &[String], top_n: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for sentence in run {
        let words = content_words(sentence);
        for pair in words.windows(2) {
            *freq.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(top_n).map(|(p, _)| p).collect()
}

/// Derive a topic title from the opening words, falling back to keywords.
fn derive_title(run: &[String], keywords: &[String]) -> String {
    if let Some(first) = run.first() {
        let opening: Vec<&str> = first.split_whitespace().take(6).collect();
        if !opening.is_empty() {
            return title_case(&opening.join(" "));
        }
    }

    if keywords.is_empty() {
        "Untitled Topic".to_string()
    } else {
        title_case(&keywords[..keywords.len().min(3)].join(" "))
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptSegment;

    fn segmenter() -> Segmenter {
        Segmenter::new(SegmentationSettings::default())
    }

    fn transcript_of(text: &str) -> Transcript {
        Transcript::new(
            vec![TranscriptSegment::new(0.0, 60.0, text.to_string())],
            Some("en".to_string()),
        )
    }

    #[test]
    fn test_normalize_strips_fillers_and_brackets() {
        let s = segmenter();
        let cleaned = s.normalize("So um the heap is, uh, [inaudible] a tree (I think) structure.");
        assert!(!cleaned.contains("um"));
        assert!(!cleaned.contains("inaudible"));
        assert!(!cleaned.contains("I think"));
        assert!(cleaned.contains("heap"));
    }

    #[test]
    fn test_short_transcript_yields_single_topic() {
        let s = segmenter();
        let processed = s
            .segment(&transcript_of("the cat sat on the mat. the dog ran fast."))
            .unwrap();

        assert_eq!(processed.topics.len(), 1);
        assert!(processed.keywords.contains(&"cat".to_string()));
        assert!(processed.keywords.contains(&"dog".to_string()));
        assert_eq!(processed.sentence_count, 2);
    }

    #[test]
    fn test_empty_transcript_yields_empty_topic_not_error() {
        let s = segmenter();
        let processed = s.segment(&Transcript::with_duration(vec![], 0.0, None)).unwrap();

        assert_eq!(processed.topics.len(), 1);
        assert!(processed.topics[0].body.is_empty());
        assert!(processed.keywords.is_empty());
        assert_eq!(processed.word_count, 0);
    }

    #[test]
    fn test_structural_marker_starts_new_topic() {
        let s = Segmenter::new(SegmentationSettings {
            min_topic_sentences: 2,
            ..SegmentationSettings::default()
        });

        let text = "Graphs model relationships between entities. A graph has vertices and edges. \
                    Moving on to trees now. A tree is a connected acyclic graph. \
                    Trees have exactly one root node.";
        let processed = s.segment(&transcript_of(text)).unwrap();

        assert_eq!(processed.topics.len(), 2);
        assert!(processed.topics[1].body.starts_with("Moving on"));
    }

    #[test]
    fn test_topic_order_is_chronological() {
        let s = Segmenter::new(SegmentationSettings {
            min_topic_sentences: 1,
            max_topic_sentences: 2,
            ..SegmentationSettings::default()
        });

        let text = "Alpha first point here. Alpha second point here. \
                    Bravo opens a fresh subject. Bravo continues that subject. \
                    Charlie closes the lecture. Charlie repeats the close.";
        let processed = s.segment(&transcript_of(text)).unwrap();

        let indices: Vec<usize> = processed.topics.iter().map(|t| t.index).collect();
        assert_eq!(indices, (0..processed.topics.len()).collect::<Vec<_>>());
        assert!(processed.topics[0].body.contains("Alpha"));
        assert!(processed.topics.last().unwrap().body.contains("Charlie"));
    }

    #[test]
    fn test_definition_extraction() {
        let s = segmenter();
        let text = "A stack is a last-in first-out collection of elements. \
                    Recursion means a function calling itself until a base case. \
                    We walked through several examples on the board today.";
        let processed = s.segment(&transcript_of(text)).unwrap();

        let terms: Vec<&str> = processed.definitions.iter().map(|d| d.term.as_str()).collect();
        assert!(terms.contains(&"stack"));
        assert!(terms.contains(&"Recursion"));
    }

    #[test]
    fn test_duplicate_definitions_are_kept() {
        let s = segmenter();
        let text = "A heap is a tree-shaped priority structure for quick access. \
                    A heap is also a region of memory used for allocation.";
        let processed = s.segment(&transcript_of(text)).unwrap();

        let heap_count = processed
            .definitions
            .iter()
            .filter(|d| d.term.eq_ignore_ascii_case("heap"))
            .count();
        assert_eq!(heap_count, 2);
    }

    #[test]
    fn test_keyword_cap_respected() {
        let s = Segmenter::new(SegmentationSettings {
            max_document_keywords: 3,
            ..SegmentationSettings::default()
        });
        let text = "compilers parse tokens. parsers build syntax trees. \
                    lexers scan characters. optimizers rewrite syntax trees. \
                    compilers emit machine code for processors.";
        let processed = s.segment(&transcript_of(text)).unwrap();

        assert!(processed.keywords.len() <= 3);
    }
}

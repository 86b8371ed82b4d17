//! Markdown rendering of structured notes.
//!
//! Deliberately timestamp-free so that re-exporting identical notes yields a
//! byte-identical artifact.

use crate::notes::StructuredNotes;

/// Render structured notes as a Markdown document.
pub fn render_markdown(notes: &StructuredNotes, title: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(&format!(
        "**Duration:** {:.0} seconds\n",
        notes.transcript.duration_seconds
    ));
    md.push_str(&format!(
        "**Language:** {}\n\n",
        notes.transcript.language.as_deref().unwrap_or("unknown")
    ));

    md.push_str("## Summary\n\n");
    md.push_str(&notes.summary.overall_summary);
    md.push_str("\n\n");

    md.push_str("## Key Points\n\n");
    for (i, point) in notes.summary.bullet_points.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, point));
    }
    md.push('\n');

    md.push_str("## Key Terms & Concepts\n\n");
    for keyword in &notes.keywords {
        md.push_str(&format!("- {}\n", keyword));
    }
    md.push('\n');

    if !notes.key_phrases.is_empty() {
        md.push_str("## Key Phrases\n\n");
        for phrase in &notes.key_phrases {
            md.push_str(&format!("- {}\n", phrase));
        }
        md.push('\n');
    }

    md.push_str("## Topics\n\n");
    for topic in &notes.topics {
        md.push_str(&format!("### {}\n\n", topic.title));
        if !topic.body.is_empty() {
            md.push_str(&topic.body);
            md.push_str("\n\n");
        }
        if !topic.keywords.is_empty() {
            md.push_str(&format!("*Keywords: {}*\n\n", topic.keywords.join(", ")));
        }
    }

    if !notes.definitions.is_empty() {
        md.push_str("## Definitions\n\n");
        for def in &notes.definitions {
            md.push_str(&format!("- **{}** — {}\n", def.term, def.definition));
        }
        md.push('\n');
    }

    if !notes.summary.key_takeaways.is_empty() {
        md.push_str("## Key Takeaways\n\n");
        for (i, takeaway) in notes.summary.key_takeaways.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, takeaway));
        }
        md.push('\n');
    }

    if !notes.summary.quick_revision_items.is_empty() {
        md.push_str("## Quick Revision\n\n");
        for (i, item) in notes.summary.quick_revision_items.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, item));
        }
        md.push('\n');
    }

    md.push_str("## Full Transcript\n\n");
    md.push_str(&notes.transcript.text);
    md.push_str("\n\n");

    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Word Count:** {}\n", notes.word_count));
    md.push_str(&format!("- **Sentence Count:** {}\n", notes.sentence_count));
    md.push_str(&format!("- **Sections:** {}\n", notes.section_count));

    md
}

/// Strip Markdown syntax for plain-text renderers.
pub fn to_plain_text(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            line.trim_start_matches('#')
                .trim_start()
                .replace("**", "")
                .replace('*', "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::TranscriptInfo;
    use crate::segmenter::{Definition, Topic};
    use crate::summarizer::Summary;

    fn sample_notes() -> StructuredNotes {
        StructuredNotes {
            transcript: TranscriptInfo {
                text: "the cat sat on the mat. the dog ran fast.".to_string(),
                duration_seconds: 60.0,
                language: Some("en".to_string()),
                segment_count: 1,
            },
            topics: vec![Topic {
                index: 0,
                title: "Animals In Motion".to_string(),
                body: "the cat sat on the mat".to_string(),
                bullets: vec![],
                keywords: vec!["cat".to_string()],
                key_phrases: vec![],
            }],
            definitions: vec![Definition {
                term: "mat".to_string(),
                definition: "a floor covering".to_string(),
            }],
            summary: Summary {
                overall_summary: "Animals did things.".to_string(),
                bullet_points: vec!["The cat sat.".to_string(), "The dog ran.".to_string()],
                key_takeaways: vec!["Watch the animals.".to_string()],
                quick_revision_items: vec!["Key term: cat".to_string()],
            },
            keywords: vec!["cat".to_string(), "dog".to_string()],
            key_phrases: vec!["cat sat".to_string()],
            word_count: 10,
            sentence_count: 2,
            section_count: 1,
        }
    }

    /// Parse topic titles, key-point count, and keywords back out of
    /// rendered markdown.
    fn parse_markdown(md: &str) -> (Vec<String>, usize, Vec<String>) {
        let mut titles = Vec::new();
        let mut bullet_count = 0;
        let mut keywords = Vec::new();
        let mut section = String::new();

        for line in md.lines() {
            if let Some(heading) = line.strip_prefix("## ") {
                section = heading.to_string();
            } else if let Some(title) = line.strip_prefix("### ") {
                titles.push(title.to_string());
            } else if section == "Key Points" && line.chars().next().is_some_and(|c| c.is_ascii_digit())
            {
                bullet_count += 1;
            } else if section == "Key Terms & Concepts" {
                if let Some(kw) = line.strip_prefix("- ") {
                    keywords.push(kw.to_string());
                }
            }
        }

        (titles, bullet_count, keywords)
    }

    #[test]
    fn test_markdown_round_trip() {
        let notes = sample_notes();
        let md = render_markdown(&notes, "Lecture Notes");

        let (titles, bullet_count, keywords) = parse_markdown(&md);
        assert_eq!(
            titles,
            notes.topics.iter().map(|t| t.title.clone()).collect::<Vec<_>>()
        );
        assert_eq!(bullet_count, notes.summary.bullet_points.len());
        assert_eq!(keywords, notes.keywords);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let notes = sample_notes();
        assert_eq!(
            render_markdown(&notes, "Lecture Notes"),
            render_markdown(&notes, "Lecture Notes")
        );
    }

    #[test]
    fn test_numbered_lists_preserved() {
        let md = render_markdown(&sample_notes(), "Lecture Notes");
        assert!(md.contains("1. The cat sat."));
        assert!(md.contains("2. The dog ran."));
        assert!(md.contains("## Quick Revision\n\n1. Key term: cat"));
    }

    #[test]
    fn test_plain_text_strips_syntax() {
        let plain = to_plain_text("# Title\n**bold** and *italic*");
        assert!(plain.contains("Title"));
        assert!(!plain.contains('#'));
        assert!(!plain.contains('*'));
    }
}

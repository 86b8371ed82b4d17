//! PDF rendering of structured notes.
//!
//! Renders the plain-text form of the markdown document with simple line
//! wrapping and pagination; layout beyond that is not a goal.

use super::markdown;
use crate::error::{NotatError, Result};
use crate::notes::StructuredNotes;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 16.0;
const MAX_LINE_CHARS: usize = 95;

/// Render notes into a PDF file at `path`.
pub fn render_pdf(notes: &StructuredNotes, title: &str, path: &Path) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| NotatError::Export(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| NotatError::Export(format!("PDF font error: {e}")))?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    current_layer.use_text(title, TITLE_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
    y -= LINE_HEIGHT_MM * 2.0;

    let body = markdown::to_plain_text(&markdown::render_markdown(notes, title));

    for line in body.lines().skip(1) {
        for wrapped in wrap_line(line, MAX_LINE_CHARS) {
            if y < MARGIN_MM {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                current_layer = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }

            if !wrapped.trim().is_empty() {
                current_layer.use_text(wrapped, FONT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_HEIGHT_MM;
        }
    }

    let file = std::fs::File::create(path)
        .map_err(|e| NotatError::Export(format!("Failed to create PDF file: {e}")))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| NotatError::Export(format!("Failed to write PDF: {e}")))?;

    Ok(())
}

/// Wrap a line at word boundaries to fit `max_chars` columns.
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    if line.len() <= max_chars {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_line_short_passthrough() {
        assert_eq!(wrap_line("short line", 20), vec!["short line"]);
    }

    #[test]
    fn test_wrap_line_splits_at_words() {
        let wrapped = wrap_line("alpha bravo charlie delta echo", 12);
        assert!(wrapped.len() > 1);
        for piece in &wrapped {
            assert!(piece.len() <= 12);
        }
        assert_eq!(wrapped.join(" "), "alpha bravo charlie delta echo");
    }
}

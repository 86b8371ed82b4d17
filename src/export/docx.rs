//! DOCX rendering of structured notes.
//!
//! Maps the markdown document's headings and list lines onto DOCX
//! paragraphs; styling beyond heading weight is not a goal.

use super::markdown;
use crate::error::{NotatError, Result};
use crate::notes::StructuredNotes;
use docx_rs::{Docx, Paragraph, Run};
use std::path::Path;

/// Render notes into a DOCX file at `path`.
pub fn render_docx(notes: &StructuredNotes, title: &str, path: &Path) -> Result<()> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).bold().size(36)),
    );

    let body = markdown::render_markdown(notes, title);

    for line in body.lines().skip(1) {
        docx = docx.add_paragraph(paragraph_for(line));
    }

    let file = std::fs::File::create(path)
        .map_err(|e| NotatError::Export(format!("Failed to create DOCX file: {e}")))?;
    docx.build()
        .pack(file)
        .map_err(|e| NotatError::Export(format!("Failed to write DOCX: {e}")))?;

    Ok(())
}

fn paragraph_for(line: &str) -> Paragraph {
    if let Some(heading) = line.strip_prefix("### ") {
        Paragraph::new().add_run(Run::new().add_text(heading).bold().size(24))
    } else if let Some(heading) = line.strip_prefix("## ") {
        Paragraph::new().add_run(Run::new().add_text(heading).bold().size(28))
    } else if let Some(heading) = line.strip_prefix("# ") {
        Paragraph::new().add_run(Run::new().add_text(heading).bold().size(32))
    } else {
        let text = line.replace("**", "").replace('*', "");
        Paragraph::new().add_run(Run::new().add_text(text).size(22))
    }
}

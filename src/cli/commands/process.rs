//! Process command implementation.
//!
//! One-shot pipeline: upload a local file, run every stage, optionally
//! export the resulting notes.

use crate::cli::Output;
use crate::config::Settings;
use crate::export::ExportSelection;
use crate::orchestrator::{ExportReport, FormatOutcome, Orchestrator};
use anyhow::Result;
use std::path::Path;

/// Run the process command.
pub async fn run_process(
    input: &str,
    export: Option<String>,
    title: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let input_path = Path::new(input);
    if !input_path.is_file() {
        Output::error(&format!("File not found: {}", input));
        anyhow::bail!("File not found: {}", input);
    }

    let selection: Option<ExportSelection> = match export.as_deref() {
        Some(s) => Some(s.parse().map_err(|e: String| anyhow::anyhow!(e))?),
        None => None,
    };

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let bytes = tokio::fs::read(input_path).await?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Processing lecture...");
    let job_id = orchestrator.create_job(&filename, &bytes).await?;
    let report = match orchestrator.run_pipeline(job_id).await {
        Ok(report) => {
            spinner.finish_and_clear();
            report
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Pipeline failed: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Output::header("Lecture processed");
        Output::kv("Job", &job_id.to_string());
        Output::kv(
            "Duration",
            &format!("{:.0}s", report.transcript.duration),
        );
        Output::kv("Words", &report.processed_data.word_count.to_string());
        Output::kv("Sections", &report.processed_data.section_count.to_string());
        Output::kv(
            "Keywords",
            &report.processed_data.keywords.join(", "),
        );

        if !report.summaries.overall_summary.is_empty() {
            Output::header("Summary");
            println!("{}", report.summaries.overall_summary);
        }

        if !report.summaries.bullet_points.is_empty() {
            Output::header("Key Points");
            for point in &report.summaries.bullet_points {
                Output::list_item(point);
            }
        }
    }

    if let Some(selection) = selection {
        let export_report = orchestrator.export_job(job_id, selection, title.as_deref())?;
        match export_report {
            ExportReport::Single { format, file_path, .. } => {
                Output::success(&format!("Exported {} to {}", format, file_path));
            }
            ExportReport::All { files, .. } => {
                for (format, outcome) in files {
                    match outcome {
                        FormatOutcome::Success { file_path } => {
                            Output::success(&format!("Exported {} to {}", format, file_path));
                        }
                        FormatOutcome::Error { error } => {
                            Output::warning(&format!("Export {} failed: {}", format, error));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

//! Report assembly and categorized output writing.
//!
//! Every generation writes two kinds of artifacts: the assembled report into
//! the task's output directory, and a JSON sidecar of each extracted source
//! document into `output/extracted/` so the raw data that fed the model is
//! archived alongside its output.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::extract::ExtractedDocument;

const RULE_WIDTH: usize = 80;

/// A titled report with ordered sections.
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    sections: Vec<(String, String)>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section. Empty bodies are dropped.
    pub fn section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.trim().is_empty() {
            self.sections.push((heading.into(), body));
        }
        self
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let thin = "-".repeat(RULE_WIDTH);

        let mut lines = vec![
            rule.clone(),
            format!("  {}", self.title),
            rule.clone(),
            String::new(),
            format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            "Generator: pitchdesk".to_string(),
            String::new(),
            rule.clone(),
        ];

        for (heading, body) in &self.sections {
            lines.push(String::new());
            lines.push(format!("### {}", heading));
            lines.push(thin.clone());
            lines.push(body.clone());
            lines.push(String::new());
            lines.push(thin.clone());
        }

        lines.push(String::new());
        lines.push(rule.clone());
        lines.push("End of report".to_string());
        lines.push(rule);

        lines.join("\n")
    }
}

/// Default output file name: `<stem>_<YYYYmmdd_HHMMSS>.md`.
pub fn default_file_name(stem: &str) -> String {
    format!("{}_{}.md", stem, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write a rendered report into the task's output directory. Returns the
/// written path.
pub fn write_report(
    workspace: &WorkspaceConfig,
    task_dir: &str,
    file_name: Option<String>,
    stem: &str,
    report: &Report,
) -> Result<PathBuf> {
    let dir = workspace.task_dir(task_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(file_name.unwrap_or_else(|| default_file_name(stem)));
    std::fs::write(&path, report.render())
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(path)
}

/// JSON sidecar: the structured extraction plus provenance for the source
/// file it came from.
#[derive(Debug, Serialize)]
struct ExtractedSidecar<'a> {
    source_path: String,
    source_sha256: String,
    extracted_at: String,
    document: &'a ExtractedDocument,
}

/// Archive an extracted document as JSON under `output/extracted/`.
pub fn write_extracted(
    workspace: &WorkspaceConfig,
    source: &Path,
    document: &ExtractedDocument,
) -> Result<PathBuf> {
    let dir = workspace.task_dir("extracted");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let bytes = std::fs::read(source)
        .with_context(|| format!("Failed to read source file: {}", source.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let source_sha256 = format!("{:x}", hasher.finalize());

    let sidecar = ExtractedSidecar {
        source_path: source.display().to_string(),
        source_sha256,
        extracted_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        document,
    };

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let path = dir.join(format!(
        "{}_{}.json",
        stem,
        Local::now().format("%Y%m%d_%H%M%S")
    ));

    let json = serde_json::to_string_pretty(&sidecar)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write extracted data: {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DocumentContent;

    #[test]
    fn render_includes_title_and_sections_in_order() {
        let report = Report::new("Product Analysis")
            .section("Product", "plan details")
            .section("Result", "the verdict");
        let text = report.render();
        assert!(text.contains("  Product Analysis"));
        assert!(text.contains("### Product"));
        assert!(text.contains("plan details"));
        assert!(text.contains("End of report"));
        let product_pos = text.find("### Product").unwrap();
        let result_pos = text.find("### Result").unwrap();
        assert!(product_pos < result_pos);
    }

    #[test]
    fn empty_sections_are_dropped() {
        let report = Report::new("T").section("Empty", "   ").section("Kept", "x");
        let text = report.render();
        assert!(!text.contains("### Empty"));
        assert!(text.contains("### Kept"));
    }

    #[test]
    fn write_report_places_file_in_task_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspaceConfig {
            root: dir.path().to_path_buf(),
        };
        let report = Report::new("T").section("S", "body");
        let path = write_report(&ws, "analysis", Some("out.md".to_string()), "analysis", &report)
            .unwrap();
        assert_eq!(path, ws.task_dir("analysis").join("out.md"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("body"));
    }

    #[test]
    fn default_file_name_has_stem_and_extension() {
        let name = default_file_name("pitch_friendly");
        assert!(name.starts_with("pitch_friendly_"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn write_extracted_records_hash_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspaceConfig {
            root: dir.path().to_path_buf(),
        };
        let source = dir.path().join("plan.docx");
        std::fs::write(&source, b"source bytes").unwrap();

        let doc = ExtractedDocument {
            file_name: "plan.docx".to_string(),
            content: DocumentContent::WordDocument {
                paragraphs: vec!["hello".to_string()],
                tables: vec![],
            },
        };

        let path = write_extracted(&ws, &source, &doc).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["document"]["file_name"], "plan.docx");
        assert_eq!(json["document"]["content"]["kind"], "word_document");
        assert_eq!(
            json["source_sha256"].as_str().unwrap().len(),
            64,
            "sha256 hex digest"
        );
        assert!(json["document"]["content"]["paragraphs"][0] == "hello");
    }
}

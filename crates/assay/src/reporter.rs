//! Reporter - one report per test run
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Recorder ──push──► Report ──┬── render_html   (markup kept)       │
//! │                              ├── render_junit  (one testcase/check)│
//! │                              └── render_json   (serde)             │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are stored in the order they were recorded and are never
//! mutated afterwards.

use crate::markup;
use crate::recorder::{format_seconds, CheckResult, Status};
use crate::result::AssayResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Output format for a written report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Standalone HTML page
    Html,
    /// JUnit XML for CI
    Junit,
    /// JSON document
    Json,
}

impl ReportFormat {
    /// All formats
    pub const ALL: [Self; 3] = [Self::Html, Self::Junit, Self::Json];

    /// File extension
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Junit => "xml",
            Self::Json => "json",
        }
    }
}

/// Ordered check results of one test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Test name
    pub test_name: String,
    /// Unique id of the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    entries: Vec<CheckResult>,
}

impl Report {
    /// Create an empty report
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: CheckResult) -> &CheckResult {
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub(crate) fn extend(&mut self, other: Self) {
        let offset = self.entries.len();
        self.entries
            .extend(other.entries.into_iter().enumerate().map(|(i, mut entry)| {
                entry.sequence = offset + i + 1;
                entry
            }));
    }

    /// Recorded entries
    #[must_use]
    pub fn entries(&self) -> &[CheckResult] {
        &self.entries
    }

    /// Get number of passed checks
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_pass()).count()
    }

    /// Get number of failed checks
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_fail()).count()
    }

    /// Get total check count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    /// Get pass rate (0.0 to 1.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        self.passed_count() as f64 / self.entries.len() as f64
    }

    /// Check if every check passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Total time spent waiting
    #[must_use]
    pub fn total_elapsed_seconds(&self) -> f64 {
        self.entries.iter().map(|e| e.elapsed_seconds).sum()
    }

    /// Failed entries
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckResult> {
        self.entries.iter().filter(|e| e.status.is_fail()).collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} checks passed ({:.1}%)",
            self.test_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Render HTML report content
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }}
        .summary {{ background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }}
        table {{ border-collapse: collapse; width: 100%; }}
        td, th {{ border: 1px solid #ddd; padding: 8px; vertical-align: top; }}
        tr.pass td.status {{ background: #e8f5e9; color: #2e7d32; }}
        tr.fail td.status {{ background: #ffebee; color: #c62828; }}
        pre {{ margin: 0; white-space: pre-wrap; }}
        img.shot {{ max-width: 320px; border: 1px solid #ddd; }}
    </style>
</head>
<body>
"#,
            markup::escape(&self.test_name)
        ));

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <p>Run {} started {}</p>
    <p>Time spent waiting: {}s</p>
</div>
"#,
            markup::escape(&self.test_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.run_id,
            self.started_at.to_rfc3339(),
            format_seconds(self.total_elapsed_seconds())
        ));

        html.push_str(
            "<table>\n<tr><th>#</th><th>Action</th><th>Expected</th><th>Actual</th><th>Time</th><th>Status</th></tr>\n",
        );
        for entry in &self.entries {
            let class = match entry.status {
                Status::Pass => "pass",
                Status::Fail => "fail",
            };
            let shot = entry
                .screenshot
                .as_ref()
                .map(|png| {
                    format!(r#"<br><img class="shot" alt="screenshot" src="data:image/png;base64,{png}">"#)
                })
                .unwrap_or_default();
            html.push_str(&format!(
                r#"<tr class="{class}"><td>{}</td><td>{}</td><td>{}</td><td>{}{shot}</td><td>{}</td><td class="status">{}</td></tr>
"#,
                entry.sequence,
                entry.action.as_deref().unwrap_or(""),
                entry.expected,
                entry.actual,
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.status
            ));
        }
        html.push_str("</table>\n</body>\n</html>\n");

        html
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" time="{:.3}">"#,
            escape_xml(&self.test_name),
            self.total_count(),
            self.failed_count(),
            self.total_elapsed_seconds()
        ));
        xml.push('\n');

        for entry in &self.entries {
            let expected = markup::strip_tags(&entry.expected);
            xml.push_str(&format!(
                r#"  <testcase name="{}. {}" time="{:.3}">"#,
                entry.sequence,
                escape_xml(&expected),
                entry.elapsed_seconds
            ));
            xml.push('\n');

            if entry.status.is_fail() {
                let actual = markup::strip_tags(&entry.actual);
                xml.push_str(&format!(
                    r#"    <failure message="{}">{}</failure>"#,
                    escape_xml(&actual),
                    escape_xml(&format!("{expected}\n{actual}"))
                ));
                xml.push('\n');
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Render JSON content
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn render_json(&self) -> AssayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `dir` in each of `formats`
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or a file cannot
    /// be written
    pub fn write_to(&self, dir: &Path, formats: &[ReportFormat]) -> AssayResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let stem = file_stem(&self.test_name);
        let mut written = Vec::with_capacity(formats.len());

        for format in formats {
            let path = dir.join(format!("{stem}.{}", format.extension()));
            let content = match format {
                ReportFormat::Html => self.render_html(),
                ReportFormat::Junit => self.render_junit(),
                ReportFormat::Json => self.render_json()?,
            };
            std::fs::write(&path, content)?;
            info!(path = %path.display(), "report written");
            written.push(path);
        }

        Ok(written)
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn file_stem(test_name: &str) -> String {
    let stem: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem
    }
}

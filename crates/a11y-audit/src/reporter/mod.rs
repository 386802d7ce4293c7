//! Audit report generation
//!
//! This module turns an [`AuditResult`] into report artifacts and writes them
//! to the output directory.
//!
//! # Output Formats
//!
//! - **JSON**: lossless dump of the engine result, 2-space indented
//! - **HTML**: static, self-contained summary page
//! - **Console**: human-readable run summary (see [`ConsoleReporter`])
//!
//! Every run writes each file format twice: once under a timestamped name
//! and once as `latest-a11y-report.<ext>`, which is overwritten.
//!
//! # Example
//!
//! ```no_run
//! use a11y_audit::model::AuditResult;
//! use a11y_audit::reporter::{ReportTimestamp, ReportWriter};
//!
//! # fn example(result: AuditResult) {
//! let files = ReportWriter::new("a11y-reports").write_all(&result, &ReportTimestamp::now());
//! for path in &files.written {
//!     println!("wrote {}", path.display());
//! }
//! # }
//! ```

mod console;
mod html;
mod json;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::{AuditError, Result};
use crate::model::AuditResult;

pub use console::ConsoleReporter;
pub use html::{
    HtmlReporter, NO_INCOMPLETE_MESSAGE, NO_PASSES_MESSAGE, NO_VIOLATIONS_MESSAGE,
};
pub use json::JsonReporter;

/// File name stem shared by every report artifact
pub const REPORT_STEM: &str = "a11y-report";

/// File artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Static HTML document
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Html];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

/// The instant a run started, as embedded in reports and file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTimestamp(DateTime<Utc>);

impl ReportTimestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// ISO-8601 with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`
    pub fn iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// [`iso`](Self::iso) with `:` and `.` replaced so it is safe in file names
    pub fn file_token(&self) -> String {
        self.iso().replace([':', '.'], "-")
    }
}

impl From<DateTime<Utc>> for ReportTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

/// Renders one report format
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format results as a string
    pub fn format_results(&self, result: &AuditResult, timestamp: &ReportTimestamp) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(result),
            OutputFormat::Html => HtmlReporter::format(result, timestamp),
        }
    }
}

/// What a [`ReportWriter::write_all`] call produced
#[derive(Debug, Default)]
pub struct ReportFiles {
    /// Files written successfully, in write order
    pub written: Vec<PathBuf>,
    /// Every failure encountered; later writes were still attempted
    pub errors: Vec<AuditError>,
}

impl ReportFiles {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes the timestamped and `latest` artifacts into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `<dir>/a11y-report-<file-token>.<ext>`
    pub fn timestamped_path(&self, format: OutputFormat, timestamp: &ReportTimestamp) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{}.{}",
            REPORT_STEM,
            timestamp.file_token(),
            format.extension()
        ))
    }

    /// `<dir>/latest-a11y-report.<ext>`
    pub fn latest_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("latest-{}.{}", REPORT_STEM, format.extension()))
    }

    /// Render and write every format
    ///
    /// The output directory is created first; if that fails nothing is
    /// written. After that each format is rendered and written on its own, so
    /// a failure in one never prevents an attempt at the other. A format that
    /// fails to render writes no file at all.
    pub fn write_all(&self, result: &AuditResult, timestamp: &ReportTimestamp) -> ReportFiles {
        let mut files = ReportFiles::default();

        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            error!("Failed to create output directory {}: {}", self.output_dir.display(), e);
            files.errors.push(AuditError::filesystem(&self.output_dir, e));
            return files;
        }

        for format in OutputFormat::ALL {
            let content = match Reporter::new(format).format_results(result, timestamp) {
                Ok(content) => content,
                Err(e) => {
                    error!("Failed to render {} report: {}", format.extension(), e);
                    files.errors.push(e);
                    continue;
                }
            };

            for path in [
                self.timestamped_path(format, timestamp),
                self.latest_path(format),
            ] {
                match write_file(&path, &content) {
                    Ok(()) => {
                        debug!("Wrote {}", path.display());
                        files.written.push(path);
                    }
                    Err(e) => {
                        error!("{}", e);
                        files.errors.push(e);
                    }
                }
            }
        }

        files
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| AuditError::filesystem(path, e))
}

//! Console reporter for audit runs
//!
//! Provides human-readable progress lines and the end-of-run summary.

use anyhow::Result;
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::AuditError;
use crate::model::{AuditResult, Finding};
use crate::reporter::ReportTimestamp;
use crate::runner::Phase;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// One progress line for a phase transition
    pub fn phase_line(phase: Phase, config: &RunConfig) -> String {
        match phase {
            Phase::Navigate => format!("→ Navigating to {}...", config.url),
            Phase::Analyze => format!(
                "→ Running accessibility checks ({}: {})...",
                config.axe.run_only.as_str(),
                config.axe.tags.join(", ")
            ),
            Phase::WriteReports => format!("→ Writing reports to {}...", config.output_dir.display()),
            Phase::Summarize => "→ Summarizing results...".to_string(),
        }
    }

    /// Format the run summary
    pub fn format(
        result: &AuditResult,
        config: &RunConfig,
        started_at: &ReportTimestamp,
        written: &[PathBuf],
    ) -> Result<String> {
        let mut output = String::new();
        let counts = result.counts();

        // Header
        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                 ACCESSIBILITY AUDIT RESULTS                  ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "URL:       {}", result.page_url().unwrap_or(&config.url))?;
        writeln!(output, "Started:   {}", started_at.iso())?;
        writeln!(output)?;

        writeln!(output, "Summary:")?;
        writeln!(output, "  Violations:      {}", counts.violations)?;
        writeln!(output, "  Passes:          {}", counts.passes)?;
        writeln!(output, "  Incomplete:      {}", counts.incomplete)?;
        writeln!(output, "  Not Applicable:  {}", counts.inapplicable)?;

        if !result.violations.is_empty() {
            writeln!(output)?;
            writeln!(output, "Violations:")?;
            for violation in &result.violations {
                writeln!(output, "  • {}", Self::violation_line(violation))?;
            }
        }

        if !result.incomplete.is_empty() {
            writeln!(output)?;
            writeln!(output, "Needs manual review:")?;
            for finding in &result.incomplete {
                writeln!(output, "  • {}", finding.id)?;
            }
        }

        if !written.is_empty() {
            writeln!(output)?;
            writeln!(output, "Reports:")?;
            for path in written {
                writeln!(output, "  {}", path.display())?;
            }
        }

        Ok(output)
    }

    /// `id [impact] description (N elements)`
    pub fn violation_line(violation: &Finding) -> String {
        let elements = violation.nodes.len();
        format!(
            "{} [{}] {} ({} element{})",
            violation.id,
            violation.impact.as_deref().unwrap_or("unknown"),
            violation.description,
            elements,
            if elements == 1 { "" } else { "s" }
        )
    }

    /// Error line plus its remediation hint, if any
    pub fn format_error(error: &AuditError) -> String {
        let mut output = format!("✗ {}\n", error);
        if let Some(hint) = error.hint() {
            output.push_str(&format!("  Hint: {}\n", hint));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavigationFailure;
    use crate::model::AffectedNode;
    use chrono::{TimeZone, Utc};

    fn violation() -> Finding {
        Finding {
            id: "image-alt".into(),
            description: "Images must have alt text".into(),
            impact: Some("critical".into()),
            help_url: "https://x".into(),
            nodes: vec![AffectedNode {
                target: vec!["img.logo".into()],
                html: "<img class=\"logo\">".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_violation_line() {
        assert_eq!(
            ConsoleReporter::violation_line(&violation()),
            "image-alt [critical] Images must have alt text (1 element)"
        );
    }

    #[test]
    fn test_summary() {
        let result = AuditResult {
            violations: vec![violation()],
            incomplete: vec![Finding {
                id: "color-contrast".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let started = ReportTimestamp::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let written = vec![PathBuf::from("a11y-reports/latest-a11y-report.json")];

        let output = ConsoleReporter::format(&result, &RunConfig::default(), &started, &written).unwrap();

        assert!(output.contains("URL:       http://localhost:5173"));
        assert!(output.contains("Started:   2024-01-01T00:00:00.000Z"));
        assert!(output.contains("  Violations:      1"));
        assert!(output.contains("  • image-alt [critical] Images must have alt text (1 element)"));
        assert!(output.contains("Needs manual review:\n  • color-contrast"));
        assert!(output.contains("  a11y-reports/latest-a11y-report.json"));
    }

    #[test]
    fn test_summary_without_findings_omits_sections() {
        let output = ConsoleReporter::format(
            &AuditResult::default(),
            &RunConfig::default(),
            &ReportTimestamp::now(),
            &[],
        )
        .unwrap();
        assert!(!output.contains("Violations:\n"));
        assert!(!output.contains("Needs manual review"));
        assert!(!output.contains("Reports:"));
    }

    #[test]
    fn test_phase_lines() {
        let config = RunConfig::default();
        assert_eq!(
            ConsoleReporter::phase_line(Phase::Navigate, &config),
            "→ Navigating to http://localhost:5173..."
        );
        assert!(ConsoleReporter::phase_line(Phase::Analyze, &config).contains("tag: wcag2a, wcag2aa"));
        assert!(ConsoleReporter::phase_line(Phase::WriteReports, &config).contains("a11y-reports"));
    }

    #[test]
    fn test_error_with_hint() {
        let error = AuditError::navigation("http://localhost:5173", NavigationFailure::ConnectionRefused);
        let output = ConsoleReporter::format_error(&error);
        assert!(output.starts_with("✗ Navigation to http://localhost:5173 failed"));
        assert!(output.contains("  Hint: Is the application server running?"));
    }
}

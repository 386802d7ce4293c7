//! One audit run, start to exit code
//!
//! [`run_audit`] drives an auditor once, writes the reports and prints the
//! console summary. Every failure is caught here and folded into a
//! [`RunOutcome`]; nothing is retried.

use std::io::Write;
use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::error::AuditError;
use crate::reporter::{ConsoleReporter, ReportTimestamp, ReportWriter};
use crate::runner::{PageAuditor, Phase, Progress};

/// Terminal state of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// Analysis completed without violations and all reports were written
    Passed,
    /// Analysis completed and found violations
    ViolationsFound { count: usize },
    /// Navigation, analysis, rendering or a report write failed
    Failed { error: AuditError },
}

impl RunOutcome {
    /// Process exit code
    ///
    /// Violations and infrastructure failures share code 1; use
    /// [`label`](Self::label) to tell them apart.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::ViolationsFound { .. } | RunOutcome::Failed { .. } => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Passed => "success",
            RunOutcome::ViolationsFound { .. } => "violations-found",
            RunOutcome::Failed { .. } => "infrastructure-failure",
        }
    }

    fn status_line(&self) -> String {
        match self {
            RunOutcome::Passed => "Overall Status: ✓ PASSED (no violations)".to_string(),
            RunOutcome::ViolationsFound { count } => format!(
                "Overall Status: ✗ FAILED ({} violation{})",
                count,
                if *count == 1 { "" } else { "s" }
            ),
            RunOutcome::Failed { error } => {
                format!("Overall Status: ✗ ERROR ({} failure)", error.kind())
            }
        }
    }
}

/// Prints phase transitions to the run's console
struct ConsoleProgress<'a, W> {
    out: &'a mut W,
}

impl<W: Write + Send> Progress for ConsoleProgress<'_, W> {
    fn phase(&mut self, phase: Phase, config: &RunConfig) {
        emit(&mut *self.out, &format!("{}\n", ConsoleReporter::phase_line(phase, config)));
    }
}

/// Run one audit and report it
///
/// Console output goes to `out`; `started_at` names the report files.
pub async fn run_audit<A, W>(
    auditor: &A,
    config: &RunConfig,
    started_at: ReportTimestamp,
    out: &mut W,
) -> RunOutcome
where
    A: PageAuditor + ?Sized,
    W: Write + Send,
{
    emit(out, &format!("Starting accessibility audit of {}\n", config.url));

    let audited = {
        let mut progress = ConsoleProgress { out: &mut *out };
        auditor.audit(config, &mut progress).await
    };

    let result = match audited {
        Ok(result) => result,
        Err(e) => {
            error!(kind = e.kind(), "Audit failed: {}", e);
            emit(out, &ConsoleReporter::format_error(&e));
            let outcome = RunOutcome::Failed { error: e };
            finish(out, &outcome);
            return outcome;
        }
    };

    progress_line(out, Phase::WriteReports, config);
    let files = ReportWriter::new(&config.output_dir).write_all(&result, &started_at);

    progress_line(out, Phase::Summarize, config);
    match ConsoleReporter::format(&result, config, &started_at, &files.written) {
        Ok(summary) => emit(out, &summary),
        Err(e) => warn!("Failed to format console summary: {}", e),
    }

    for e in &files.errors {
        emit(out, &ConsoleReporter::format_error(e));
    }

    let outcome = match files.errors.into_iter().next() {
        Some(error) => RunOutcome::Failed { error },
        None if result.has_violations() => RunOutcome::ViolationsFound {
            count: result.violations.len(),
        },
        None => RunOutcome::Passed,
    };

    finish(out, &outcome);
    outcome
}

fn progress_line<W: Write>(out: &mut W, phase: Phase, config: &RunConfig) {
    emit(out, &format!("{}\n", ConsoleReporter::phase_line(phase, config)));
}

fn finish<W: Write>(out: &mut W, outcome: &RunOutcome) {
    emit(
        out,
        &format!(
            "\n────────────────────────────────────────────────────────────────\n{}\n",
            outcome.status_line()
        ),
    );
    info!(
        outcome = outcome.label(),
        exit_code = outcome.exit_code(),
        "Audit run finished"
    );
}

fn emit<W: Write + ?Sized>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        warn!("Failed to write console output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavigationFailure;
    use crate::model::AuditResult;

    #[test]
    fn test_exit_codes_and_labels() {
        let failed = RunOutcome::Failed {
            error: AuditError::Analysis("boom".into()),
        };
        assert_eq!(RunOutcome::Passed.exit_code(), 0);
        assert_eq!(RunOutcome::ViolationsFound { count: 2 }.exit_code(), 1);
        assert_eq!(failed.exit_code(), 1);

        assert_eq!(RunOutcome::Passed.label(), "success");
        assert_eq!(RunOutcome::ViolationsFound { count: 2 }.label(), "violations-found");
        assert_eq!(failed.label(), "infrastructure-failure");
    }

    #[test]
    fn test_status_lines() {
        assert!(RunOutcome::ViolationsFound { count: 1 }
            .status_line()
            .ends_with("(1 violation)"));
        let failed = RunOutcome::Failed {
            error: AuditError::navigation("http://localhost:1", NavigationFailure::ConnectionRefused),
        };
        assert!(failed.status_line().contains("navigation failure"));
    }

    struct Canned(AuditResult);

    #[async_trait::async_trait]
    impl PageAuditor for Canned {
        async fn audit(
            &self,
            config: &RunConfig,
            progress: &mut dyn Progress,
        ) -> crate::error::Result<AuditResult> {
            progress.phase(Phase::Navigate, config);
            progress.phase(Phase::Analyze, config);
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_phase_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            output_dir: dir.path().to_path_buf(),
            ..RunConfig::default()
        };
        let mut out = Vec::new();

        let outcome = run_audit(&Canned(AuditResult::default()), &config, ReportTimestamp::now(), &mut out).await;

        assert!(matches!(outcome, RunOutcome::Passed));
        let console = String::from_utf8(out).unwrap();
        let positions: Vec<usize> = ["Navigating", "Running accessibility checks", "Writing reports", "Summarizing"]
            .iter()
            .map(|needle| console.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", console);
    }
}

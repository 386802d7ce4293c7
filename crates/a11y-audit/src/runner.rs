//! Audit execution against a live page
//!
//! [`PageAuditor`] is the seam between the controller and the browser: given a
//! [`RunConfig`] it produces one [`AuditResult`] or fails. [`AuditRunner`] is
//! the real implementation.
//!
//! ```text
//! launch browser ─► open page (fixed viewport) ─► navigate + network idle
//!        │                                               │
//!        │                                     inject axe-core ─► axe.run()
//!        ▼                                               │
//!   close browser ◄──────────── always ◄─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use a11y_audit::config::RunConfig;
//! use a11y_audit::runner::{AuditRunner, NoProgress, PageAuditor};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RunConfig::default();
//! let result = AuditRunner::new().audit(&config, &mut NoProgress).await?;
//! println!("{} violations", result.violations.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::RunConfig;
use crate::engine::AxeEngine;
use crate::error::Result;
use crate::model::AuditResult;
use crate::session::BrowserSession;

/// Phases of one run, in order
///
/// Auditors report the first two; the controller reports the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Loading the target page
    Navigate,
    /// Running the rule engine on the loaded page
    Analyze,
    /// Writing report artifacts
    WriteReports,
    /// Printing the run summary
    Summarize,
}

/// Receives phase transitions from a [`PageAuditor`]
pub trait Progress: Send {
    fn phase(&mut self, phase: Phase, config: &RunConfig);
}

/// Progress sink that ignores everything
pub struct NoProgress;

impl Progress for NoProgress {
    fn phase(&mut self, _phase: Phase, _config: &RunConfig) {}
}

/// Produces an [`AuditResult`] for the page named by a [`RunConfig`]
#[async_trait]
pub trait PageAuditor: Send + Sync {
    async fn audit(&self, config: &RunConfig, progress: &mut dyn Progress) -> Result<AuditResult>;
}

/// Audits a page in a fresh headless Chrome via chromiumoxide
#[derive(Debug, Default, Clone)]
pub struct AuditRunner;

impl AuditRunner {
    pub fn new() -> Self {
        Self
    }

    async fn audit_in_session(
        session: &BrowserSession,
        config: &RunConfig,
        progress: &mut dyn Progress,
    ) -> Result<AuditResult> {
        let page = session.open_page(&config.viewport).await?;

        progress.phase(Phase::Navigate, config);
        info!("Navigating to {}", config.url);
        BrowserSession::navigate(&page, &config.url, config.timeout).await?;

        progress.phase(Phase::Analyze, config);
        let engine = AxeEngine::new(&config.axe);
        engine.inject(&page).await?;
        let result = engine.analyze(&page).await?;

        let overlapping = result.overlapping_rule_ids();
        if !overlapping.is_empty() {
            warn!(
                "Rule ids reported in more than one category: {}",
                overlapping.join(", ")
            );
        }

        Ok(result)
    }
}

#[async_trait]
impl PageAuditor for AuditRunner {
    #[instrument(skip(self, config, progress), fields(url = %config.url))]
    async fn audit(&self, config: &RunConfig, progress: &mut dyn Progress) -> Result<AuditResult> {
        let session = BrowserSession::launch(&config.browser, config.timeout).await?;
        let outcome = Self::audit_in_session(&session, config, progress).await;
        session.close().await;

        if let Ok(result) = &outcome {
            info!(
                violations = result.violations.len(),
                passes = result.passes.len(),
                "Audit of {} complete",
                config.url
            );
        }
        outcome
    }
}

//! Automated accessibility audits for web pages
//!
//! This crate loads a page in headless Chrome, runs the axe-core rule engine
//! against the rendered DOM, and writes JSON and HTML reports of what it
//! found. It is meant to run as a build-pipeline gate: the process exit code
//! says whether the page has violations.
//!
//! # Features
//!
//! - **Scoped browser sessions**: the browser is closed on every exit path
//! - **WCAG tag selection**: run only the rules tagged `wcag2a`, `wcag21aa`, ...
//! - **Lossless JSON**: the engine result is dumped verbatim
//! - **Static HTML summary**: counts, violations with affected elements, and
//!   checks that need manual review
//!
//! # Example
//!
//! ```no_run
//! use a11y_audit::{run_audit, AuditRunner, ReportTimestamp, RunConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RunConfig::from_file("a11y.toml")?;
//!
//! let outcome = run_audit(
//!     &AuditRunner::new(),
//!     &config,
//!     ReportTimestamp::now(),
//!     &mut std::io::stdout(),
//! )
//! .await;
//! std::process::exit(i32::from(outcome.exit_code()));
//! # }
//! ```
//!
//! # Configuration
//!
//! Runs are configured using TOML files; every key is optional:
//!
//! ```toml
//! url = "http://localhost:5173"
//! output_dir = "a11y-reports"
//! timeout_ms = 30000
//!
//! [axe]
//! tags = ["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"]
//! run_only = "tag"
//! script = "node_modules/axe-core/axe.min.js"
//!
//! [viewport]
//! width = 1280
//! height = 720
//!
//! [browser]
//! headed = false
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod model;
pub mod reporter;
pub mod runner;
pub mod session;

// Re-export main types for convenience
pub use config::RunConfig;
pub use controller::{run_audit, RunOutcome};
pub use error::{AuditError, NavigationFailure};
pub use model::{AffectedNode, AuditResult, Finding, Impact};
pub use reporter::{OutputFormat, ReportTimestamp, ReportWriter, Reporter};
pub use runner::{AuditRunner, PageAuditor, Phase, Progress};

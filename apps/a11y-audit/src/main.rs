//! Accessibility audit binary
//!
//! Audits one page and exits 0 when it has no violations, 1 otherwise.

use a11y_audit::config::RunOnly;
use a11y_audit::{run_audit, AuditRunner, ReportTimestamp, RunConfig};
use anyhow::Context;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug, Default)]
#[command(name = "a11y-audit")]
#[command(
    version,
    about = "Run axe-core accessibility checks against a page and write JSON/HTML reports"
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page to audit
    #[arg(short, long)]
    url: Option<String>,

    /// Directory receiving the reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Navigation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Rule tag to run (repeatable); replaces the configured tag list
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Treat --tag values as rule ids instead of tags
    #[arg(long)]
    rules: bool,

    /// Chrome/Chromium executable
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Path or http(s) URL of axe.min.js
    #[arg(long)]
    axe_script: Option<String>,
}

impl Args {
    /// Defaults, then the config file, then command-line overrides
    fn resolve(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if !self.tags.is_empty() {
            config.axe.tags = self.tags.clone();
        }
        if self.rules {
            config.axe.run_only = RunOnly::Rule;
        }
        if let Some(chrome) = &self.chrome {
            config.browser.chrome_executable = Some(chrome.clone());
        }
        if self.headed {
            config.browser.headed = true;
        }
        if let Some(script) = &self.axe_script {
            config.axe.script = script.clone();
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the progress and summary
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting a11y-audit v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let audit = async {
        let runner = AuditRunner::new();
        let outcome = run_audit(&runner, &config, ReportTimestamp::now(), &mut std::io::stdout()).await;
        outcome.exit_code()
    };

    ExitCode::from(run_until_shutdown(audit, wait_for_shutdown_signal()).await)
}

/// Race the audit against a shutdown signal
///
/// On a signal the audit future is dropped, which closes the browser session
/// and removes its profile directory, and the run exits 1.
async fn run_until_shutdown<R, S>(run: R, shutdown: S) -> u8
where
    R: Future<Output = u8>,
    S: Future<Output = ()>,
{
    tokio::select! {
        code = run => code,
        _ = shutdown => {
            tracing::warn!(outcome = "interrupted", "Audit interrupted by signal");
            eprintln!("Audit interrupted; browser session closed.");
            1
        }
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut term), Ok(mut int)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = int.recv() => {},
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Cannot install signal handlers: {}", e);
                ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_defaults_without_flags() {
        let config = Args::default().resolve().unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
url = "http://localhost:3000"
timeout_ms = 5000

[axe]
tags = ["wcag2a"]
"#
        )
        .unwrap();

        let args = Args::parse_from([
            "a11y-audit",
            "--config",
            file.path().to_str().unwrap(),
            "--url",
            "https://staging.example.com",
            "--tag",
            "wcag2aa",
            "--tag",
            "best-practice",
            "--headed",
        ]);
        let config = args.resolve().unwrap();

        assert_eq!(config.url, "https://staging.example.com");
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.axe.tags, vec!["wcag2aa", "best-practice"]);
        assert!(config.browser.headed);
    }

    #[test]
    fn test_rule_mode() {
        let args = Args::parse_from(["a11y-audit", "--rules", "--tag", "image-alt"]);
        let config = args.resolve().unwrap();
        assert_eq!(config.axe.run_only, RunOnly::Rule);
        assert_eq!(config.axe.tags, vec!["image-alt"]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["a11y-audit", "--url", "ftp://example.com"]);
        let err = args.resolve().unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid configuration"));
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_signal_interrupts_run() {
        let dropped = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(dropped.clone());
        let run = async move {
            let _session = guard;
            std::future::pending::<u8>().await
        };

        let code = run_until_shutdown(run, async {}).await;

        assert_eq!(code, 1);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_finished_run_keeps_exit_code() {
        let code = run_until_shutdown(async { 0u8 }, std::future::pending()).await;
        assert_eq!(code, 0);
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args::parse_from(["a11y-audit", "--config", "/nonexistent/a11y.toml"]);
        assert!(args.resolve().is_err());
    }
}

//! Browser tests for the real auditor
//!
//! These launch headless Chrome. The full audit additionally needs a local
//! axe-core bundle (`npm install axe-core`, or set AXE_SCRIPT).
//!
//! Run with: cargo test -p a11y-audit --test browser_audit

#[path = "common/browser.rs"]
mod browser;
#[path = "common/fixtures.rs"]
mod fixtures;
#[path = "common/server.rs"]
mod server;

use a11y_audit::runner::{NoProgress, PageAuditor};
use a11y_audit::session::BrowserSession;
use a11y_audit::{run_audit, AuditError, AuditRunner, NavigationFailure, ReportTimestamp};
use std::time::Duration;

const FIXTURE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Fixture</title></head>
<body>
<main>
<h1>Fixture page</h1>
<img class="logo" src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
</main>
</body>
</html>"#;

#[tokio::test]
async fn test_session_sets_viewport() {
    skip_if_no_chrome!();
    fixtures::init_tracing();

    let config = a11y_audit::RunConfig::default();
    let session = match BrowserSession::launch(&config.browser, config.timeout).await {
        Ok(session) => session,
        Err(e) if browser::skipped_for_missing_browser(&e) => return,
        Err(e) => panic!("Unexpected browser error: {}", e),
    };

    let page = session.open_page(&config.viewport).await.expect("Should open page");
    let width: u32 = page
        .evaluate("window.innerWidth")
        .await
        .expect("Should evaluate JS")
        .into_value()
        .expect("Should be a number");
    assert_eq!(width, config.viewport.width);

    session.close().await;
}

#[tokio::test]
async fn test_unreachable_server_is_connection_refused() {
    skip_if_no_chrome!();

    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::config_in(dir.path());
    config.url = server::unreachable_url().await;
    config.timeout = Duration::from_secs(10);

    let error = match AuditRunner::new().audit(&config, &mut NoProgress).await {
        Ok(_) => panic!("Audit of a closed port should fail"),
        Err(e) if browser::skipped_for_missing_browser(&e) => return,
        Err(e) => e,
    };

    match &error {
        AuditError::Navigation { failure, .. } => {
            assert_eq!(failure, &NavigationFailure::ConnectionRefused)
        }
        other => panic!("Expected navigation error, got {:?}", other),
    }
    assert!(error.hint().unwrap().contains("npm run dev"));
}

#[tokio::test]
async fn test_missing_axe_bundle_is_analysis_error() {
    skip_if_no_chrome!();

    let (url, handle) = server::serve_html(FIXTURE_PAGE).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::config_in(dir.path());
    config.url = url;
    config.axe.script = dir.path().join("missing-axe.min.js").display().to_string();

    let result = AuditRunner::new().audit(&config, &mut NoProgress).await;
    handle.abort();

    match result {
        Err(e) if browser::skipped_for_missing_browser(&e) => {}
        Err(e @ AuditError::Analysis(_)) => {
            assert!(e.to_string().contains("axe-core"));
            assert!(e.hint().unwrap().contains("npm install axe-core"));
        }
        other => panic!("Expected analysis error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_audit_finds_missing_alt() {
    skip_if_no_chrome!();
    let Some(axe) = browser::axe_script() else {
        eprintln!("Skipping: axe-core bundle not found (npm install axe-core or set AXE_SCRIPT)");
        return;
    };

    let (url, handle) = server::serve_html(FIXTURE_PAGE).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::config_in(dir.path());
    config.url = url;
    config.axe.script = axe.display().to_string();
    let mut console = Vec::new();

    let outcome = run_audit(&AuditRunner::new(), &config, ReportTimestamp::now(), &mut console).await;
    handle.abort();

    if let a11y_audit::RunOutcome::Failed { error } = &outcome {
        if browser::skipped_for_missing_browser(error) {
            return;
        }
    }

    assert_eq!(outcome.label(), "violations-found");
    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("image-alt"), "console output:\n{}", console);
    assert!(config.output_dir.join("latest-a11y-report.json").is_file());
    assert!(config.output_dir.join("latest-a11y-report.html").is_file());
}

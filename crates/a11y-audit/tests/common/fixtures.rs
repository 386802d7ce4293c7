//! Canned results and fake auditors

use a11y_audit::error::Result;
use a11y_audit::runner::{PageAuditor, Phase, Progress};
use a11y_audit::{AuditError, AuditResult, RunConfig};
use async_trait::async_trait;
use serde_json::json;

/// Install a test-friendly tracing subscriber (once per binary)
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("a11y_audit=debug")
        .with_test_writer()
        .try_init();
}

/// Result with one critical `image-alt` violation, 12 passes, 5 inapplicable
#[allow(dead_code)]
pub fn image_alt_result() -> AuditResult {
    let passes: Vec<_> = (0..12)
        .map(|i| json!({ "id": format!("pass-rule-{}", i), "impact": null, "nodes": [] }))
        .collect();
    let inapplicable: Vec<_> = (0..5)
        .map(|i| json!({ "id": format!("inapplicable-rule-{}", i), "nodes": [] }))
        .collect();

    serde_json::from_value(json!({
        "url": "http://localhost:5173/",
        "violations": [{
            "id": "image-alt",
            "impact": "critical",
            "description": "Images must have alt text",
            "helpUrl": "https://x",
            "nodes": [{ "target": ["img.logo"], "html": "<img class=\"logo\">" }]
        }],
        "passes": passes,
        "incomplete": [],
        "inapplicable": inapplicable
    }))
    .expect("fixture should deserialize")
}

/// Auditor that reports both phases and returns a fixed result
#[allow(dead_code)]
pub struct CannedAuditor(pub AuditResult);

#[async_trait]
impl PageAuditor for CannedAuditor {
    async fn audit(&self, config: &RunConfig, progress: &mut dyn Progress) -> Result<AuditResult> {
        progress.phase(Phase::Navigate, config);
        progress.phase(Phase::Analyze, config);
        Ok(self.0.clone())
    }
}

/// Auditor whose navigation always fails with the given failure
#[allow(dead_code)]
pub struct FailingAuditor(pub fn(&RunConfig) -> AuditError);

#[async_trait]
impl PageAuditor for FailingAuditor {
    async fn audit(&self, config: &RunConfig, progress: &mut dyn Progress) -> Result<AuditResult> {
        progress.phase(Phase::Navigate, config);
        Err((self.0)(config))
    }
}

/// Run config writing into `dir`
#[allow(dead_code)]
pub fn config_in(dir: &std::path::Path) -> RunConfig {
    RunConfig {
        output_dir: dir.join("a11y-reports"),
        ..RunConfig::default()
    }
}

//! Browser availability helpers

use a11y_audit::AuditError;
use std::path::PathBuf;

/// Check if browser tests should be skipped (when Chrome isn't available)
pub fn should_skip() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// Macro to skip test if Chrome isn't available
#[macro_export]
macro_rules! skip_if_no_chrome {
    () => {
        if browser::should_skip() {
            eprintln!("Skipping test: SKIP_BROWSER_TESTS is set");
            return;
        }
    };
}

/// Treat a failed browser launch as "Chrome not installed"
///
/// Returns true when the caller should return early.
pub fn skipped_for_missing_browser(error: &AuditError) -> bool {
    if let AuditError::Session(message) = error {
        eprintln!("Skipping: browser could not be launched ({})", message);
        return true;
    }
    false
}

/// Local axe-core bundle for full audits, if one is installed
#[allow(dead_code)]
pub fn axe_script() -> Option<PathBuf> {
    let candidates = [
        std::env::var("AXE_SCRIPT").ok().map(PathBuf::from),
        Some(PathBuf::from(a11y_audit::config::DEFAULT_AXE_SCRIPT)),
        Some(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../..")
                .join(a11y_audit::config::DEFAULT_AXE_SCRIPT),
        ),
    ];
    candidates.into_iter().flatten().find(|p| p.is_file())
}

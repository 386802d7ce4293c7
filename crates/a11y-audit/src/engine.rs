//! axe-core rule engine bridge
//!
//! The engine is a JavaScript bundle evaluated inside the audited page. This
//! module only gets it there and hands it the rule selection; the rule
//! matching itself is entirely axe-core's.
//!
//! # How it works
//!
//! 1. The bundle is injected, either by evaluating a local `axe.min.js` or by
//!    appending a `<script src>` for an http(s) URL and awaiting its load
//! 2. `window.axe.run(document, options)` is evaluated with `runOnly` built
//!    from [`AxeOptions`]
//! 3. The returned object comes back by value and is decoded into an
//!    [`AuditResult`]

use chromiumoxide::Page;
use std::path::PathBuf;
use tracing::{debug, instrument};

use crate::config::AxeOptions;
use crate::error::{AuditError, Result};
use crate::model::AuditResult;

/// Where the axe-core bundle is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxeSource {
    /// A local file, read and evaluated in the page
    File(PathBuf),
    /// A URL, loaded through a script element
    Url(String),
}

impl AxeSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            AxeSource::Url(location.to_string())
        } else {
            AxeSource::File(PathBuf::from(location))
        }
    }
}

/// Injects axe-core into a page and runs it
#[derive(Debug, Clone)]
pub struct AxeEngine {
    source: AxeSource,
    options: AxeOptions,
}

impl AxeEngine {
    pub fn new(options: &AxeOptions) -> Self {
        Self {
            source: AxeSource::parse(&options.script),
            options: options.clone(),
        }
    }

    /// Make `window.axe` available in the page's current document
    ///
    /// Must be called after navigation; a new document discards it.
    #[instrument(skip(self, page), fields(source = ?self.source))]
    pub async fn inject(&self, page: &Page) -> Result<()> {
        let script = match &self.source {
            AxeSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                AuditError::Analysis(format!(
                    "could not read the axe-core bundle at {}: {}",
                    path.display(),
                    e
                ))
            })?,
            AxeSource::Url(url) => Self::loader_script(url),
        };

        page.evaluate(script)
            .await
            .map_err(|e| AuditError::Analysis(format!("failed to inject axe-core: {}", e)))?;

        let ready: bool = page
            .evaluate("typeof window.axe === 'object' && typeof window.axe.run === 'function'")
            .await
            .map_err(|e| AuditError::Analysis(format!("failed to check for axe-core: {}", e)))?
            .into_value()
            .map_err(|e| AuditError::Analysis(format!("failed to check for axe-core: {}", e)))?;

        if !ready {
            return Err(AuditError::Analysis(
                "axe-core was injected but window.axe.run is not available".into(),
            ));
        }

        debug!("axe-core injected");
        Ok(())
    }

    /// Run the configured rules against the page's document
    #[instrument(skip(self, page))]
    pub async fn analyze(&self, page: &Page) -> Result<AuditResult> {
        let value: serde_json::Value = page
            .evaluate(self.run_script())
            .await
            .map_err(|e| AuditError::Analysis(format!("axe.run() failed: {}", e)))?
            .into_value()
            .map_err(|e| AuditError::Analysis(format!("axe.run() returned no value: {}", e)))?;

        let result: AuditResult = serde_json::from_value(value).map_err(|e| {
            AuditError::Analysis(format!("unexpected axe-core result shape: {}", e))
        })?;

        debug!(
            violations = result.violations.len(),
            passes = result.passes.len(),
            incomplete = result.incomplete.len(),
            inapplicable = result.inapplicable.len(),
            "axe-core analysis finished"
        );
        Ok(result)
    }

    /// Expression evaluating `axe.run` with the configured `runOnly` filter
    ///
    /// The result is round-tripped through JSON in the page so that only
    /// plain data (no DOM references) is returned by value.
    pub fn run_script(&self) -> String {
        format!(
            "(async () => {{ const results = await window.axe.run(document, {}); return JSON.parse(JSON.stringify(results)); }})()",
            self.options.run_options()
        )
    }

    fn loader_script(url: &str) -> String {
        // serde_json string encoding doubles as JS string-literal escaping
        let quoted = serde_json::Value::String(url.to_string()).to_string();
        format!(
            r#"new Promise((resolve, reject) => {{
    if (window.axe) {{ resolve(true); return; }}
    const script = document.createElement('script');
    script.src = {url};
    script.onload = () => resolve(true);
    script.onerror = () => reject(new Error('failed to load axe-core from ' + {url}));
    document.head.appendChild(script);
}})"#,
            url = quoted
        )
    }
}

//! Run configuration for an audit
//!
//! A [`RunConfig`] is resolved exactly once at process start (defaults, then an
//! optional TOML file, then CLI overrides applied by the binary) and is passed
//! by reference into every component afterwards. Nothing mutates it later.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default target page (the demo application's dev server)
pub const DEFAULT_URL: &str = "http://localhost:5173";
/// Default report destination, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "a11y-reports";
/// Default navigation deadline in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default location of the axe-core bundle
pub const DEFAULT_AXE_SCRIPT: &str = "node_modules/axe-core/axe.min.js";
/// WCAG rule-set tags checked when nothing else is configured
pub const DEFAULT_TAGS: [&str; 4] = ["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"];

/// Complete, immutable configuration for one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Page to audit
    #[serde(default = "default_url")]
    pub url: String,
    /// Directory receiving the JSON and HTML reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Navigation deadline (serialized as `timeout_ms`)
    #[serde(
        default = "default_timeout",
        rename = "timeout_ms",
        with = "duration_ms"
    )]
    pub timeout: Duration,
    /// Rule selection handed to axe-core
    #[serde(default)]
    pub axe: AxeOptions,
    /// Page viewport used for the audit
    #[serde(default)]
    pub viewport: Viewport,
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            output_dir: default_output_dir(),
            timeout: default_timeout(),
            axe: AxeOptions::default(),
            viewport: Viewport::default(),
            browser: BrowserOptions::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing keys fall back to the built-in defaults. The loaded value is
    /// validated before it is returned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use a11y_audit::config::RunConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RunConfig::from_file("a11y-audit.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use a11y_audit::config::RunConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RunConfig::from_str(r#"url = "http://localhost:8080""#)?;
    /// assert_eq!(config.url, "http://localhost:8080");
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every component relies on
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            anyhow::bail!("url must not be empty");
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            anyhow::bail!("url must start with http:// or https:// (got {})", self.url);
        }
        if self.timeout.is_zero() {
            anyhow::bail!("timeout_ms must be greater than zero");
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            anyhow::bail!(
                "viewport must have non-zero dimensions (got {}x{})",
                self.viewport.width,
                self.viewport.height
            );
        }
        if self.axe.tags.is_empty() {
            anyhow::bail!(
                "axe.tags must list at least one {}",
                match self.axe.run_only {
                    RunOnly::Tag => "tag",
                    RunOnly::Rule => "rule id",
                }
            );
        }
        Ok(())
    }
}

/// axe-core options: which rules run and where the engine comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxeOptions {
    /// Tag (or rule id) values passed to `runOnly.values`
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Interpretation of `tags`
    #[serde(default)]
    pub run_only: RunOnly,
    /// Path or http(s) URL of the axe-core bundle
    #[serde(default = "default_axe_script")]
    pub script: String,
}

impl Default for AxeOptions {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            run_only: RunOnly::default(),
            script: default_axe_script(),
        }
    }
}

impl AxeOptions {
    /// The `options` argument for `axe.run(context, options)`
    pub fn run_options(&self) -> serde_json::Value {
        serde_json::json!({
            "runOnly": {
                "type": self.run_only.as_str(),
                "values": self.tags,
            }
        })
    }
}

/// Rule filter mode, mirroring axe-core's `runOnly.type`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOnly {
    /// Values are rule-set tags such as `wcag2aa`
    #[default]
    Tag,
    /// Values are individual rule ids such as `image-alt`
    Rule,
}

impl RunOnly {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOnly::Tag => "tag",
            RunOnly::Rule => "rule",
        }
    }
}

/// Fixed viewport so layout-dependent rules give reproducible results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale_factor")]
    pub device_scale_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_scale_factor: default_scale_factor(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,
    /// Show the browser window instead of running headless
    #[serde(default)]
    pub headed: bool,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_axe_script() -> String {
    DEFAULT_AXE_SCRIPT.to_string()
}

fn default_scale_factor() -> f64 {
    1.0
}

/// Serde module for serializing/deserializing Duration as milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

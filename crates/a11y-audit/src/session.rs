//! Scoped headless browser session
//!
//! [`BrowserSession`] owns the Chrome process, the task pumping its CDP event
//! handler, and a throwaway user-data directory. [`BrowserSession::close`]
//! shuts all three down; if the session is dropped without being closed (an
//! early return, a panic, a cancelled future) the `Drop` impl still aborts the
//! handler, lets chromiumoxide kill the child process, and removes the
//! profile directory.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::{BrowserOptions, Viewport};
use crate::error::{AuditError, NavigationFailure, Result};

/// CDP command deadline when the run timeout is shorter
///
/// Navigation is bounded separately by the run timeout; this only has to be
/// long enough that `axe.run` on a large page is never cut off.
const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Tracks lifecycle events of one navigation until the main frame reports
/// `networkIdle`
///
/// Only events carrying the loader id of the latest `init` count, so an idle
/// signal left over from the previous document is ignored.
#[derive(Debug, Default)]
pub(crate) struct IdleWatch {
    frame_id: Option<String>,
    loader_id: Option<String>,
}

impl IdleWatch {
    pub(crate) fn new(frame_id: Option<String>) -> Self {
        Self {
            frame_id,
            loader_id: None,
        }
    }

    /// Feed one event; returns true once the network is idle
    pub(crate) fn observe(&mut self, name: &str, frame_id: &str, loader_id: &str) -> bool {
        if let Some(main) = &self.frame_id {
            if main != frame_id {
                return false;
            }
        }
        match name {
            "init" => {
                self.loader_id = Some(loader_id.to_string());
                false
            }
            "networkIdle" => self.loader_id.as_deref() == Some(loader_id),
            _ => false,
        }
    }
}

/// A running browser owned by one audit
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: PathBuf,
}

impl BrowserSession {
    /// Launch a browser according to `options`
    ///
    /// `run_timeout` is the navigation deadline; every CDP command gets at
    /// least that long (see [`request_timeout`]).
    #[instrument(skip(options), fields(headed = options.headed))]
    pub async fn launch(options: &BrowserOptions, run_timeout: Duration) -> Result<Self> {
        let mut builder = BrowserConfig::builder().request_timeout(request_timeout(run_timeout));

        if options.headed {
            builder = builder.with_head();
        }

        let executable = options
            .chrome_executable
            .clone()
            .or_else(find_chrome_for_testing);
        if let Some(path) = executable {
            debug!("Using browser executable: {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let user_data_dir = unique_user_data_dir();
        builder = builder.user_data_dir(&user_data_dir);

        let config = builder
            .build()
            .map_err(|e| AuditError::Session(format!("invalid browser configuration: {}", e)))?;

        info!("Launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AuditError::Session(format!("failed to launch browser: {}", e)))?;

        // Spawn handler to process browser events
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("Browser launched successfully");
        Ok(Self {
            browser: Some(browser),
            handler: Some(handle),
            user_data_dir,
        })
    }

    /// Open a blank page sized to `viewport`
    #[instrument(skip(self))]
    pub async fn open_page(&self, viewport: &Viewport) -> Result<Page> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| AuditError::Session("browser already closed".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AuditError::Session(format!("failed to open page: {}", e)))?;

        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(viewport.device_scale_factor)
            .mobile(false)
            .build()
            .map_err(|e| AuditError::Session(format!("failed to build viewport params: {}", e)))?;

        page.execute(params)
            .await
            .map_err(|e| AuditError::Session(format!("failed to set viewport: {}", e)))?;

        debug!("Page opened at {}x{}", viewport.width, viewport.height);
        Ok(page)
    }

    /// Navigate `page` to `url` and wait for the network to go idle
    ///
    /// The whole sequence (load, then `networkIdle` for the main frame) is
    /// bounded by `timeout`.
    #[instrument(skip(page))]
    pub async fn navigate(page: &Page, url: &str, timeout: Duration) -> Result<()> {
        let load = async {
            let frame_id = page.mainframe().await?.map(|id| id.inner().clone());
            let mut events = page.event_listener::<EventLifecycleEvent>().await?;
            page.goto(url).await?;

            let mut watch = IdleWatch::new(frame_id);
            while let Some(event) = events.next().await {
                if watch.observe(&event.name, event.frame_id.inner(), event.loader_id.inner()) {
                    return Ok(true);
                }
            }
            Ok::<_, CdpError>(false)
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(true)) => {
                debug!("Page settled: {}", url);
                Ok(())
            }
            Ok(Ok(false)) => Err(AuditError::navigation(
                url,
                NavigationFailure::Other("page closed before the network went idle".into()),
            )),
            Ok(Err(e)) => Err(navigation_error(url, &e, timeout)),
            Err(_) => Err(AuditError::navigation(
                url,
                NavigationFailure::Timeout(timeout.as_millis() as u64),
            )),
        }
    }

    /// Shut the browser down and release everything the session owns
    pub async fn close(mut self) {
        info!("Closing browser");
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
        remove_profile_dir(&self.user_data_dir);
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
        if self.browser.take().is_some() {
            debug!("Browser session dropped without close; killing browser process");
            remove_profile_dir(&self.user_data_dir);
        }
    }
}

/// CDP command deadline for a run with the given navigation timeout
pub fn request_timeout(run_timeout: Duration) -> Duration {
    run_timeout.max(MIN_REQUEST_TIMEOUT)
}

/// Classify a CDP failure during navigation
fn navigation_error(url: &str, error: &CdpError, timeout: Duration) -> AuditError {
    let failure = match error {
        CdpError::Timeout => NavigationFailure::Timeout(timeout.as_millis() as u64),
        other => NavigationFailure::from_browser_message(&other.to_string()),
    };
    AuditError::navigation(url, failure)
}

fn remove_profile_dir(dir: &Path) {
    if dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            debug!("Could not remove browser profile {}: {}", dir.display(), e);
        }
    }
}

/// Profile directory unique across concurrent processes and sessions
fn unique_user_data_dir() -> PathBuf {
    static SESSION_ID: AtomicU64 = AtomicU64::new(0);

    let session_id = SESSION_ID.fetch_add(1, Ordering::SeqCst);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "a11y-audit-{}-{}-{}",
        std::process::id(),
        session_id,
        nanos
    ))
}

/// Find Chrome for Testing installed by Puppeteer (newest version first)
pub fn find_chrome_for_testing() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    find_chrome_in(&Path::new(&home).join(".cache/puppeteer/chrome"))
}

fn find_chrome_in(cache: &Path) -> Option<PathBuf> {
    const CANDIDATES: [&str; 3] = [
        "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        "chrome-linux64/chrome",
    ];

    let mut versions: Vec<PathBuf> = std::fs::read_dir(cache)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    versions.sort_by(|a, b| b.cmp(a));

    versions.iter().find_map(|version_dir| {
        CANDIDATES
            .iter()
            .map(|candidate| version_dir.join(candidate))
            .find(|path| path.exists())
    })
}

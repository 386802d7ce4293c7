//! Error taxonomy for an audit run
//!
//! Every failure the controller can observe is one of these kinds: the browser
//! session could not be started, the page did not load, the rule engine
//! failed, a report could not be written, or the engine handed back a result
//! the renderer cannot represent. All of them map to exit code 1; the kind is
//! kept so logs can tell "the page has problems" apart from "the tooling
//! broke".

use std::path::PathBuf;
use thiserror::Error;

/// Why a page could not be loaded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationFailure {
    #[error("timed out after {0}ms waiting for the page to settle")]
    Timeout(u64),

    #[error("connection refused")]
    ConnectionRefused,

    #[error("{0}")]
    Other(String),
}

impl NavigationFailure {
    /// Classify a browser-reported navigation error message
    ///
    /// Chrome reports network-level failures as `net::ERR_*` codes inside the
    /// CDP error text.
    pub fn from_browser_message(message: &str) -> Self {
        const REFUSED: [&str; 3] = [
            "ERR_CONNECTION_REFUSED",
            "ERR_ADDRESS_UNREACHABLE",
            "ERR_CONNECTION_RESET",
        ];
        if REFUSED.iter().any(|code| message.contains(code)) {
            NavigationFailure::ConnectionRefused
        } else if message.contains("ERR_TIMED_OUT") {
            NavigationFailure::Other("the browser timed out connecting to the server".into())
        } else {
            NavigationFailure::Other(message.to_string())
        }
    }
}

/// Errors produced while auditing a page or writing its reports
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {failure}")]
    Navigation {
        url: String,
        failure: NavigationFailure,
    },

    #[error("Accessibility analysis failed: {0}")]
    Analysis(String),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot render finding '{rule_id}': unknown impact '{impact}'")]
    Render { rule_id: String, impact: String },

    #[error("Cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AuditError {
    pub fn navigation(url: impl Into<String>, failure: NavigationFailure) -> Self {
        AuditError::Navigation {
            url: url.into(),
            failure,
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error kind, used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::Session(_) => "session",
            AuditError::Navigation { .. } => "navigation",
            AuditError::Analysis(_) => "analysis",
            AuditError::Filesystem { .. } => "filesystem",
            AuditError::Render { .. } | AuditError::Encode(_) => "render",
        }
    }

    /// An actionable next step for the operator, when one is known
    pub fn hint(&self) -> Option<String> {
        match self {
            AuditError::Navigation {
                url,
                failure: NavigationFailure::ConnectionRefused,
            } => Some(format!(
                "Is the application server running? Start it (e.g. `npm run dev`) so that {} is reachable, then re-run the audit.",
                url
            )),
            AuditError::Navigation {
                failure: NavigationFailure::Timeout(_),
                ..
            } => Some("The page did not finish loading; raise timeout_ms or check the server logs.".into()),
            AuditError::Session(_) => Some(
                "Install Chrome or Chromium, or pass --chrome with the path to a browser binary.".into(),
            ),
            AuditError::Analysis(msg) if msg.contains("axe-core") => Some(
                "Install the rule engine with `npm install axe-core` or point axe.script at a copy of axe.min.js.".into(),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

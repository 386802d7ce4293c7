//! Audit result data model
//!
//! These types mirror the object axe-core returns from `axe.run()`. Only the
//! fields the reports need are typed; everything else the engine reports is
//! kept in `extra` maps so the JSON artifact stays a lossless dump.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AuditError;

/// Results of one rule-engine pass over one page load
///
/// The four sequences partition the checked rules: a rule id appears in at
/// most one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(default)]
    pub violations: Vec<Finding>,
    #[serde(default)]
    pub passes: Vec<Finding>,
    #[serde(default)]
    pub incomplete: Vec<Finding>,
    #[serde(default)]
    pub inapplicable: Vec<Finding>,
    /// Engine metadata (`url`, `timestamp`, `testEngine`, `toolOptions`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuditResult {
    /// Length of each of the four sequences
    pub fn counts(&self) -> ResultCounts {
        ResultCounts {
            violations: self.violations.len(),
            passes: self.passes.len(),
            incomplete: self.incomplete.len(),
            inapplicable: self.inapplicable.len(),
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// URL the engine reports it analyzed, if present
    pub fn page_url(&self) -> Option<&str> {
        self.extra.get("url").and_then(Value::as_str)
    }

    /// Rule ids that show up in more than one category
    ///
    /// An empty list means the partition invariant holds.
    pub fn overlapping_rule_ids(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for category in [
            &self.violations,
            &self.passes,
            &self.incomplete,
            &self.inapplicable,
        ] {
            let mut ids: Vec<&str> = category.iter().map(|f| f.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            for id in ids {
                *seen.entry(id).or_default() += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

/// Sizes of the four result categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub violations: usize,
    pub passes: usize,
    pub incomplete: usize,
    pub inapplicable: usize,
}

/// One rule-check result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Rule identifier, e.g. `image-alt`
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Raw severity as reported; validated only when rendered
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help_url: String,
    #[serde(default)]
    pub nodes: Vec<AffectedNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Finding {
    /// Parse the impact, treating a missing or unrecognized value as a
    /// data-contract violation
    pub fn impact_level(&self) -> Result<Impact, AuditError> {
        let raw = self.impact.as_deref().unwrap_or("");
        raw.parse().map_err(|_| AuditError::Render {
            rule_id: self.id.clone(),
            impact: if raw.is_empty() {
                "<missing>".to_string()
            } else {
                raw.to_string()
            },
        })
    }
}

/// A DOM location a finding applies to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedNode {
    #[serde(default)]
    pub target: Vec<Selector>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AffectedNode {
    /// Selectors joined with the report's fixed delimiter
    pub fn target_display(&self) -> String {
        self.target
            .iter()
            .map(Selector::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One entry of a node's `target` list
///
/// Elements inside iframes or shadow roots are reported as a path of
/// selectors rather than a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    Css(String),
    Path(Vec<String>),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => f.write_str(s),
            Selector::Path(parts) => f.write_str(&parts.join(" >>> ")),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::Css(s.to_string())
    }
}

/// Severity attached to a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    pub const ALL: [Impact; 4] = [
        Impact::Minor,
        Impact::Moderate,
        Impact::Serious,
        Impact::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
        }
    }

    /// CSS class of the HTML report badge for this severity
    pub fn badge_class(&self) -> &'static str {
        match self {
            Impact::Minor => "badge-minor",
            Impact::Moderate => "badge-moderate",
            Impact::Serious => "badge-serious",
            Impact::Critical => "badge-critical",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the four severities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownImpact(pub String);

impl FromStr for Impact {
    type Err = UnknownImpact;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minor" => Ok(Impact::Minor),
            "moderate" => Ok(Impact::Moderate),
            "serious" => Ok(Impact::Serious),
            "critical" => Ok(Impact::Critical),
            other => Err(UnknownImpact(other.to_string())),
        }
    }
}

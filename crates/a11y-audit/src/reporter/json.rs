//! JSON reporter for audit results

use crate::error::Result;
use crate::model::AuditResult;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize the full result, pretty-printed with 2-space indentation
    pub fn format(result: &AuditResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

//! Behavior report adapter
//!
//! Parses report JSON as returned by the report-fetch service.

use crate::error::ReportError;
use crate::report::types::BehaviorReport;
use serde_json::Value;

/// Parse a behavior report JSON string into a BehaviorReport.
///
/// The report service answers failures with a bare `{"error": "..."}` object;
/// that shape is surfaced as [`ReportError::InvalidReport`] rather than an
/// empty report.
pub fn parse_report(json: &str) -> Result<BehaviorReport, ReportError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ReportError::ParseError(e.to_string()))?;

    if !value.is_object() {
        return Err(ReportError::InvalidReport(
            "Report must be a JSON object".to_string(),
        ));
    }

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ReportError::InvalidReport(message.to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| ReportError::ParseError(e.to_string()))
}

//! Pipeline orchestration
//!
//! This module provides the public API for Classroom Lens.
//! It takes a raw report JSON document all the way to the Gantt chart payload.

use crate::error::ReportError;
use crate::report::parse_report;
use crate::timeline::{aggregate, GanttChartEncoder, Timeline, TimelineConfig};

/// Convert a raw behavior report JSON document into the Gantt chart payload.
///
/// Uses the default timeline settings (5 s padding after the last event, no
/// dominant-behavior fallback). Each call gets a fresh random producer
/// `instance_id`; use [`ReportProcessor::with_instance_id`] for byte-identical
/// output across calls.
///
/// # Example
/// ```ignore
/// let chart_json = report_to_gantt(&report_json)?;
/// ```
pub fn report_to_gantt(raw_json: &str) -> Result<String, ReportError> {
    ReportProcessor::new().process(raw_json)
}

/// Reusable processor holding the timeline settings and chart encoder.
///
/// Charts produced by one processor share the same producer instance id.
pub struct ReportProcessor {
    config: TimelineConfig,
    encoder: GanttChartEncoder,
}

impl Default for ReportProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(TimelineConfig::default())
    }

    /// Create a processor with specific timeline settings
    pub fn with_config(config: TimelineConfig) -> Self {
        Self {
            config,
            encoder: GanttChartEncoder::new(),
        }
    }

    /// Use a fixed producer instance id instead of a random one
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.encoder = GanttChartEncoder::with_instance_id(instance_id);
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Parse a report and build its timeline
    pub fn timeline(&self, raw_json: &str) -> Result<Timeline, ReportError> {
        let report = parse_report(raw_json)?;
        Ok(aggregate(&report.detailed_sequence_analysis, &self.config))
    }

    /// Parse a report and encode its timeline as chart JSON
    pub fn process(&self, raw_json: &str) -> Result<String, ReportError> {
        let timeline = self.timeline(raw_json)?;
        self.encoder.encode_to_json(&timeline)
    }

    /// Same as [`process`](Self::process) but pretty-printed
    pub fn process_pretty(&self, raw_json: &str) -> Result<String, ReportError> {
        let timeline = self.timeline(raw_json)?;
        self.encoder.encode_to_json_pretty(&timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::CoreState;
    use pretty_assertions::assert_eq;

    fn sample_report_json() -> &'static str {
        r#"{
            "report_metadata": { "student_id": "s1001" },
            "detailed_sequence_analysis": [
                {
                    "batch_index": 1,
                    "image_filenames_in_batch": ["10-00-00.jpg", "10-00-05.jpg", "10-00-10.jpg"],
                    "analysis": {
                        "per_image_highlights": [
                            { "image_index_in_sequence": 0, "behavior_category": "筆記", "confidence": 0.9 },
                            { "image_index_in_sequence": 1, "behavior_category": "舉手", "confidence": 0.8 },
                            { "image_index_in_sequence": 2, "behavior_category": "玩弄物品", "confidence": 0.7 }
                        ]
                    }
                }
            ]
        }"#
    }

    #[test]
    fn test_report_to_gantt() {
        let json = report_to_gantt(sample_report_json()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["producer"]["name"], "classroom-lens");
        assert_eq!(payload["yLabels"].as_array().unwrap().len(), 4);

        let data = payload["datasets"][0]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["range"], serde_json::json!([36000.0, 36010.0]));
        assert_eq!(data[0]["category"], "高度專注");
        assert_eq!(data[0]["metadata"], serde_json::json!(["筆記", "舉手"]));
        assert_eq!(data[1]["range"], serde_json::json!([36010.0, 36015.0]));
        assert_eq!(data[1]["category"], "潛在分心");
    }

    #[test]
    fn test_processor_with_config() {
        let processor = ReportProcessor::with_config(TimelineConfig {
            end_padding_sec: 2.0,
            ..TimelineConfig::default()
        });

        let timeline = processor.timeline(sample_report_json()).unwrap();
        assert_eq!(timeline.segments.len(), 2);
        assert_eq!(timeline.segments[1].core_state, CoreState::PotentialDistraction);
        assert_eq!(timeline.segments[1].end, 36012.0);
    }

    #[test]
    fn test_empty_report_gives_empty_chart() {
        let json = report_to_gantt(r#"{"detailed_sequence_analysis": []}"#).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["yLabels"], serde_json::json!([]));
        assert_eq!(payload["datasets"], serde_json::json!([]));
    }

    #[test]
    fn test_error_document() {
        let result = report_to_gantt(r#"{"error": "找不到報告"}"#);
        assert!(matches!(result, Err(ReportError::InvalidReport(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = report_to_gantt("not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_instance_id_is_byte_identical() {
        let a = ReportProcessor::new()
            .with_instance_id("lens-test".to_string())
            .process(sample_report_json())
            .unwrap();
        let b = ReportProcessor::new()
            .with_instance_id("lens-test".to_string())
            .process(sample_report_json())
            .unwrap();

        assert_eq!(a, b);
        assert!(a.contains("\"instance_id\":\"lens-test\""));
    }

    #[test]
    fn test_processor_reuses_instance_id() {
        let processor = ReportProcessor::new();
        let a: serde_json::Value =
            serde_json::from_str(&processor.process(sample_report_json()).unwrap()).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(&processor.process_pretty(sample_report_json()).unwrap()).unwrap();

        assert_eq!(a["producer"]["instance_id"], b["producer"]["instance_id"]);
        assert_eq!(a["datasets"], b["datasets"]);
    }
}

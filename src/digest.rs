//! Per-student report digest
//!
//! Condenses a report into the few numbers a class overview shows for each
//! student, and provides the shared duration formatting.

use crate::report::types::BehaviorReport;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Categories counted as non-task behavior in the digest
pub const NON_TASK_BEHAVIORS: [&str; 6] = [
    "玩弄物品",
    "目視同學",
    "目視他處",
    "喝水/飲食",
    "整理個人物品",
    "趴睡",
];

/// Shown in place of a report date when the report has none
pub const NO_REPORT_DATE: &str = "無報告";

/// Format of `report_generation_time`
pub const GENERATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Condensed view of one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDigest {
    /// Date part of the generation time
    pub report_date: String,
    /// First (most frequent) behavior category
    pub top_behavior: String,
    pub top_behavior_percent: f64,
    /// Sum of percentages over [`NON_TASK_BEHAVIORS`], one decimal
    pub non_task_percent: f64,
}

impl Default for ReportDigest {
    fn default() -> Self {
        Self {
            report_date: NO_REPORT_DATE.to_string(),
            top_behavior: "N/A".to_string(),
            top_behavior_percent: 0.0,
            non_task_percent: 0.0,
        }
    }
}

/// Build the digest for a report
pub fn digest_report(report: &BehaviorReport) -> ReportDigest {
    let mut digest = ReportDigest::default();

    if let Some(date) = report
        .report_metadata
        .as_ref()
        .and_then(|m| m.report_generation_time.as_deref())
        .and_then(report_date)
    {
        digest.report_date = date;
    }

    let stats = report
        .overall_summary
        .as_ref()
        .map(|s| s.behavior_statistics.as_slice())
        .unwrap_or_default();

    if let Some(top) = stats.first() {
        if !top.behavior_category.is_empty() {
            digest.top_behavior = top.behavior_category.clone();
        }
        digest.top_behavior_percent = top.percentage;

        let non_task: f64 = stats
            .iter()
            .filter(|s| NON_TASK_BEHAVIORS.contains(&s.behavior_category.as_str()))
            .map(|s| s.percentage)
            .sum();
        digest.non_task_percent = (non_task * 10.0).round() / 10.0;
    }

    digest
}

/// Date part of a generation time. Values not in
/// [`GENERATION_TIME_FORMAT`] fall back to the text before the first space.
fn report_date(generation_time: &str) -> Option<String> {
    if let Ok(time) = NaiveDateTime::parse_from_str(generation_time, GENERATION_TIME_FORMAT) {
        return Some(time.date().format("%Y-%m-%d").to_string());
    }

    generation_time
        .split(' ')
        .next()
        .filter(|date| !date.is_empty())
        .map(str::to_string)
}

/// Format a duration as `X小時 Y分 Z秒`, dropping leading zero units
pub fn format_duration_readable(total_seconds: f64) -> String {
    let total = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}小時 {}分 {}秒", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}分 {}秒", minutes, seconds)
    } else {
        format!("{}秒", seconds)
    }
}

/// Display name for a report page tab id; unknown ids are shown as-is
pub fn tab_display_name(tab_id: &str) -> &str {
    match tab_id {
        "summaryNotesTab" => "AI觀察與建議",
        "overallStatsTab" => "整體行為統計",
        "timelineTab" => "行為趨勢圖",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_report;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_digest_report() {
        let report = parse_report(
            r#"{
                "report_metadata": { "report_generation_time": "2024-05-20 10:15:00" },
                "overall_summary": {
                    "behavior_statistics": [
                        { "behavior_category": "筆記", "count": 10, "percentage": 50.0 },
                        { "behavior_category": "玩弄物品", "count": 5, "percentage": 25.04 },
                        { "behavior_category": "目視他處", "count": 3, "percentage": 15.02 },
                        { "behavior_category": "目視前方", "count": 2, "percentage": 9.94 }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            digest_report(&report),
            ReportDigest {
                report_date: "2024-05-20".to_string(),
                top_behavior: "筆記".to_string(),
                top_behavior_percent: 50.0,
                non_task_percent: 40.1,
            }
        );
    }

    #[test]
    fn test_digest_of_empty_report() {
        let digest = digest_report(&BehaviorReport::default());
        assert_eq!(digest, ReportDigest::default());
        assert_eq!(digest.report_date, NO_REPORT_DATE);
    }

    #[test]
    fn test_report_date_parsing() {
        assert_eq!(report_date("2024-05-20 10:15:00").as_deref(), Some("2024-05-20"));
        assert_eq!(report_date("2024/05/20 10:15").as_deref(), Some("2024/05/20"));
        assert_eq!(report_date(""), None);
        assert_eq!(report_date(" 10:15:00"), None);
    }

    #[test]
    fn test_format_duration_readable() {
        assert_eq!(format_duration_readable(0.0), "0秒");
        assert_eq!(format_duration_readable(59.9), "59秒");
        assert_eq!(format_duration_readable(61.0), "1分 1秒");
        assert_eq!(format_duration_readable(3725.0), "1小時 2分 5秒");
        assert_eq!(format_duration_readable(-3.0), "0秒");
    }

    #[test]
    fn test_tab_display_name() {
        assert_eq!(tab_display_name("timelineTab"), "行為趨勢圖");
        assert_eq!(tab_display_name("customTab"), "customTab");
    }
}

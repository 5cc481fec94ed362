//! Report page view-model
//!
//! [`ReportView`] owns everything the report page used to keep in globals:
//! the open tab and its start time, the current report, and which fetch is
//! the latest. Fetching stays with the caller; the view only decides what a
//! completed fetch does to the page.

use crate::digest::{digest_report, ReportDigest};
use crate::error::ReportError;
use crate::report::parse_report;
use crate::report::types::{AiSummaryNotes, BehaviorReport, SequenceBatch};
use crate::telemetry::{ActivityEvent, TabTracker};
use crate::timeline::{aggregate, GanttChartEncoder, GanttChartPayload, Timeline, TimelineConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tab opened after a report finishes loading
pub const DEFAULT_TAB: &str = "summaryNotesTab";

const NOT_AVAILABLE: &str = "N/A";

/// Handle for one report fetch. Only the newest ticket can update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// What the page is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading { filename: String },
    Ready,
    Failed { message: String },
}

/// Result of handing a completed fetch to the view
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The report is displayed; carries the tab events to beacon
    Applied(Vec<ActivityEvent>),
    /// The fetch failed and the error message is displayed
    Failed,
    /// A newer load superseded this one, or the ticket was already
    /// completed; nothing changed
    Stale,
}

/// One row of the overall statistics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticRow {
    pub category: String,
    pub count: u32,
    /// e.g. `"60.5%"`
    pub percentage: String,
    /// Two decimals, or `N/A`
    pub average_confidence: String,
}

/// A highlight as listed under its batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightLine {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<String>,
}

/// Body of a batch detail block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchBody {
    Analysis {
        /// Overall batch confidence as a whole percentage
        confidence: String,
        summary: String,
        dominant_behaviors: Vec<String>,
        highlights: Vec<HighlightLine>,
    },
    Error(String),
}

/// Detail block for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchDetail {
    pub batch_index: i64,
    pub heading: String,
    pub body: BatchBody,
}

/// Everything the report page renders for one loaded report
#[derive(Debug, Clone, Serialize)]
pub struct ReportViewModel {
    pub student_id: String,
    pub report_time: String,
    pub image_source_folder: String,
    pub total_images_found: String,
    pub processed_images: String,
    pub notes: Option<AiSummaryNotes>,
    pub statistics: Vec<StatisticRow>,
    pub digest: ReportDigest,
    pub timeline: Timeline,
    pub chart: GanttChartPayload,
    pub batches: Vec<BatchDetail>,
}

impl ReportViewModel {
    /// Build the full view-model for a report
    pub fn build(
        report: &BehaviorReport,
        config: &TimelineConfig,
        encoder: &GanttChartEncoder,
    ) -> Self {
        let metadata = report.report_metadata.clone().unwrap_or_default();
        let summary = report.overall_summary.clone().unwrap_or_default();

        let timeline = aggregate(&report.detailed_sequence_analysis, config);
        let chart = encoder.encode(&timeline);

        let statistics = summary
            .behavior_statistics
            .iter()
            .map(|stat| StatisticRow {
                category: or_na(Some(stat.behavior_category.as_str())),
                count: stat.count,
                percentage: format!("{}%", stat.percentage),
                average_confidence: stat
                    .average_confidence
                    .map(|c| format!("{:.2}", c))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
            .collect();

        Self {
            student_id: or_na(metadata.student_id.as_deref()),
            report_time: or_na(metadata.report_generation_time.as_deref()),
            image_source_folder: or_na(metadata.student_image_source_folder.as_deref()),
            total_images_found: count_or_na(summary.total_images_found),
            processed_images: format!(
                "批次: {}, 總分析圖片數: {}",
                count_or_na(summary.total_batches),
                count_or_na(summary.total_images_analyzed)
            ),
            notes: summary.ai_summary_notes.clone(),
            statistics,
            digest: digest_report(report),
            timeline,
            chart,
            batches: report
                .detailed_sequence_analysis
                .iter()
                .map(batch_detail)
                .collect(),
        }
    }
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn count_or_na(value: Option<u32>) -> String {
    match value {
        Some(v) if v > 0 => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn batch_detail(batch: &SequenceBatch) -> BatchDetail {
    let heading = format!(
        "批次 {} (包含圖片: {})",
        batch.batch_index,
        batch.image_filenames_in_batch.join(", ")
    );

    let body = match batch.sequence() {
        Some(sequence) => BatchBody::Analysis {
            confidence: format!(
                "{:.0}%",
                sequence.sequence_analysis_confidence.unwrap_or(0.0) * 100.0
            ),
            summary: or_na(sequence.sequence_summary.as_deref()),
            dominant_behaviors: sequence
                .dominant_sustained_behaviors
                .iter()
                .map(|b| {
                    format!(
                        "{} (估計佔比: {:.0}%)",
                        b.behavior_category,
                        b.estimated_duration_ratio.unwrap_or(0.0) * 100.0
                    )
                })
                .collect(),
            highlights: sequence
                .per_image_highlights
                .iter()
                .map(|h| HighlightLine {
                    text: format!(
                        "圖{}: {} (信度: {:.2})",
                        h.image_index_in_sequence
                            .map(|i| i.to_string())
                            .unwrap_or_else(|| "?".to_string()),
                        h.behavior_category,
                        h.confidence
                    ),
                    description: h.description.clone(),
                    head_pose: h.head_pose_analysis.as_ref().map(|pose| {
                        format!(
                            "{} (估計角度: {}°)",
                            pose.angle_description.as_deref().unwrap_or(NOT_AVAILABLE),
                            pose.estimated_head_angle_degrees
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                        )
                    }),
                })
                .collect(),
        },
        None => BatchBody::Error(format!(
            "此序列分析錯誤: {}",
            batch.error().unwrap_or("未知錯誤")
        )),
    };

    BatchDetail {
        batch_index: batch.batch_index,
        heading,
        body,
    }
}

/// State of the report page
pub struct ReportView {
    config: TimelineConfig,
    encoder: GanttChartEncoder,
    generation: u64,
    loading_filename: Option<String>,
    status: ViewStatus,
    model: Option<ReportViewModel>,
    tabs: TabTracker,
}

impl Default for ReportView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportView {
    /// Create an idle view with the default timeline settings
    pub fn new() -> Self {
        Self::with_config(TimelineConfig::default())
    }

    /// Create an idle view with specific timeline settings
    pub fn with_config(config: TimelineConfig) -> Self {
        Self {
            config,
            encoder: GanttChartEncoder::new(),
            generation: 0,
            loading_filename: None,
            status: ViewStatus::Idle,
            model: None,
            tabs: TabTracker::new(),
        }
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    /// The displayed report, if one is loaded
    pub fn model(&self) -> Option<&ReportViewModel> {
        self.model.as_ref()
    }

    pub fn tabs(&self) -> &TabTracker {
        &self.tabs
    }

    /// Start loading `filename`.
    ///
    /// Hides the current report and ends timing of the open tab. Any ticket
    /// issued earlier becomes stale.
    pub fn begin_load(
        &mut self,
        filename: &str,
        now: DateTime<Utc>,
    ) -> (LoadTicket, Option<ActivityEvent>) {
        self.generation += 1;
        self.loading_filename = Some(filename.to_string());
        self.status = ViewStatus::Loading {
            filename: filename.to_string(),
        };
        self.model = None;

        let closed = self.tabs.close(now);
        (
            LoadTicket {
                generation: self.generation,
            },
            closed,
        )
    }

    /// Apply a completed fetch.
    ///
    /// A success rebuilds the view-model from scratch and opens
    /// [`DEFAULT_TAB`]. Responses for superseded or already completed tickets
    /// are ignored.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<BehaviorReport, ReportError>,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            log::warn!(
                "Ignoring stale report response (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        // A ticket is consumed by its first response
        let Some(filename) = self.loading_filename.take() else {
            log::warn!(
                "Ignoring duplicate report response (generation {})",
                ticket.generation
            );
            return LoadOutcome::Stale;
        };

        match result {
            Ok(report) => {
                self.model = Some(ReportViewModel::build(&report, &self.config, &self.encoder));
                self.status = ViewStatus::Ready;
                log::info!("Report \"{}\" loaded", filename);
                LoadOutcome::Applied(self.tabs.open(DEFAULT_TAB, now))
            }
            Err(e) => {
                log::warn!("Report \"{}\" failed to load: {}", filename, e);
                self.model = None;
                self.status = ViewStatus::Failed {
                    message: format!("無法加載報告 \"{}\": {}", filename, e),
                };
                LoadOutcome::Failed
            }
        }
    }

    /// Apply a completed fetch given as the raw response body
    pub fn complete_load_json(
        &mut self,
        ticket: LoadTicket,
        body: &str,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        self.complete_load(ticket, parse_report(body), now)
    }

    /// Switch tabs, returning the events to beacon
    pub fn open_tab(&mut self, tab_id: &str, now: DateTime<Utc>) -> Vec<ActivityEvent> {
        self.tabs.open(tab_id, now)
    }

    /// Page is unloading; returns the unload beacon if a tab was open
    pub fn unload(&mut self, now: DateTime<Utc>, user_id: Option<&str>) -> Option<ActivityEvent> {
        self.tabs.unload(now, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::ActivityEventType;
    use crate::timeline::CoreState;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    fn sample_report_json() -> &'static str {
        r#"{
            "report_metadata": {
                "student_id": "s1001",
                "report_generation_time": "2024-05-20 10:15:00",
                "student_image_source_folder": "frames/s1001"
            },
            "overall_summary": {
                "total_images_found": 4,
                "total_batches": 2,
                "total_images_analyzed": 4,
                "behavior_statistics": [
                    { "behavior_category": "筆記", "count": 2, "percentage": 50, "average_confidence": 0.875 },
                    { "behavior_category": "玩弄物品", "count": 1, "percentage": 25.5 }
                ],
                "ai_summary_notes": { "greeting": "你好" }
            },
            "detailed_sequence_analysis": [
                {
                    "batch_index": 1,
                    "image_filenames_in_batch": ["00-00-01-000.jpg", "00-00-02-000.jpg"],
                    "analysis": {
                        "sequence_summary": "專心寫筆記",
                        "sequence_analysis_confidence": 0.82,
                        "dominant_sustained_behaviors": [
                            { "behavior_category": "筆記", "estimated_duration_ratio": 0.7 }
                        ],
                        "per_image_highlights": [
                            {
                                "image_index_in_sequence": 0,
                                "behavior_category": "筆記",
                                "confidence": 0.9,
                                "description": "低頭書寫",
                                "head_pose_analysis": {
                                    "angle_description": "略低頭",
                                    "estimated_head_angle_degrees": 20
                                }
                            },
                            { "image_index_in_sequence": 1, "behavior_category": "玩弄物品", "confidence": 0.6 }
                        ]
                    }
                },
                {
                    "batch_index": 2,
                    "image_filenames_in_batch": ["00-00-03-000.jpg"],
                    "analysis": { "error": "model timeout" }
                }
            ]
        }"#
    }

    #[test]
    fn test_view_model_fields() {
        let report = parse_report(sample_report_json()).unwrap();
        let model = ReportViewModel::build(
            &report,
            &TimelineConfig::default(),
            &GanttChartEncoder::with_instance_id("test".to_string()),
        );

        assert_eq!(model.student_id, "s1001");
        assert_eq!(model.total_images_found, "4");
        assert_eq!(model.processed_images, "批次: 2, 總分析圖片數: 4");
        assert_eq!(model.statistics[0].percentage, "50%");
        assert_eq!(model.statistics[0].average_confidence, "0.88");
        assert_eq!(model.statistics[1].percentage, "25.5%");
        assert_eq!(model.statistics[1].average_confidence, "N/A");
        assert_eq!(model.digest.top_behavior, "筆記");
        assert_eq!(model.timeline.segments.len(), 2);
        assert_eq!(model.timeline.segments[1].core_state, CoreState::PotentialDistraction);
        assert_eq!(model.chart.datasets[0].data.len(), 2);
    }

    #[test]
    fn test_batch_details() {
        let report = parse_report(sample_report_json()).unwrap();
        let model = ReportViewModel::build(&report, &TimelineConfig::default(), &GanttChartEncoder::new());

        let first = &model.batches[0];
        assert_eq!(
            first.heading,
            "批次 1 (包含圖片: 00-00-01-000.jpg, 00-00-02-000.jpg)"
        );
        match &first.body {
            BatchBody::Analysis {
                confidence,
                summary,
                dominant_behaviors,
                highlights,
            } => {
                assert_eq!(confidence, "82%");
                assert_eq!(summary, "專心寫筆記");
                assert_eq!(dominant_behaviors, &vec!["筆記 (估計佔比: 70%)".to_string()]);
                assert_eq!(highlights[0].text, "圖0: 筆記 (信度: 0.90)");
                assert_eq!(highlights[0].description.as_deref(), Some("低頭書寫"));
                assert_eq!(highlights[0].head_pose.as_deref(), Some("略低頭 (估計角度: 20°)"));
                assert!(highlights[1].head_pose.is_none());
            }
            other => panic!("unexpected body: {:?}", other),
        }

        assert_eq!(
            model.batches[1].body,
            BatchBody::Error("此序列分析錯誤: model timeout".to_string())
        );
    }

    #[test]
    fn test_missing_metadata_shows_na() {
        let model = ReportViewModel::build(
            &BehaviorReport::default(),
            &TimelineConfig::default(),
            &GanttChartEncoder::new(),
        );
        assert_eq!(model.student_id, "N/A");
        assert_eq!(model.report_time, "N/A");
        assert_eq!(model.processed_images, "批次: N/A, 總分析圖片數: N/A");
        assert!(model.timeline.is_empty());
        assert!(model.chart.is_empty());
    }

    #[test]
    fn test_load_opens_default_tab() {
        let mut view = ReportView::new();
        let (ticket, closed) = view.begin_load("report_a.json", t0());
        assert!(closed.is_none());
        assert_eq!(
            view.status(),
            &ViewStatus::Loading {
                filename: "report_a.json".to_string()
            }
        );

        let outcome = view.complete_load_json(ticket, sample_report_json(), t0());
        match outcome {
            LoadOutcome::Applied(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].event_type, ActivityEventType::TabViewStart);
                assert_eq!(events[0].element_or_page_id, DEFAULT_TAB);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert!(view.model().is_some());
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut view = ReportView::new();
        let (slow, _) = view.begin_load("old.json", t0());
        let (fast, _) = view.begin_load("new.json", t0());

        assert_eq!(
            view.complete_load_json(fast, sample_report_json(), t0()),
            LoadOutcome::Applied(vec![ActivityEvent {
                event_type: ActivityEventType::TabViewStart,
                element_or_page_id: DEFAULT_TAB.to_string(),
                duration_seconds: None,
                user_id: None,
            }])
        );

        let outcome = view.complete_load(slow, Ok(BehaviorReport::default()), t0());
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(view.model().unwrap().student_id, "s1001");
    }

    #[test]
    fn test_duplicate_response_is_ignored() {
        let mut view = ReportView::new();
        let (ticket, _) = view.begin_load("a.json", t0());
        view.complete_load_json(ticket, sample_report_json(), t0());

        let outcome = view.complete_load(
            ticket,
            Err(ReportError::InvalidReport("late dup".to_string())),
            t0() + Duration::seconds(3),
        );

        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert_eq!(view.model().unwrap().student_id, "s1001");
        assert_eq!(view.tabs().current().unwrap().tab_id, DEFAULT_TAB);
        assert_eq!(view.tabs().current().unwrap().opened_at, t0());
    }

    #[test]
    fn test_new_load_closes_open_tab() {
        let mut view = ReportView::new();
        let (ticket, _) = view.begin_load("a.json", t0());
        view.complete_load_json(ticket, sample_report_json(), t0());

        let (_, closed) = view.begin_load("b.json", t0() + Duration::seconds(42));
        let closed = closed.unwrap();
        assert_eq!(closed.event_type, ActivityEventType::TabViewEnd);
        assert_eq!(closed.element_or_page_id, DEFAULT_TAB);
        assert_eq!(closed.duration_seconds, Some(42));
        assert!(view.model().is_none());
    }

    #[test]
    fn test_failed_load_message() {
        let mut view = ReportView::new();
        let (ticket, _) = view.begin_load("missing.json", t0());

        let outcome = view.complete_load_json(ticket, r#"{"error": "未找到"}"#, t0());

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(
            view.status(),
            &ViewStatus::Failed {
                message: "無法加載報告 \"missing.json\": Invalid report: 未找到".to_string()
            }
        );
        assert!(view.tabs().current().is_none());
    }

    #[test]
    fn test_unload_after_tab_switch() {
        let mut view = ReportView::new();
        let (ticket, _) = view.begin_load("a.json", t0());
        view.complete_load_json(ticket, sample_report_json(), t0());
        view.open_tab("timelineTab", t0() + Duration::seconds(5));

        let beacon = view
            .unload(t0() + Duration::seconds(65), Some("12"))
            .unwrap();
        assert_eq!(beacon.event_type, ActivityEventType::TabViewEndUnload);
        assert_eq!(beacon.element_or_page_id, "timelineTab");
        assert_eq!(beacon.duration_seconds, Some(60));
        assert_eq!(beacon.user_id.as_deref(), Some("12"));
    }
}

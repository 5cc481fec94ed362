//! Behavior report data types
//!
//! This module defines the report document produced by the upstream analysis
//! service. Every section is optional or defaulted so that partial reports
//! still parse; the view layer fills gaps with `N/A` placeholders.

use serde::{Deserialize, Serialize};

/// A complete student behavior report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorReport {
    /// Report metadata (student, generation time, image source)
    #[serde(default)]
    pub report_metadata: Option<ReportMetadata>,
    /// Aggregate statistics and AI notes
    #[serde(default)]
    pub overall_summary: Option<OverallSummary>,
    /// Per-batch sequence analysis, consumed by the timeline aggregator
    #[serde(default)]
    pub detailed_sequence_analysis: Vec<SequenceBatch>,
}

/// Report metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default)]
    pub student_id: Option<String>,
    /// Generation time formatted as `%Y-%m-%d %H:%M:%S`
    #[serde(default)]
    pub report_generation_time: Option<String>,
    #[serde(default)]
    pub student_image_source_folder: Option<String>,
}

/// Aggregate statistics over the whole report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallSummary {
    #[serde(default)]
    pub total_images_found: Option<u32>,
    #[serde(default)]
    pub total_batches: Option<u32>,
    #[serde(default)]
    pub total_images_analyzed: Option<u32>,
    /// Per-category statistics, ordered by the producer (most frequent first)
    #[serde(default)]
    pub behavior_statistics: Vec<BehaviorStatistic>,
    #[serde(default)]
    pub ai_summary_notes: Option<AiSummaryNotes>,
}

/// Statistics for one fine-grained behavior category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorStatistic {
    #[serde(default)]
    pub behavior_category: String,
    #[serde(default)]
    pub count: u32,
    /// Share of analyzed images (0-100)
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub average_confidence: Option<f64>,
}

/// Free-text observations written by the analysis model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiSummaryNotes {
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub positive_feedback: Option<String>,
    #[serde(default)]
    pub observation_points_summary: Option<String>,
    #[serde(default)]
    pub reflection_points: Option<String>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub encouragement: Option<String>,
}

/// One analyzed image batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceBatch {
    #[serde(default)]
    pub batch_index: i64,
    /// Filenames in capture order, encoded as `HH-MM-SS[-mmm].ext`
    #[serde(default)]
    pub image_filenames_in_batch: Vec<String>,
    #[serde(default)]
    pub analysis: Option<BatchAnalysis>,
}

impl SequenceBatch {
    /// Sequence analysis, if the batch was analyzed successfully
    pub fn sequence(&self) -> Option<&SequenceAnalysis> {
        match &self.analysis {
            Some(BatchAnalysis::Sequence(sequence)) => Some(sequence),
            _ => None,
        }
    }

    /// Batch-level error message, if the analysis failed
    pub fn error(&self) -> Option<&str> {
        match &self.analysis {
            Some(BatchAnalysis::Failed { error }) => Some(error.as_str()),
            _ => None,
        }
    }
}

/// Result of analyzing one batch: either a failure marker or the analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchAnalysis {
    /// The analysis service reported an error for this batch
    Failed { error: String },
    /// Successful sequence analysis
    Sequence(SequenceAnalysis),
}

/// Successful analysis of a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    #[serde(default)]
    pub per_image_highlights: Vec<BehaviorHighlight>,
    #[serde(default)]
    pub dominant_sustained_behaviors: Vec<DominantBehavior>,
    #[serde(default)]
    pub sequence_summary: Option<String>,
    /// Overall confidence for the batch (0-1)
    #[serde(default)]
    pub sequence_analysis_confidence: Option<f64>,
}

/// A model annotation for one image of a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorHighlight {
    /// Index into `image_filenames_in_batch`; producers disagree on 0- vs 1-based
    #[serde(default)]
    pub image_index_in_sequence: Option<i64>,
    #[serde(default)]
    pub behavior_category: String,
    /// Confidence (0-1)
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_pose_analysis: Option<HeadPose>,
}

/// Head pose estimate attached to a highlight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadPose {
    #[serde(default)]
    pub angle_description: Option<String>,
    #[serde(default)]
    pub estimated_head_angle_degrees: Option<f64>,
}

/// A behavior sustained across most of a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DominantBehavior {
    #[serde(default)]
    pub behavior_category: String,
    /// Estimated share of the batch duration (0-1)
    #[serde(default)]
    pub estimated_duration_ratio: Option<f64>,
}

//! Behavior report model
//!
//! Pipeline: Report JSON → Adapter → typed [`BehaviorReport`] consumed by the
//! timeline aggregator, the digest and the view-model.

pub mod adapter;
pub mod types;

pub use adapter::parse_report;
pub use types::{
    AiSummaryNotes, BatchAnalysis, BehaviorHighlight, BehaviorReport, BehaviorStatistic,
    DominantBehavior, HeadPose, OverallSummary, ReportMetadata, SequenceAnalysis, SequenceBatch,
};

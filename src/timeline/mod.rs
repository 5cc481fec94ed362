//! Behavior timeline module
//!
//! Buckets per-image behavior labels into coarse core states and lays them out
//! along a time axis for a Gantt-style chart.
//!
//! Pipeline: batches → timestamp resolution → core-state mapping → sort →
//! segment merge → chart payload

pub mod aggregator;
pub mod chart;
pub mod core_state;
pub mod timestamp;

pub use aggregator::{
    aggregate, GanttSegment, Timeline, TimelineConfig, TimelineEvent, TimelineStats,
    DEFAULT_END_PADDING_SEC,
};
pub use chart::{GanttChartEncoder, GanttChartPayload};
pub use core_state::CoreState;

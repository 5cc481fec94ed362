//! Behavior timeline aggregation
//!
//! Converts per-batch highlights into time-ordered core-state segments for a
//! Gantt-style chart: resolve a timestamp per highlight, map its category to a
//! core state, sort, then merge consecutive same-state events into segments.

use crate::report::types::SequenceBatch;
use crate::timeline::core_state::CoreState;
use crate::timeline::timestamp::{parse_filename_seconds, resolve_filename};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default padding added after the last event, in seconds
pub const DEFAULT_END_PADDING_SEC: f64 = 5.0;

/// Aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Duration given to the final segment after its last event
    pub end_padding_sec: f64,
    /// Use a batch's first dominant behavior for every image when the batch
    /// has no per-image highlights
    pub dominant_fallback: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            end_padding_sec: DEFAULT_END_PADDING_SEC,
            dominant_fallback: false,
        }
    }
}

impl TimelineConfig {
    /// Padding actually applied: negative values clamp to zero and non-finite
    /// values fall back to [`DEFAULT_END_PADDING_SEC`], keeping `start <= end`
    pub fn effective_end_padding(&self) -> f64 {
        if self.end_padding_sec.is_finite() {
            self.end_padding_sec.max(0.0)
        } else {
            DEFAULT_END_PADDING_SEC
        }
    }
}

/// A single resolved observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Seconds since midnight, from the image filename
    pub timestamp: f64,
    pub core_state: CoreState,
    /// Fine-grained behavior category that produced this event
    pub source_label: String,
}

/// A maximal run of events sharing one core state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttSegment {
    pub core_state: CoreState,
    pub start: f64,
    pub end: f64,
    pub contributing_labels: BTreeSet<String>,
    /// Number of events merged into this segment
    pub event_count: u32,
}

impl GanttSegment {
    fn open(event: TimelineEvent) -> Self {
        let mut contributing_labels = BTreeSet::new();
        contributing_labels.insert(event.source_label);
        Self {
            core_state: event.core_state,
            start: event.timestamp,
            end: event.timestamp,
            contributing_labels,
            event_count: 1,
        }
    }

    /// Segment length in seconds
    pub fn duration_sec(&self) -> f64 {
        self.end - self.start
    }
}

/// Counters describing how the input was consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStats {
    /// Batches in the input
    pub batches: u32,
    /// Batches excluded because their analysis reported an error
    pub error_batches: u32,
    /// Highlights seen in successfully analyzed batches
    pub highlights: u32,
    /// Events that made it onto the timeline
    pub resolved_events: u32,
    /// Highlights dropped because no timestamp could be resolved
    pub skipped_highlights: u32,
}

/// Aggregator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Categorical axis, always the full canonical order
    pub core_states: Vec<CoreState>,
    /// Segments sorted by start time
    pub segments: Vec<GanttSegment>,
    pub stats: TimelineStats,
}

impl Timeline {
    /// True when no event could be placed on the timeline
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total time covered by segments of the given state
    pub fn total_duration(&self, state: CoreState) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.core_state == state)
            .map(GanttSegment::duration_sec)
            .sum()
    }
}

/// Build a timeline from the report's batch list.
///
/// Pure and total: batches with analysis errors are excluded, highlights
/// without a resolvable timestamp are skipped, and an input with no usable
/// events yields an empty segment list.
pub fn aggregate(batches: &[SequenceBatch], config: &TimelineConfig) -> Timeline {
    let mut stats = TimelineStats {
        batches: batches.len() as u32,
        ..TimelineStats::default()
    };

    let mut events = collect_events(batches, config, &mut stats);
    stats.resolved_events = events.len() as u32;

    // sort_by is stable: equal timestamps keep batch/highlight order
    events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let segments = merge_segments(events, config.effective_end_padding());

    Timeline {
        core_states: CoreState::ORDERED.to_vec(),
        segments,
        stats,
    }
}

fn collect_events(
    batches: &[SequenceBatch],
    config: &TimelineConfig,
    stats: &mut TimelineStats,
) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    for batch in batches {
        if let Some(error) = batch.error() {
            log::warn!(
                "Batch {} excluded from timeline: {}",
                batch.batch_index,
                error
            );
            stats.error_batches += 1;
            continue;
        }

        let Some(sequence) = batch.sequence() else {
            continue;
        };

        if !sequence.per_image_highlights.is_empty() {
            for highlight in &sequence.per_image_highlights {
                stats.highlights += 1;

                if highlight.behavior_category.is_empty() {
                    log::debug!(
                        "Batch {}: highlight at index {:?} has no category, skipped",
                        batch.batch_index,
                        highlight.image_index_in_sequence
                    );
                    stats.skipped_highlights += 1;
                    continue;
                }

                let timestamp = highlight
                    .image_index_in_sequence
                    .and_then(|idx| resolve_filename(&batch.image_filenames_in_batch, idx))
                    .and_then(parse_filename_seconds);

                match timestamp {
                    Some(timestamp) => events.push(TimelineEvent {
                        timestamp,
                        core_state: CoreState::from_category(&highlight.behavior_category),
                        source_label: highlight.behavior_category.clone(),
                    }),
                    None => {
                        log::debug!(
                            "Batch {}: no timestamp for highlight at index {:?}, skipped",
                            batch.batch_index,
                            highlight.image_index_in_sequence
                        );
                        stats.skipped_highlights += 1;
                    }
                }
            }
        } else if config.dominant_fallback {
            if let Some(dominant) = sequence
                .dominant_sustained_behaviors
                .first()
                .filter(|d| !d.behavior_category.is_empty())
            {
                let core_state = CoreState::from_category(&dominant.behavior_category);
                events.extend(
                    batch
                        .image_filenames_in_batch
                        .iter()
                        .filter_map(|name| parse_filename_seconds(name))
                        .map(|timestamp| TimelineEvent {
                            timestamp,
                            core_state,
                            source_label: dominant.behavior_category.clone(),
                        }),
                );
            }
        }
    }

    events
}

fn merge_segments(events: Vec<TimelineEvent>, end_padding_sec: f64) -> Vec<GanttSegment> {
    let mut segments = Vec::new();
    let mut events = events.into_iter();

    let Some(first) = events.next() else {
        return segments;
    };

    let mut current = GanttSegment::open(first);
    let mut last_timestamp = current.start;

    for event in events {
        last_timestamp = event.timestamp;
        if event.core_state == current.core_state {
            current.contributing_labels.insert(event.source_label);
            current.event_count += 1;
        } else {
            current.end = event.timestamp;
            segments.push(current);
            current = GanttSegment::open(event);
        }
    }

    current.end = last_timestamp + end_padding_sec;
    segments.push(current);

    segments
}

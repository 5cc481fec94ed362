//! Gantt chart encoder
//!
//! Encodes a [`Timeline`] into the payload consumed by the chart renderer:
//! a categorical y-axis in canonical core-state order and one series whose
//! points are `[start, end]` ranges.

use crate::error::ReportError;
use crate::timeline::aggregator::Timeline;
use crate::timeline::core_state::CoreState;
use crate::{LENS_VERSION, PRODUCER_NAME};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Series label shown in the chart legend
pub const SERIES_LABEL: &str = "行為時間軸";

/// Base palette, assigned by position on the core-state axis
const BASE_COLORS: [&str; 6] = [
    "rgba(255, 99, 132, 0.8)",
    "rgba(54, 162, 235, 0.8)",
    "rgba(255, 206, 86, 0.8)",
    "rgba(75, 192, 192, 0.8)",
    "rgba(153, 102, 255, 0.8)",
    "rgba(255, 159, 64, 0.8)",
];

/// Color for a core state. Stable across reports.
pub fn state_color(state: CoreState) -> &'static str {
    BASE_COLORS[state.axis_index() % BASE_COLORS.len()]
}

/// Producer metadata attached to every payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One drawable bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `[start, end]` in seconds
    pub range: [f64; 2],
    pub category: CoreState,
    /// Fine-grained labels merged into this bar
    pub metadata: Vec<String>,
}

/// A chart series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<ChartPoint>,
    /// One color per point, keyed by the point's category
    pub background_color: Vec<String>,
}

/// Payload handed to the chart renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttChartPayload {
    pub producer: ChartProducer,
    /// Categorical axis; empty when there is nothing to draw
    pub y_labels: Vec<CoreState>,
    pub datasets: Vec<ChartDataset>,
}

impl GanttChartPayload {
    /// True when the renderer should show an "insufficient data" message
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Gantt chart encoder
pub struct GanttChartEncoder {
    instance_id: String,
}

impl Default for GanttChartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GanttChartEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a timeline into a chart payload
    pub fn encode(&self, timeline: &Timeline) -> GanttChartPayload {
        let producer = ChartProducer {
            name: PRODUCER_NAME.to_string(),
            version: LENS_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        if timeline.is_empty() {
            return GanttChartPayload {
                producer,
                y_labels: Vec::new(),
                datasets: Vec::new(),
            };
        }

        let data: Vec<ChartPoint> = timeline
            .segments
            .iter()
            .map(|segment| ChartPoint {
                range: [segment.start, segment.end],
                category: segment.core_state,
                metadata: segment.contributing_labels.iter().cloned().collect(),
            })
            .collect();

        let background_color = data
            .iter()
            .map(|point| state_color(point.category).to_string())
            .collect();

        GanttChartPayload {
            producer,
            y_labels: timeline.core_states.clone(),
            datasets: vec![ChartDataset {
                label: SERIES_LABEL.to_string(),
                data,
                background_color,
            }],
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(&self, timeline: &Timeline) -> Result<String, ReportError> {
        let payload = self.encode(timeline);
        serde_json::to_string(&payload).map_err(ReportError::JsonError)
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json_pretty(&self, timeline: &Timeline) -> Result<String, ReportError> {
        let payload = self.encode(timeline);
        serde_json::to_string_pretty(&payload).map_err(ReportError::JsonError)
    }
}

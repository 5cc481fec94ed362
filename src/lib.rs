//! Classroom Lens - Presentation layer for classroom behavior analysis reports
//!
//! Lens turns the per-student behavior report produced by the image analysis
//! service into what the report page shows, through a deterministic pipeline:
//! report parsing → timestamp resolution → core-state mapping → segment merge
//! → chart encoding.
//!
//! ## Modules
//!
//! - **Timeline**: Behavior-timeline aggregation and the Gantt chart payload
//! - **View**: Report page view-model with stale-load protection
//! - **Digest / Telemetry / Registration**: Class overview numbers, activity
//!   beacons, and registration form checks

pub mod digest;
pub mod error;
pub mod pipeline;
pub mod registration;
pub mod report;
pub mod telemetry;
pub mod timeline;
pub mod view;

pub use error::ReportError;
pub use pipeline::{report_to_gantt, ReportProcessor};

// Report exports
pub use report::{parse_report, BehaviorReport};

// Timeline exports
pub use timeline::{aggregate, CoreState, GanttChartEncoder, Timeline, TimelineConfig};

pub use view::{ReportView, ReportViewModel};

/// Lens version embedded in all chart payloads
pub const LENS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for chart payloads
pub const PRODUCER_NAME: &str = "classroom-lens";

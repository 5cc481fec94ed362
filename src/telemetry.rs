//! Interaction telemetry
//!
//! Builds the activity payloads the report page beacons back to the server:
//! clicks, page views, and how long each tab stayed open. Tab timing lives in
//! an explicit [`TabTracker`] value owned by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page id logged when the report page is first shown
pub const REPORT_PAGE_ID: &str = "student_report_main_page";

/// Kind of activity being logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEventType {
    Click,
    PageViewStart,
    TabViewStart,
    TabViewEnd,
    /// Tab closed because the page is being unloaded
    TabViewEndUnload,
}

/// One activity record, serialized as the request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_type: ActivityEventType,
    pub element_or_page_id: String,
    /// Whole seconds spent, for `tab_view_end*` events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    /// Required by the unload beacon, which may be sent without a session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ActivityEvent {
    fn new(event_type: ActivityEventType, element_or_page_id: impl Into<String>) -> Self {
        Self {
            event_type,
            element_or_page_id: element_or_page_id.into(),
            duration_seconds: None,
            user_id: None,
        }
    }

    /// A click on a named element
    pub fn click(element: impl Into<String>) -> Self {
        Self::new(ActivityEventType::Click, element)
    }

    /// The report page was shown
    pub fn page_view_start(page_id: impl Into<String>) -> Self {
        Self::new(ActivityEventType::PageViewStart, page_id)
    }

    /// The "load report" button was pressed for a report file
    pub fn load_report_click(filename: &str) -> Self {
        Self::click(format!("button_load_report_{}", filename))
    }

    /// Serialize to the JSON body expected by the logging endpoints
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The tab currently open and when it was opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTab {
    pub tab_id: String,
    pub opened_at: DateTime<Utc>,
}

/// Tracks tab dwell time for one page
#[derive(Debug, Clone, Default)]
pub struct TabTracker {
    current: Option<OpenTab>,
}

impl TabTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently open tab, if any
    pub fn current(&self) -> Option<&OpenTab> {
        self.current.as_ref()
    }

    /// Switch to `tab_id`, closing the previously open tab.
    ///
    /// Returns the `tab_view_end` for the previous tab (if one was open)
    /// followed by the `tab_view_start` for the new one.
    pub fn open(&mut self, tab_id: &str, now: DateTime<Utc>) -> Vec<ActivityEvent> {
        let mut events: Vec<ActivityEvent> = self.close(now).into_iter().collect();

        self.current = Some(OpenTab {
            tab_id: tab_id.to_string(),
            opened_at: now,
        });
        events.push(ActivityEvent::new(ActivityEventType::TabViewStart, tab_id));

        events
    }

    /// Close the open tab without opening another one (e.g. a new report load)
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<ActivityEvent> {
        let open = self.current.take()?;
        let mut event = ActivityEvent::new(ActivityEventType::TabViewEnd, open.tab_id.clone());
        event.duration_seconds = Some(elapsed_seconds(&open, now));
        Some(event)
    }

    /// Close the open tab because the page is going away.
    ///
    /// The resulting beacon carries `user_id` since it may arrive without a
    /// session cookie.
    pub fn unload(&mut self, now: DateTime<Utc>, user_id: Option<&str>) -> Option<ActivityEvent> {
        let open = self.current.take()?;
        let mut event =
            ActivityEvent::new(ActivityEventType::TabViewEndUnload, open.tab_id.clone());
        event.duration_seconds = Some(elapsed_seconds(&open, now));
        event.user_id = user_id.map(str::to_string);
        Some(event)
    }
}

/// Rounded whole seconds since the tab was opened; clock skew clamps to zero
fn elapsed_seconds(open: &OpenTab, now: DateTime<Utc>) -> i64 {
    let millis = (now - open.opened_at).num_milliseconds().max(0);
    (millis as f64 / 1000.0).round() as i64
}

//! Log categories.
//!
//! Every record lands in exactly one append-only category. Session creation
//! and session updates have their own categories; tracked behavioral events
//! are routed by their `type` field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Sessions,
    SessionUpdates,
    PageEvents,
    DocumentEvents,
    ValidationErrors,
    FormResponses,
    Navigation,
    Clicks,
    Scrolls,
    Visibility,
    OtherEvents,
}

impl EventCategory {
    pub const ALL: [EventCategory; 11] = [
        EventCategory::Sessions,
        EventCategory::SessionUpdates,
        EventCategory::PageEvents,
        EventCategory::DocumentEvents,
        EventCategory::ValidationErrors,
        EventCategory::FormResponses,
        EventCategory::Navigation,
        EventCategory::Clicks,
        EventCategory::Scrolls,
        EventCategory::Visibility,
        EventCategory::OtherEvents,
    ];

    /// Routes a tracked event by its `type`. Unknown types fall back to
    /// [`EventCategory::OtherEvents`].
    pub fn for_event_type(event_type: &str) -> Self {
        match event_type {
            "page_enter" | "page_exit" => EventCategory::PageEvents,
            "doc_open" | "doc_close" => EventCategory::DocumentEvents,
            "validation_errors" => EventCategory::ValidationErrors,
            "form_responses" => EventCategory::FormResponses,
            "navigation" => EventCategory::Navigation,
            "click" => EventCategory::Clicks,
            "scroll" => EventCategory::Scrolls,
            "visibility_change" => EventCategory::Visibility,
            _ => EventCategory::OtherEvents,
        }
    }

    /// Stable name used for the log file and the export table.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Sessions => "sessions",
            EventCategory::SessionUpdates => "session_updates",
            EventCategory::PageEvents => "page_events",
            EventCategory::DocumentEvents => "document_events",
            EventCategory::ValidationErrors => "validation_errors",
            EventCategory::FormResponses => "form_responses",
            EventCategory::Navigation => "navigation",
            EventCategory::Clicks => "clicks",
            EventCategory::Scrolls => "scrolls",
            EventCategory::Visibility => "visibility",
            EventCategory::OtherEvents => "other_events",
        }
    }

    /// True for categories that hold tracked behavioral events.
    pub fn is_behavioral(&self) -> bool {
        !matches!(self, EventCategory::Sessions | EventCategory::SessionUpdates)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("table", format!("unknown table '{}'", s)))
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Sports,
    Music,
    General,
    Children,
    School,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Sports,
        EventType::Music,
        EventType::General,
        EventType::Children,
        EventType::School,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sports => "sports",
            EventType::Music => "music",
            EventType::General => "general",
            EventType::Children => "children",
            EventType::School => "school",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Sports => "Sports",
            EventType::Music => "Music",
            EventType::General => "General",
            EventType::Children => "Children",
            EventType::School => "School",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// Validated event data without an identity.
///
/// Only constructed by the form layer once every field rule has passed,
/// so `start_date <= end_date` always holds here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub name: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub handled_by: String,
    pub organisation: String,
    pub sub_events: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub handled_by: String,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub sub_events: u32,
}

impl Event {
    pub fn new(id: EventId, fields: EventFields) -> Self {
        Event {
            id,
            name: fields.name,
            event_type: fields.event_type,
            start_date: fields.start_date,
            end_date: fields.end_date,
            description: fields.description,
            handled_by: fields.handled_by,
            organisation: fields.organisation,
            sub_events: fields.sub_events,
        }
    }
}

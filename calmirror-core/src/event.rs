//! Provider-neutral event types.
//!
//! Stores convert their API payloads into these types. The reconciler only
//! reads `Event`s and asks the store for changes through `NewEvent` and
//! `EventPatch`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as seen by the mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier, unique within its calendar.
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<EventColor>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<EventColor>,
}

/// Partial update for an existing event. `None` leaves a field untouched.
///
/// `description` and `location` are doubly optional so a patch can clear
/// them (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<EventColor>,
}

/// Keep an explicit `null` as `Some(None)` instead of collapsing it to `None`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl EventPatch {
    /// Apply this patch to an event in place.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(color) = self.color {
            event.color = Some(color);
        }
    }
}

/// Event colors offered by the calendar store (Google Calendar's palette).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventColor {
    PaleBlue,
    PaleGreen,
    Mauve,
    PaleRed,
    Yellow,
    Orange,
    Cyan,
    /// Graphite; the default marker for copies.
    #[default]
    Gray,
    Blue,
    Green,
    Red,
}

impl EventColor {
    pub const ALL: [EventColor; 11] = [
        EventColor::PaleBlue,
        EventColor::PaleGreen,
        EventColor::Mauve,
        EventColor::PaleRed,
        EventColor::Yellow,
        EventColor::Orange,
        EventColor::Cyan,
        EventColor::Gray,
        EventColor::Blue,
        EventColor::Green,
        EventColor::Red,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::PaleBlue => "pale_blue",
            EventColor::PaleGreen => "pale_green",
            EventColor::Mauve => "mauve",
            EventColor::PaleRed => "pale_red",
            EventColor::Yellow => "yellow",
            EventColor::Orange => "orange",
            EventColor::Cyan => "cyan",
            EventColor::Gray => "gray",
            EventColor::Blue => "blue",
            EventColor::Green => "green",
            EventColor::Red => "red",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        if normalized == "graphite" || normalized == "grey" {
            return Ok(EventColor::Gray);
        }
        EventColor::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = EventColor::ALL.iter().map(|c| c.as_str()).collect();
                format!("Unknown color '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

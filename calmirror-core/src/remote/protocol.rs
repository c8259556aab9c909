//! Defines the JSON protocol spoken between calmirror and provider
//! binaries over stdin/stdout.
//!
//! Every request carries the calendar's provider-specific config keys
//! (e.g. `google_account`, `google_calendar_id`) flattened next to the
//! command's own fields.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{Event, EventPatch, NewEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    VerifyCalendar,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::VerifyCalendar => "verify_calendar",
            Command::ListEvents => "list_events",
            Command::CreateEvent => "create_event",
            Command::UpdateEvent => "update_event",
            Command::DeleteEvent => "delete_event",
        }
    }
}

/// Request sent from calmirror to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to calmirror.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Check that the configured calendar exists and is accessible.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCalendar {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for VerifyCalendar {
    type Response = ();
    fn command() -> Command {
        Command::VerifyCalendar
    }
}

/// List events overlapping a time range (RFC 3339 bounds).
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: NewEvent,
}

impl ProviderCommand for CreateEvent {
    type Response = Event;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Apply a partial update to an existing event.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
    pub patch: EventPatch,
}

impl ProviderCommand for UpdateEvent {
    type Response = Event;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_flattens_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_calendar_id".into(), json!("work@group"));

        let cmd = DeleteEvent {
            remote_config,
            event_id: "evt1".into(),
        };
        let request = Request {
            command: DeleteEvent::command(),
            params: serde_json::to_value(cmd).unwrap(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "command": "delete_event",
                "params": { "google_calendar_id": "work@group", "event_id": "evt1" }
            })
        );
    }

    #[test]
    fn test_command_names_match_wire_format() {
        for command in [
            Command::VerifyCalendar,
            Command::ListEvents,
            Command::CreateEvent,
            Command::UpdateEvent,
            Command::DeleteEvent,
        ] {
            assert_eq!(serde_json::to_value(command).unwrap(), command.as_str());
        }
    }

    #[test]
    fn test_response_parsing() {
        let ok: Response<()> = serde_json::from_str(r#"{"status":"success","data":null}"#).unwrap();
        assert!(matches!(ok, Response::Success { .. }));

        let err: Response<Vec<Event>> =
            serde_json::from_str(r#"{"status":"error","error":"calendar not found"}"#).unwrap();
        match err {
            Response::Error { error } => assert_eq!(error, "calendar not found"),
            Response::Success { .. } => panic!("expected error"),
        }
    }

    #[test]
    fn test_list_events_response_defaults_optional_fields() {
        let body = r#"{"status":"success","data":[
            {"id":"e1","title":"Lunch","start":"2025-06-02T12:00:00Z","end":"2025-06-02T13:00:00Z"}
        ]}"#;
        let parsed: Response<Vec<Event>> = serde_json::from_str(body).unwrap();
        let Response::Success { data } = parsed else {
            panic!("expected success");
        };
        assert_eq!(data.len(), 1);
        assert!(!data[0].all_day);
        assert_eq!(data[0].color, None);
    }
}

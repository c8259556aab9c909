//! Calendars backed by provider processes.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::{Event, EventPatch, NewEvent};
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents, UpdateEvent, VerifyCalendar};
use crate::remote::provider::Provider;
use crate::store::CalendarStore;
use crate::window::SyncWindow;

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A calendar reached through a provider (e.g. Google Calendar settings).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Remote {
    pub provider: Provider,
    /// Display name; defaults to the config key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote {
            provider,
            name: None,
            config,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Tag a provider failure with the calendar it happened on.
    fn in_calendar(&self, error: CalMirrorError) -> CalMirrorError {
        match error {
            CalMirrorError::Provider(msg) => {
                CalMirrorError::Provider(format!("calendar '{}': {}", self.name(), msg))
            }
            other => other,
        }
    }
}

#[async_trait]
impl CalendarStore for Remote {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.provider.name())
    }

    async fn verify(&self) -> CalMirrorResult<()> {
        self.provider
            .call(VerifyCalendar {
                remote_config: self.remote_config(),
            })
            .await
            .map_err(|e| match e {
                CalMirrorError::Provider(msg) => {
                    CalMirrorError::CalendarNotFound(format!("{}: {}", self.name(), msg))
                }
                other => other,
            })
    }

    async fn list_events(&self, window: &SyncWindow) -> CalMirrorResult<Vec<Event>> {
        let events: Vec<Event> = self
            .provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                from: window.from_rfc3339(),
                to: window.to_rfc3339(),
            })
            .await
            .map_err(|e| self.in_calendar(e))?;
        debug!(calendar = self.name(), window = %window, count = events.len(), "Listed events");
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> CalMirrorResult<Event> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: event.clone(),
            })
            .await
            .map_err(|e| self.in_calendar(e))
    }

    async fn update_event(&self, event: &Event, patch: &EventPatch) -> CalMirrorResult<Event> {
        self.provider
            .call(UpdateEvent {
                remote_config: self.remote_config(),
                event_id: event.id.clone(),
                patch: patch.clone(),
            })
            .await
            .map_err(|e| self.in_calendar(e))
    }

    async fn delete_event(&self, event: &Event) -> CalMirrorResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: event.id.clone(),
            })
            .await
            .map_err(|e| self.in_calendar(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_from_toml() {
        let remote: Remote = toml::from_str(
            r#"
            provider = "google"
            name = "work"
            google_account = "me@example.com"
            google_calendar_id = "work@group.calendar.google.com"
            "#,
        )
        .unwrap();

        assert_eq!(remote.provider.name(), "google");
        assert_eq!(CalendarStore::name(&remote), "work");
        let params = serde_json::Map::from(&remote.config);
        assert_eq!(params.len(), 2);
        assert_eq!(params["google_account"], "me@example.com");
        assert!(!params.contains_key("name"));
    }

    #[test]
    fn test_provider_errors_name_the_calendar() {
        let remote = Remote::new(Provider::from_name("google"), RemoteConfig::default()).with_name("work");

        match remote.in_calendar(CalMirrorError::Provider("quota exceeded".into())) {
            CalMirrorError::Provider(msg) => assert_eq!(msg, "calendar 'work': quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            remote.in_calendar(CalMirrorError::ProviderTimeout(10)),
            CalMirrorError::ProviderTimeout(10)
        ));
    }

    #[test]
    fn test_name_falls_back_to_provider() {
        let remote = Remote::new(Provider::from_name("caldav"), RemoteConfig::default());
        assert_eq!(CalendarStore::name(&remote), "caldav");
        assert_eq!(CalendarStore::name(&remote.with_name("home")), "home");
    }
}

//! In-memory calendar store.
//!
//! Backs tests and offline previews. Writes made through [`CalendarStore`]
//! are journaled so callers can check exactly what a run changed; the
//! `insert`/`remove`/`edit` helpers simulate outside changes and are not
//! journaled.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::{Event, EventPatch, NewEvent};
use crate::store::CalendarStore;
use crate::window::SyncWindow;

/// A write issued through the store interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Created(Event),
    Updated { before: Event, after: Event },
    Deleted(Event),
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    journal: Vec<Mutation>,
    failing_ids: HashSet<String>,
    unreachable: bool,
    unresolved: bool,
}

pub struct MemoryCalendar {
    name: String,
    state: Mutex<State>,
}

impl MemoryCalendar {
    pub fn new(name: &str) -> Self {
        MemoryCalendar {
            name: name.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an event as if created outside the mirror.
    pub fn insert(&self, event: Event) {
        self.state().events.push(event);
    }

    /// Remove an event as if deleted outside the mirror.
    pub fn remove(&self, id: &str) -> Option<Event> {
        let mut state = self.state();
        let idx = state.events.iter().position(|e| e.id == id)?;
        Some(state.events.remove(idx))
    }

    /// Change an event as if edited outside the mirror.
    pub fn edit(&self, id: &str, patch: &EventPatch) -> bool {
        let mut state = self.state();
        match state.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                patch.apply_to(event);
                true
            }
            None => false,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn get(&self, id: &str) -> Option<Event> {
        self.state().events.iter().find(|e| e.id == id).cloned()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().journal.clone()
    }

    pub fn clear_mutations(&self) {
        self.state().journal.clear();
    }

    /// Make every update or delete of `id` fail with a store error.
    pub fn fail_writes_to(&self, id: &str) {
        self.state().failing_ids.insert(id.to_string());
    }

    /// Make `list_events` fail, as if the backend were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Make `verify` fail, as if the calendar id did not resolve.
    pub fn set_unresolved(&self, unresolved: bool) {
        self.state().unresolved = unresolved;
    }
}

#[async_trait]
impl CalendarStore for MemoryCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    async fn verify(&self) -> CalMirrorResult<()> {
        if self.state().unresolved {
            return Err(CalMirrorError::CalendarNotFound(self.name.clone()));
        }
        Ok(())
    }

    async fn list_events(&self, window: &SyncWindow) -> CalMirrorResult<Vec<Event>> {
        let state = self.state();
        if state.unreachable {
            return Err(CalMirrorError::Store(format!("{} is unreachable", self.name)));
        }

        let mut events: Vec<Event> = state
            .events
            .iter()
            .filter(|e| window.overlaps(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }

    async fn create_event(&self, new: &NewEvent) -> CalMirrorResult<Event> {
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title.clone(),
            start: new.start,
            end: new.end,
            description: new.description.clone(),
            location: new.location.clone(),
            all_day: false,
            color: new.color,
        };

        let mut state = self.state();
        state.events.push(event.clone());
        state.journal.push(Mutation::Created(event.clone()));
        Ok(event)
    }

    async fn update_event(&self, event: &Event, patch: &EventPatch) -> CalMirrorResult<Event> {
        let mut state = self.state();
        if state.failing_ids.contains(&event.id) {
            return Err(CalMirrorError::Store(format!("update of {} rejected", event.id)));
        }

        let stored = state
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| CalMirrorError::Store(format!("event {} not found", event.id)))?;

        let before = stored.clone();
        patch.apply_to(stored);
        let after = stored.clone();

        state.journal.push(Mutation::Updated {
            before,
            after: after.clone(),
        });
        Ok(after)
    }

    async fn delete_event(&self, event: &Event) -> CalMirrorResult<()> {
        let mut state = self.state();
        if state.failing_ids.contains(&event.id) {
            return Err(CalMirrorError::Store(format!("delete of {} rejected", event.id)));
        }

        let idx = state
            .events
            .iter()
            .position(|e| e.id == event.id)
            .ok_or_else(|| CalMirrorError::Store(format!("event {} not found", event.id)))?;

        let removed = state.events.remove(idx);
        state.journal.push(Mutation::Deleted(removed));
        Ok(())
    }
}

//! The calendar store seam.
//!
//! The mirror never owns events. Everything it reads or writes goes through
//! a [`CalendarStore`], one per calendar.

use async_trait::async_trait;

use crate::error::CalMirrorResult;
use crate::event::{Event, EventPatch, NewEvent};
use crate::window::SyncWindow;

#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Human-readable calendar name, used in logs and reports.
    fn name(&self) -> &str;

    /// Check that the calendar identity resolves. An error here is a
    /// configuration error.
    async fn verify(&self) -> CalMirrorResult<()>;

    /// Events overlapping `window`, all-day events included.
    async fn list_events(&self, window: &SyncWindow) -> CalMirrorResult<Vec<Event>>;

    /// Create an event; the store assigns its id.
    async fn create_event(&self, event: &NewEvent) -> CalMirrorResult<Event>;

    async fn update_event(&self, event: &Event, patch: &EventPatch) -> CalMirrorResult<Event>;

    /// Delete an event. Fails if it no longer exists.
    async fn delete_event(&self, event: &Event) -> CalMirrorResult<()>;
}

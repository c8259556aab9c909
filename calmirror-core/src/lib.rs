//! Core library for calmirror.
//!
//! Mirrors timed events between two calendars as tagged copies:
//! - `copy_tag`, `matcher` and `orphans` decide what a copy is and whether it
//!   is still justified
//! - `reconcile` plans and applies one direction over one day
//! - `driver` runs both directions over the configured horizon
//! - `store` is the calendar seam, implemented by `remote` (provider
//!   binaries) and `memory`

pub mod config;
pub mod copy_tag;
pub mod driver;
pub mod error;
pub mod event;
pub mod matcher;
pub mod memory;
pub mod orphans;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod store;
pub mod window;

pub use driver::{SyncOptions, synchronize};
pub use error::{CalMirrorError, CalMirrorResult};
pub use event::{Event, EventColor, EventPatch, NewEvent};
pub use store::CalendarStore;

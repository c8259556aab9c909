//! One directional pass: mirror a source window onto a target window.
//!
//! A pass is computed as a [`PassPlan`] from the two event lists, then
//! applied against the target store. Planning is pure; applying is the only
//! step that writes, and it can only write to [`CopyEvent`]s, which the
//! planner builds exclusively from events classified as copies.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::copy_tag::{self, Classified};
use crate::error::CalMirrorResult;
use crate::event::{Event, EventColor, EventPatch, NewEvent};
use crate::matcher::{is_natural_match, needs_refresh};
use crate::orphans::collect_orphans;
use crate::report::{ActionKind, ActionRecord, PassReport};
use crate::store::CalendarStore;
use crate::window::SyncWindow;

/// A target event known to carry a copy tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyEvent(Event);

impl CopyEvent {
    fn from_classified(classified: &Classified) -> Option<Self> {
        classified
            .is_copy()
            .then(|| CopyEvent(classified.event.clone()))
    }

    pub fn event(&self) -> &Event {
        &self.0
    }
}

/// Why a copy is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    /// Source deleted or moved out of the window.
    Orphaned,
    /// Tag has no recoverable source id.
    MalformedTag,
    /// Another copy of the same source is kept.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CopyAction {
    /// Source already exists on the target by title and time.
    Skip { source: Event },
    Create { source_id: String, event: NewEvent },
    Update {
        source_id: String,
        copy: CopyEvent,
        patch: EventPatch,
    },
    Delete { copy: CopyEvent, reason: DeleteReason },
}

impl CopyAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            CopyAction::Skip { .. } => ActionKind::Skipped,
            CopyAction::Create { .. } => ActionKind::Created,
            CopyAction::Update { .. } => ActionKind::Updated,
            CopyAction::Delete { .. } => ActionKind::Deleted,
        }
    }

    /// Log record for this action as planned (no store involved).
    fn planned_record(&self) -> ActionRecord {
        match self {
            CopyAction::Skip { source } => ActionRecord {
                kind: ActionKind::Skipped,
                title: source.title.clone(),
                event_id: None,
                source_id: Some(source.id.clone()),
                error: None,
            },
            CopyAction::Create { source_id, event } => ActionRecord {
                kind: ActionKind::Created,
                title: event.title.clone(),
                event_id: None,
                source_id: Some(source_id.clone()),
                error: None,
            },
            CopyAction::Update {
                source_id,
                copy,
                patch,
            } => ActionRecord {
                kind: ActionKind::Updated,
                title: patch.title.clone().unwrap_or_else(|| copy.event().title.clone()),
                event_id: Some(copy.event().id.clone()),
                source_id: Some(source_id.clone()),
                error: None,
            },
            CopyAction::Delete { copy, .. } => ActionRecord {
                kind: ActionKind::Deleted,
                title: copy.event().title.clone(),
                event_id: Some(copy.event().id.clone()),
                source_id: copy_tag::decode_source_id(&copy.event().title).map(str::to_string),
                error: None,
            },
        }
    }
}

/// Everything one pass will do, deletions first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassPlan {
    pub actions: Vec<CopyAction>,
}

impl PassPlan {
    /// Plan a pass from the events of one window on each side.
    ///
    /// All-day events on either side are ignored. Source events that are
    /// themselves copies are never mirrored.
    pub fn from_events(source_events: &[Event], target_events: &[Event], copy_color: EventColor) -> Self {
        let sources: Vec<Classified> = timed(source_events);
        let targets: Vec<Classified> = timed(target_events);

        let originals: Vec<Event> = sources
            .into_iter()
            .filter(|s| !s.is_copy())
            .map(|s| s.event)
            .collect();
        let target_copies: Vec<Classified> = targets.iter().filter(|t| t.is_copy()).cloned().collect();

        let mut deletes = Vec::new();
        let mut removed: HashSet<&str> = HashSet::new();

        for orphan in collect_orphans(&target_copies, &originals) {
            let reason = match orphan.source_id() {
                Some(_) => DeleteReason::Orphaned,
                None => DeleteReason::MalformedTag,
            };
            if let Some(copy) = CopyEvent::from_classified(orphan) {
                removed.insert(orphan.event.id.as_str());
                deletes.push(CopyAction::Delete { copy, reason });
            }
        }

        // Keep one copy per source id; the rest are duplicates.
        let mut kept_sources: HashSet<&str> = HashSet::new();
        for copy in &target_copies {
            if removed.contains(copy.event.id.as_str()) {
                continue;
            }
            let Some(source_id) = copy.source_id() else {
                continue;
            };
            if !kept_sources.insert(source_id) {
                if let Some(dup) = CopyEvent::from_classified(copy) {
                    removed.insert(copy.event.id.as_str());
                    deletes.push(CopyAction::Delete {
                        copy: dup,
                        reason: DeleteReason::Duplicate,
                    });
                }
            }
        }

        let mut writes = Vec::new();
        for source in &originals {
            if targets.iter().any(|t| is_natural_match(source, &t.event)) {
                writes.push(CopyAction::Skip {
                    source: source.clone(),
                });
                continue;
            }

            let existing = target_copies
                .iter()
                .filter(|c| !removed.contains(c.event.id.as_str()))
                .find(|c| c.source_id() == Some(source.id.as_str()));

            match existing {
                None => writes.push(CopyAction::Create {
                    source_id: source.id.clone(),
                    event: new_copy_of(source, copy_color),
                }),
                Some(found) if needs_refresh(&found.event, source) => {
                    if let Some(copy) = CopyEvent::from_classified(found) {
                        writes.push(CopyAction::Update {
                            source_id: source.id.clone(),
                            copy,
                            patch: refresh_patch(source, copy_color),
                        });
                    }
                }
                Some(_) => {}
            }
        }

        deletes.extend(writes);
        PassPlan { actions: deletes }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of store writes this plan would issue.
    pub fn write_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind().is_write())
            .count()
    }

    /// Action log for the plan without touching any store.
    pub fn preview(&self, source: &str, target: &str) -> PassReport {
        let mut report = PassReport::new(source, target);
        for action in &self.actions {
            report.push(action.planned_record());
        }
        report
    }

    /// Issue the planned writes against `target`, one at a time.
    ///
    /// A failing write is logged and recorded; the remaining actions still
    /// run.
    pub async fn apply(&self, source: &str, target: &dyn CalendarStore) -> PassReport {
        let mut report = PassReport::new(source, target.name());

        for action in &self.actions {
            let mut record = action.planned_record();

            let result = match action {
                CopyAction::Skip { source: skipped } => {
                    debug!(title = %skipped.title, "Already present on {}, skipping", target.name());
                    Ok(())
                }
                CopyAction::Create { event, .. } => target.create_event(event).await.map(|created| {
                    record.event_id = Some(created.id);
                    info!(title = %event.title, calendar = target.name(), "Created copy");
                }),
                CopyAction::Update { copy, patch, .. } => {
                    target.update_event(copy.event(), patch).await.map(|_| {
                        info!(title = %record.title, calendar = target.name(), "Updated copy");
                    })
                }
                CopyAction::Delete { copy, reason } => target.delete_event(copy.event()).await.map(|_| {
                    info!(title = %copy.event().title, calendar = target.name(), ?reason, "Deleted copy");
                }),
            };

            if let Err(e) = result {
                warn!(title = %record.title, calendar = target.name(), error = %e, "Failed to {} copy", verb(action));
                record.kind = ActionKind::Failed;
                record.error = Some(e.to_string());
            }

            report.push(record);
        }

        report
    }
}

/// Settings for a directional pass.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    pub copy_color: EventColor,
    pub dry_run: bool,
}

impl Reconciler {
    pub fn new(copy_color: EventColor) -> Self {
        Reconciler {
            copy_color,
            dry_run: false,
        }
    }

    pub fn plan(&self, source_events: &[Event], target_events: &[Event]) -> PassPlan {
        PassPlan::from_events(source_events, target_events, self.copy_color)
    }

    /// Read both sides of `window` and mirror `source` onto `target`.
    ///
    /// Errors only when either side cannot be listed; in that case nothing
    /// was written.
    pub async fn run(
        &self,
        source: &dyn CalendarStore,
        target: &dyn CalendarStore,
        window: &SyncWindow,
    ) -> CalMirrorResult<PassReport> {
        let source_events = source.list_events(window).await?;
        let target_events = target.list_events(window).await?;

        let plan = self.plan(&source_events, &target_events);

        if self.dry_run {
            return Ok(plan.preview(source.name(), target.name()));
        }
        Ok(plan.apply(source.name(), target).await)
    }
}

fn timed(events: &[Event]) -> Vec<Classified> {
    events
        .iter()
        .filter(|e| !e.all_day)
        .cloned()
        .map(Classified::new)
        .collect()
}

fn new_copy_of(source: &Event, color: EventColor) -> NewEvent {
    NewEvent {
        title: copy_tag::copy_title_for(source),
        start: source.start,
        end: source.end,
        description: source.description.clone(),
        location: source.location.clone(),
        color: Some(color),
    }
}

/// Overwrite every mirrored field, re-encoding the title.
fn refresh_patch(source: &Event, color: EventColor) -> EventPatch {
    EventPatch {
        title: Some(copy_tag::copy_title_for(source)),
        start: Some(source.start),
        end: Some(source.end),
        description: Some(source.description.clone()),
        location: Some(source.location.clone()),
        color: Some(color),
    }
}

fn verb(action: &CopyAction) -> &'static str {
    match action {
        CopyAction::Skip { .. } => "skip",
        CopyAction::Create { .. } => "create",
        CopyAction::Update { .. } => "update",
        CopyAction::Delete { .. } => "delete",
    }
}

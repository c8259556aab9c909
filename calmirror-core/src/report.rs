//! Action log produced by a sync run.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Created,
    Updated,
    Deleted,
    /// Source already present on the target by title and time.
    Skipped,
    /// A store write failed; retried on the next run.
    Failed,
}

impl ActionKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ActionKind::Created => "+",
            ActionKind::Updated => "~",
            ActionKind::Deleted => "-",
            ActionKind::Skipped => "=",
            ActionKind::Failed => "!",
        }
    }

    /// Whether this action wrote to a calendar.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ActionKind::Created | ActionKind::Updated | ActionKind::Deleted
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Created => "created",
            ActionKind::Updated => "updated",
            ActionKind::Deleted => "deleted",
            ActionKind::Skipped => "skipped",
            ActionKind::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One line of the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    /// Title of the event acted on (the copy title for writes to copies).
    pub title: String,
    /// Target-side event id, when one exists.
    pub event_id: Option<String>,
    /// Source event id the action was on behalf of.
    pub source_id: Option<String>,
    /// Store error message for failed actions.
    pub error: Option<String>,
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.title)?;
        if let Some(error) = &self.error {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}

/// Outcome of one directional pass over one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub source: String,
    pub target: String,
    pub actions: Vec<ActionRecord>,
    /// Set when the pass could not run (listing failed).
    pub error: Option<String>,
}

impl PassReport {
    pub fn new(source: &str, target: &str) -> Self {
        PassReport {
            source: source.to_string(),
            target: target.to_string(),
            actions: Vec::new(),
            error: None,
        }
    }

    pub fn push(&mut self, record: ActionRecord) {
        self.actions.push(record);
    }
}

/// Both passes over one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub date: NaiveDate,
    pub passes: Vec<PassReport>,
}

impl WindowReport {
    pub fn actions(&self) -> impl Iterator<Item = &ActionRecord> {
        self.passes.iter().flat_map(|p| &p.actions)
    }
}

/// Per-kind totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ActionCounts {
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Created => self.created += 1,
            ActionKind::Updated => self.updated += 1,
            ActionKind::Deleted => self.deleted += 1,
            ActionKind::Skipped => self.skipped += 1,
            ActionKind::Failed => self.failed += 1,
        }
    }

    pub fn writes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    pub fn has_changes(&self) -> bool {
        self.writes() > 0
    }
}

/// Full result of a `synchronize` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub windows: Vec<WindowReport>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn actions(&self) -> impl Iterator<Item = &ActionRecord> {
        self.windows.iter().flat_map(|w| w.actions())
    }

    pub fn counts(&self) -> ActionCounts {
        let mut counts = ActionCounts::default();
        for action in self.actions() {
            counts.record(action.kind);
        }
        counts
    }

    /// Windows whose listing failed in at least one direction.
    pub fn incomplete_windows(&self) -> impl Iterator<Item = &WindowReport> {
        self.windows
            .iter()
            .filter(|w| w.passes.iter().any(|p| p.error.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: ActionKind, title: &str) -> ActionRecord {
        ActionRecord {
            kind,
            title: title.to_string(),
            event_id: None,
            source_id: None,
            error: None,
        }
    }

    #[test]
    fn test_counts_across_windows() {
        let mut pass = PassReport::new("a", "b");
        pass.push(record(ActionKind::Created, "x"));
        pass.push(record(ActionKind::Skipped, "y"));
        let mut back = PassReport::new("b", "a");
        back.push(record(ActionKind::Deleted, "z"));
        back.push(record(ActionKind::Failed, "w"));

        let report = SyncReport {
            windows: vec![WindowReport {
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                passes: vec![pass, back],
            }],
            dry_run: false,
        };

        let counts = report.counts();
        assert_eq!(counts.created, 1);
        assert_eq!(counts.deleted, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.writes(), 2);
        assert!(counts.has_changes());
    }

    #[test]
    fn test_record_display() {
        let mut r = record(ActionKind::Failed, "[COPY] Lunch [ID: s1]");
        r.error = Some("not found".into());
        assert_eq!(r.to_string(), "! [COPY] Lunch [ID: s1] (not found)");
    }

    #[test]
    fn test_only_writes_count_as_changes() {
        let mut counts = ActionCounts::default();
        counts.record(ActionKind::Skipped);
        counts.record(ActionKind::Failed);
        assert!(!counts.has_changes());
        assert!(!ActionKind::Failed.is_write());
    }
}

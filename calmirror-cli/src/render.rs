//! TUI rendering traits for calmirror types.
//!
//! Extension traits that add colored terminal rendering to calmirror-core
//! report types using owo_colors.

use calmirror_core::report::{ActionCounts, ActionKind, ActionRecord, PassReport, SyncReport, WindowReport};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Rendering that switches between a full and a compact view.
pub trait RenderVerbose {
    fn render(&self, verbose: bool) -> String;
}

fn colorize(kind: ActionKind, text: &str) -> String {
    match kind {
        ActionKind::Created => text.green().to_string(),
        ActionKind::Updated => text.yellow().to_string(),
        ActionKind::Deleted => text.red().to_string(),
        ActionKind::Skipped => text.dimmed().to_string(),
        ActionKind::Failed => text.bright_red().to_string(),
    }
}

impl Render for ActionKind {
    fn render(&self) -> String {
        colorize(*self, self.symbol())
    }
}

impl Render for ActionRecord {
    fn render(&self) -> String {
        let title = colorize(self.kind, &self.title);
        match &self.error {
            Some(error) => format!("{} {} {}", self.kind.render(), title, error.dimmed()),
            None => format!("{} {}", self.kind.render(), title),
        }
    }
}

/// Above this many writes a pass shows counts instead of individual events.
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(count: usize) -> &'static str {
    if count == 1 { "event" } else { "events" }
}

fn render_action_list(actions: &[ActionRecord], verbose: bool, lines: &mut Vec<String>) {
    let shown: Vec<&ActionRecord> = actions
        .iter()
        .filter(|a| verbose || a.kind != ActionKind::Skipped)
        .collect();

    if verbose || shown.len() <= COMPACT_THRESHOLD {
        for action in shown {
            lines.push(format!("      {}", action.render()));
        }
        return;
    }

    let mut counts = ActionCounts::default();
    for action in &shown {
        counts.record(action.kind);
    }

    let groups = [
        (ActionKind::Created, counts.created, "new"),
        (ActionKind::Updated, counts.updated, "refreshed"),
        (ActionKind::Deleted, counts.deleted, "removed"),
        (ActionKind::Failed, counts.failed, "failed"),
    ];
    for (kind, count, label) in groups {
        if count > 0 {
            let text = format!("({} {} {})", count, label, pluralize(count));
            lines.push(format!("      {} {}", kind.render(), colorize(kind, &text)));
        }
    }
}

impl RenderVerbose for PassReport {
    fn render(&self, verbose: bool) -> String {
        let header = format!("   {} → {}", self.source, self.target).dimmed().to_string();

        if let Some(error) = &self.error {
            return format!("{}\n      {}", header, error.red());
        }

        let mut lines = Vec::new();
        render_action_list(&self.actions, verbose, &mut lines);
        if lines.is_empty() {
            lines.push("      No changes".dimmed().to_string());
        }

        format!("{}\n{}", header, lines.join("\n"))
    }
}

impl RenderVerbose for WindowReport {
    fn render(&self, verbose: bool) -> String {
        let mut lines = vec![format!("📅 {}", self.date.format("%a %Y-%m-%d")).bold().to_string()];
        lines.extend(self.passes.iter().map(|p| p.render(verbose)));
        lines.join("\n")
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let counts = self.counts();
        let verb = if self.dry_run { "Would sync" } else { "Synced" };

        if !counts.has_changes() && counts.failed == 0 && self.incomplete_windows().next().is_none() {
            return format!("{} {} days: already in sync", verb, self.windows.len())
                .dimmed()
                .to_string();
        }

        let mut lines = vec![format!(
            "{} {} {}: {} created, {} updated, {} deleted",
            verb,
            self.windows.len(),
            if self.windows.len() == 1 { "day" } else { "days" },
            counts.created,
            counts.updated,
            counts.deleted,
        )];

        if counts.failed > 0 {
            lines.push(
                format!(
                    "{} {} failed, will be retried on the next run",
                    counts.failed,
                    pluralize(counts.failed)
                )
                .red()
                .to_string(),
            );
        }

        let incomplete: Vec<String> = self
            .incomplete_windows()
            .map(|w| w.date.to_string())
            .collect();
        if !incomplete.is_empty() {
            lines.push(
                format!("Skipped (calendar unreachable): {}", incomplete.join(", "))
                    .yellow()
                    .to_string(),
            );
        }

        lines.join("\n")
    }
}

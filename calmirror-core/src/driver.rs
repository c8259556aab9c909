//! Runs both directions over every day of the horizon.

use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::error::CalMirrorResult;
use crate::event::EventColor;
use crate::reconcile::Reconciler;
use crate::report::{PassReport, SyncReport, WindowReport};
use crate::store::CalendarStore;
use crate::window::{SyncWindow, day_windows, today_in};

/// Number of days mirrored when nothing else is configured.
pub const DEFAULT_SYNC_DAYS: u32 = 30;

/// Pause between windows, for the store's rate limits.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

/// Everything a run needs besides the two calendars.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub horizon_days: u32,
    pub pause: Duration,
    pub copy_color: EventColor,
    /// Time zone that defines day boundaries.
    pub timezone: Tz,
    /// First day to mirror; today in `timezone` when unset.
    pub start_date: Option<NaiveDate>,
    /// Plan only; issue no writes.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            horizon_days: DEFAULT_SYNC_DAYS,
            pause: DEFAULT_PAUSE,
            copy_color: EventColor::Gray,
            timezone: Tz::UTC,
            start_date: None,
            dry_run: false,
        }
    }
}

impl SyncOptions {
    pub fn windows(&self) -> CalMirrorResult<Vec<SyncWindow>> {
        let first = self.start_date.unwrap_or_else(|| today_in(self.timezone));
        day_windows(first, self.horizon_days, self.timezone)
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler {
            copy_color: self.copy_color,
            dry_run: self.dry_run,
        }
    }
}

/// Mirror `calendar_a` and `calendar_b` onto each other.
///
/// Both calendars are verified before any window is read; a calendar that
/// does not resolve aborts the run. After that, per-item failures end up in
/// the report and the run always covers the whole horizon.
pub async fn synchronize(
    calendar_a: &dyn CalendarStore,
    calendar_b: &dyn CalendarStore,
    options: &SyncOptions,
) -> CalMirrorResult<SyncReport> {
    synchronize_with_progress(calendar_a, calendar_b, options, |_, _| {}).await
}

/// Like [`synchronize`], calling `on_window` after each window completes.
pub async fn synchronize_with_progress<F>(
    calendar_a: &dyn CalendarStore,
    calendar_b: &dyn CalendarStore,
    options: &SyncOptions,
    mut on_window: F,
) -> CalMirrorResult<SyncReport>
where
    F: FnMut(&SyncWindow, &WindowReport),
{
    calendar_a.verify().await?;
    calendar_b.verify().await?;

    let windows = options.windows()?;
    let reconciler = options.reconciler();
    let mut report = SyncReport {
        windows: Vec::with_capacity(windows.len()),
        dry_run: options.dry_run,
    };

    for (i, window) in windows.iter().enumerate() {
        let a_to_b = run_pass(&reconciler, calendar_a, calendar_b, window).await?;
        let b_to_a = run_pass(&reconciler, calendar_b, calendar_a, window).await?;

        let window_report = WindowReport {
            date: window.date,
            passes: vec![a_to_b, b_to_a],
        };
        on_window(window, &window_report);
        report.windows.push(window_report);

        if i + 1 < windows.len() && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }
    }

    let counts = report.counts();
    info!(
        created = counts.created,
        updated = counts.updated,
        deleted = counts.deleted,
        failed = counts.failed,
        "Synchronization completed."
    );

    Ok(report)
}

/// One direction over one window. A listing failure skips the pass unless
/// it is fatal.
async fn run_pass(
    reconciler: &Reconciler,
    source: &dyn CalendarStore,
    target: &dyn CalendarStore,
    window: &SyncWindow,
) -> CalMirrorResult<PassReport> {
    match reconciler.run(source, target, window).await {
        Ok(pass) => Ok(pass),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(
                window = %window,
                source = source.name(),
                target = target.name(),
                error = %e,
                "Could not list events, skipping pass"
            );
            let mut pass = PassReport::new(source.name(), target.name());
            pass.error = Some(e.to_string());
            Ok(pass)
        }
    }
}

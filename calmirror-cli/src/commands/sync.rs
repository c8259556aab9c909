use std::path::Path;

use anyhow::{Context, Result};
use calmirror_core::CalendarStore;
use calmirror_core::config::MirrorConfig;
use calmirror_core::driver::synchronize_with_progress;
use calmirror_core::window::parse_date;
use owo_colors::OwoColorize;
use tracing::info;

use crate::render::{Render, RenderVerbose};
use crate::utils::tui;

/// Command-line overrides on top of the config file.
pub struct SyncArgs {
    pub days: Option<u32>,
    pub from: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

pub async fn run(config_path: Option<&Path>, args: SyncArgs) -> Result<()> {
    let config = MirrorConfig::load(config_path).context("Failed to load config")?;
    let (a, b) = config.calendar_pair()?;

    let mut options = config.sync_options()?;
    if let Some(days) = args.days {
        options.horizon_days = days;
    }
    if let Some(from) = args.from.as_deref() {
        options.start_date = Some(parse_date(from)?);
    }
    options.dry_run = args.dry_run;

    info!(
        from = %a.name(),
        to = %b.name(),
        days = options.horizon_days,
        dry_run = options.dry_run,
        "Starting sync"
    );

    if options.dry_run {
        println!("{}\n", "Dry run: nothing will be written".yellow());
    }

    let spinner = tui::create_spinner(format!("{} ⇄ {}", a.name(), b.name()));
    let result = synchronize_with_progress(&a, &b, &options, |_, window| {
        spinner.suspend(|| println!("{}\n", window.render(args.verbose)));
    })
    .await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.render());

    Ok(())
}

use std::path::Path;

use anyhow::Result;
use calmirror_core::CalendarStore;
use calmirror_core::config::MirrorConfig;
use owo_colors::OwoColorize;

use crate::utils::tui;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = MirrorConfig::load(config_path)?;
    let (a, b) = config.calendar_pair()?;

    let mut failed = Vec::new();
    for calendar in [&a, &b] {
        let spinner = tui::create_spinner(format!("📅 {}", calendar.name()));
        let result = calendar.verify().await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => println!("📅 {} {}", calendar.name(), "ok".green()),
            Err(e) => {
                println!("📅 {} {}", calendar.name(), e.to_string().red());
                failed.push(calendar.name().to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Could not reach: {}", failed.join(", "));
    }

    Ok(())
}

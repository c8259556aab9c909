use anyhow::Result;
use calmirror_core::config::MirrorConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = MirrorConfig::config_path()?;
    let created = !config_path.exists();
    if created {
        MirrorConfig::create_default_config(&config_path)?;
    }

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    if created {
        println!("  {}", "Created a default config; add [calendars.a] and [calendars.b] to start.".dimmed());
    }

    Ok(())
}

//! calmirror configuration.
//!
//! Lives at `~/.config/calmirror/config.toml`. Values can be overridden with
//! `CALMIRROR_`-prefixed environment variables (e.g. `CALMIRROR_SYNC_DAYS`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

use crate::driver::{DEFAULT_SYNC_DAYS, SyncOptions};
use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::EventColor;
use crate::remote::Remote;
use crate::window::parse_timezone;

/// Config keys of the two mirrored calendars.
pub const CALENDAR_A: &str = "a";
pub const CALENDAR_B: &str = "b";

fn default_sync_days() -> u32 {
    DEFAULT_SYNC_DAYS
}

fn default_pause() -> String {
    "500ms".to_string()
}

fn default_copy_color() -> String {
    EventColor::Gray.to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MirrorConfig {
    /// Number of days to mirror, starting today.
    #[serde(default = "default_sync_days")]
    pub sync_days: u32,

    /// Pause between days, e.g. "500ms" or "2s".
    #[serde(default = "default_pause")]
    pub pause: String,

    /// Color applied to copies.
    #[serde(default = "default_copy_color")]
    pub copy_color: String,

    /// IANA time zone defining day boundaries.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub calendars: BTreeMap<String, Remote>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        MirrorConfig {
            sync_days: default_sync_days(),
            pause: default_pause(),
            copy_color: default_copy_color(),
            timezone: default_timezone(),
            calendars: BTreeMap::new(),
        }
    }
}

impl MirrorConfig {
    pub fn config_path() -> CalMirrorResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalMirrorError::Config("Could not determine config directory".into()))?
            .join("calmirror");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file is created with every option commented out;
    /// a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> CalMirrorResult<Self> {
        let path = match path {
            Some(p) => {
                let expanded = PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned());
                if !expanded.exists() {
                    return Err(CalMirrorError::Config(format!(
                        "Config file not found: {}",
                        expanded.display()
                    )));
                }
                expanded
            }
            None => {
                let default_path = Self::config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                }
                default_path
            }
        };

        Self::load_from(&path, None)
    }

    /// Layer `path` under `CALMIRROR_` variables, read from `env` when given
    /// instead of the process environment.
    fn load_from(path: &Path, env: Option<Map<String, String>>) -> CalMirrorResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CALMIRROR")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| CalMirrorError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalMirrorError::Config(e.to_string()))
    }

    /// The configured calendar under `key`, named after the key unless the
    /// config gives it a name.
    pub fn calendar(&self, key: &str) -> CalMirrorResult<Remote> {
        let remote = self.calendars.get(key).cloned().ok_or_else(|| {
            CalMirrorError::CalendarNotFound(format!(
                "No [calendars.{key}] section in the config"
            ))
        })?;

        if remote.name.is_some() {
            Ok(remote)
        } else {
            Ok(remote.with_name(key))
        }
    }

    /// Both mirrored calendars, in (a, b) order.
    pub fn calendar_pair(&self) -> CalMirrorResult<(Remote, Remote)> {
        Ok((self.calendar(CALENDAR_A)?, self.calendar(CALENDAR_B)?))
    }

    pub fn pause_duration(&self) -> CalMirrorResult<Duration> {
        humantime::parse_duration(&self.pause)
            .map_err(|e| CalMirrorError::Config(format!("Invalid pause '{}': {}", self.pause, e)))
    }

    pub fn copy_color(&self) -> CalMirrorResult<EventColor> {
        self.copy_color.parse().map_err(CalMirrorError::Config)
    }

    pub fn sync_options(&self) -> CalMirrorResult<SyncOptions> {
        Ok(SyncOptions {
            horizon_days: self.sync_days,
            pause: self.pause_duration()?,
            copy_color: self.copy_color()?,
            timezone: parse_timezone(&self.timezone)?,
            start_date: None,
            dry_run: false,
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalMirrorResult<()> {
        let contents = format!(
            "\
# calmirror configuration

# Days to mirror, starting today:
# sync_days = {DEFAULT_SYNC_DAYS}

# Pause between days (rate limits):
# pause = \"500ms\"

# Color for copies:
# copy_color = \"gray\"

# Time zone for day boundaries:
# timezone = \"UTC\"

# The two calendars to mirror. Every key besides `provider` and `name`
# is passed to the provider binary (calmirror-provider-<provider>).
#
# [calendars.a]
# provider = \"google\"
# name = \"work\"
# google_account = \"me@example.com\"
# google_calendar_id = \"work@group.calendar.google.com\"
#
# [calendars.b]
# provider = \"google\"
# name = \"home\"
# google_account = \"me@example.com\"
# google_calendar_id = \"home@group.calendar.google.com\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalMirrorError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalMirrorError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CalendarStore;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_full_config() {
        let (_dir, path) = write_config(
            r#"
sync_days = 14
pause = "2s"
copy_color = "graphite"
timezone = "Europe/Berlin"

[calendars.a]
provider = "google"
name = "work"
google_calendar_id = "work@group.calendar.google.com"

[calendars.b]
provider = "caldav"
url = "https://dav.example.com/home/"
"#,
        );

        let config = MirrorConfig::load(Some(&path)).unwrap();
        let options = config.sync_options().unwrap();
        assert_eq!(options.horizon_days, 14);
        assert_eq!(options.pause, Duration::from_secs(2));
        assert_eq!(options.copy_color, EventColor::Gray);
        assert_eq!(options.timezone, chrono_tz::Europe::Berlin);

        let (a, b) = config.calendar_pair().unwrap();
        assert_eq!(a.name(), "work");
        assert_eq!(b.name(), "b");
        assert_eq!(b.provider.name(), "caldav");
    }

    #[test]
    fn test_defaults_apply() {
        let (_dir, path) = write_config("");
        let config = MirrorConfig::load(Some(&path)).unwrap();
        let options = config.sync_options().unwrap();
        assert_eq!(options.horizon_days, 30);
        assert_eq!(options.pause, Duration::from_millis(500));
        assert_eq!(options.copy_color, EventColor::Gray);
    }

    #[test]
    fn test_env_overrides() {
        let (_dir, path) = write_config(
            r#"
sync_days = 14
pause = "500ms"
copy_color = "blue"
"#,
        );
        let env = Map::from([
            ("CALMIRROR_SYNC_DAYS".to_string(), "7".to_string()),
            ("CALMIRROR_PAUSE".to_string(), "2s".to_string()),
            ("OTHER_SYNC_DAYS".to_string(), "99".to_string()),
        ]);

        let config = MirrorConfig::load_from(&path, Some(env)).unwrap();
        assert_eq!(config.sync_days, 7);
        assert_eq!(config.pause_duration().unwrap(), Duration::from_secs(2));
        assert_eq!(config.copy_color().unwrap(), EventColor::Blue);
    }

    #[test]
    fn test_missing_calendar_is_config_error() {
        let (_dir, path) = write_config(
            r#"
[calendars.a]
provider = "google"
"#,
        );
        let config = MirrorConfig::load(Some(&path)).unwrap();
        let err = config.calendar_pair().unwrap_err();
        assert!(matches!(err, CalMirrorError::CalendarNotFound(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = MirrorConfig {
            timezone: "Nowhere/Special".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.sync_options(),
            Err(CalMirrorError::InvalidTimezone(_))
        ));

        let config = MirrorConfig {
            pause: "soon".into(),
            ..Default::default()
        };
        assert!(config.pause_duration().is_err());

        let config = MirrorConfig {
            copy_color: "magenta".into(),
            ..Default::default()
        };
        assert!(config.copy_color().is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = MirrorConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(CalMirrorError::Config(_))));
    }

    #[test]
    fn test_default_config_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        MirrorConfig::create_default_config(&path).unwrap();

        let config = MirrorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sync_days, 30);
        assert!(config.calendars.is_empty());
    }
}

//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use recur_core::ScheduleDef;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA time zone occurrences are computed and shown in.
    pub timezone: String,

    /// Default number of occurrences to preview.
    pub count: usize,

    /// The schedule to preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleDef>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("timezone", &self.timezone)
            .field("count", &self.count)
            .field("schedule", &self.schedule.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            count: 5,
            schedule: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default location, then `config_path` if
    /// given, then `RECUR_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // RECUR_TIMEZONE, RECUR_COUNT
        figment = figment.merge(Env::prefixed("RECUR_"));

        figment.extract()
    }

    /// Resolves the configured time zone.
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow!("unknown time zone: {}", self.timezone))
    }

    /// Returns the configured schedule, or an error explaining how to add one.
    pub fn schedule(&self) -> anyhow::Result<&ScheduleDef> {
        self.schedule.as_ref().ok_or_else(|| {
            anyhow!("no schedule configured; add a [schedule] table to config.toml")
        })
    }
}

/// Returns the platform-specific config directory for recur.
///
/// On Linux: `~/.config/recur`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("recur"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use recur_core::Cutoff;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_recur() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "recur");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.count, 5);
        assert!(config.schedule.is_none());
        assert_eq!(config.tz().unwrap(), Tz::UTC);
    }

    #[test]
    fn test_tz_rejects_unknown_zone() {
        let config = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        let err = config.tz().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_missing_schedule_is_an_error() {
        let err = Config::default().schedule().unwrap_err();
        assert!(err.to_string().contains("no schedule configured"));
    }

    #[test]
    fn test_load_from_file_with_nested_schedule() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
timezone = "Europe/Berlin"
count = 3

[schedule]
kind = "on_or_before"
cutoff = "21:15"

[schedule.inner]
kind = "sunset"
latitude = 52.52
longitude = 13.405
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.count, 3);
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(
            config.schedule,
            Some(ScheduleDef::OnOrBefore {
                cutoff: Cutoff::new(21, 15).unwrap(),
                inner: Box::new(ScheduleDef::Sunset {
                    latitude: 52.52,
                    longitude: 13.405,
                }),
            })
        );
    }

    #[test]
    fn test_load_from_rejects_invalid_cutoff() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[schedule]
kind = "on_or_before"
cutoff = "7pm"

[schedule.inner]
kind = "random"
minimum_gap_secs = 60
expected_addition_secs = 60
"#,
        )
        .unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}

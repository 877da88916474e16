use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "PerkTracker";

/// User-level preferences for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Lead time applied to vouchers created without an explicit reminder.
    #[serde(default = "Config::default_reminder_days_value")]
    pub default_reminder_days: u32,
    /// When off, dashboards report no upcoming expirations.
    #[serde(default = "Config::default_reminders_enabled")]
    pub reminders_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for tracker data. Defaults to `~/Documents/PerkTracker`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// `tracing` filter directive, e.g. `perk_tracker=debug`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_reminder_days: Self::default_reminder_days_value(),
            reminders_enabled: Self::default_reminders_enabled(),
            data_root: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_reminder_days_value() -> u32 {
        7
    }

    pub fn default_reminders_enabled() -> bool {
        true
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DEFAULT_DATA_DIR)
    }
}

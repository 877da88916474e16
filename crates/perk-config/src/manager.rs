use std::{
    cmp::Reverse,
    fs::{self, File, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "perk-tracker";
const BACKUP_PREFIX: &str = "config";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";

/// Handles persistence and backup management for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE), backups_dir))
    }

    /// Uses the platform configuration directory, falling back to the home directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_dir(base.join(APP_DIR))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Returns defaults when no configuration has been saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        read_config(&self.config_path)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let tmp = tmp_path(&self.config_path);
        write_config(&tmp, config)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }

    /// Writes `config` to a new timestamped backup file and returns its name.
    ///
    /// Backups taken within the same second get increasing sequence numbers;
    /// an existing backup file is never overwritten.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let label = sanitize_note(note);
        let mut sequence = self.next_sequence(&stamp)?;
        loop {
            let name = backup_name(&stamp, sequence, label.as_deref());
            match write_new_config(&self.backups_dir.join(&name), config) {
                Ok(()) => return Ok(name),
                Err(ConfigError::Io(err)) if err.kind() == ErrorKind::AlreadyExists => {
                    sequence += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Makes the named backup the active configuration.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.is_file() {
            return Err(ConfigError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("configuration backup `{}` not found", backup_name),
            )));
        }
        let config = read_config(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by_cached_key(|name| Reverse((parse_timestamp(name), parse_sequence(name))));
        Ok(entries)
    }

    fn next_sequence(&self, stamp: &str) -> Result<u32, ConfigError> {
        let prefix = format!("{}_{}_", BACKUP_PREFIX, stamp);
        Ok(self
            .list_backups()?
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| parse_sequence(name) + 1)
            .max()
            .unwrap_or(1))
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = encode(config)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn write_new_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = encode(config)?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn encode(config: &Config) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn backup_name(stamp: &str, sequence: u32, label: Option<&str>) -> String {
    let mut stem = format!("{}_{}_{:03}", BACKUP_PREFIX, stamp, sequence);
    if let Some(label) = label {
        stem.push('_');
        stem.push_str(label);
    }
    format!("{}.{}", stem, BACKUP_EXTENSION)
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let mut sanitized = String::new();
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut segments = stem.split('_').skip(1);
    let date = segments.next()?;
    let time = segments.next()?;
    if date.len() != 8 || time.len() != 6 {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn parse_sequence(name: &str) -> u32 {
    name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))
        .and_then(|stem| stem.split('_').nth(3))
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_become_lowercase_slugs() {
        assert_eq!(sanitize_note(Some("Pre Upgrade v2")), Some("pre-upgrade-v2".into()));
        assert_eq!(sanitize_note(Some("   ")), None);
    }

    #[test]
    fn backup_names_carry_timestamp_and_sequence() {
        let name = backup_name("20250101_093000", 2, Some("note"));
        assert_eq!(name, "config_20250101_093000_002_note.json");
        assert!(parse_timestamp(&name).is_some());
        assert_eq!(parse_sequence(&name), 2);
        assert_eq!(parse_sequence("config_20250101_093000_001.json"), 1);
        assert_eq!(parse_sequence("config_20250101_093000.json"), 0);
        assert!(parse_timestamp("config.json").is_none());
    }
}

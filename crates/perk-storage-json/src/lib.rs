use std::{
    cmp::Reverse,
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use perk_core::{dataset_warnings, CoreError, TrackerDataset, TrackerStore};
use perk_domain::{
    Card, UserId, UserProfile, Voucher, VoucherPeriod, VoucherStatus, VoucherWithPeriods,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

const DATA_FILE: &str = "tracker.json";
const BACKUP_PREFIX: &str = "tracker";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Where the tracker document and its backups live.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// Places backups in a `backups` directory next to the data file.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let data_root = root.into();
        let backup_root = data_root.join("backups");
        Self {
            data_root,
            backup_root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerBackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Orders backups that share `created_at`.
    pub sequence: u32,
    pub path: PathBuf,
}

/// [`TrackerStore`] persisted as one pretty-printed JSON document.
///
/// Mutations are serialised through a mutex and follow load, apply, write.
/// Reads always go to the committed file.
#[derive(Debug)]
pub struct JsonTrackerStore {
    paths: StoragePaths,
    retention: usize,
    write_lock: Mutex<()>,
}

impl JsonTrackerStore {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        let store = Self {
            paths,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        };
        if store.data_path().exists() {
            for warning in dataset_warnings(&store.load()?) {
                warn!(%warning, "tracker data inconsistency");
            }
        }
        Ok(store)
    }

    pub fn data_path(&self) -> PathBuf {
        self.paths.data_root.join(DATA_FILE)
    }

    /// Reads the committed document; a missing file is an empty dataset.
    pub fn load(&self) -> Result<TrackerDataset, CoreError> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(TrackerDataset::new());
        }
        load_dataset_from_path(&path)
    }

    /// Copies the committed document into the backup directory.
    ///
    /// Backups taken within the same second are told apart by a sequence number.
    pub fn backup(&self, note: Option<&str>) -> Result<TrackerBackupInfo, CoreError> {
        let _guard = self.lock()?;
        let dataset = self.load()?;
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let label = sanitize_backup_note(note);
        let mut sequence = self.next_sequence(&stamp)?;
        loop {
            let file_name = backup_file_name(&stamp, sequence, label.as_deref());
            let path = self.paths.backup_root.join(&file_name);
            match write_new_dataset(&path, &dataset) {
                Ok(()) => {
                    info!(backup = %file_name, "tracker backup created");
                    self.prune_backups(&file_name);
                    return Ok(TrackerBackupInfo {
                        created_at: parse_backup_timestamp(&file_name),
                        sequence,
                        id: file_name,
                        path,
                    });
                }
                Err(CoreError::Io(err)) if err.kind() == ErrorKind::AlreadyExists => {
                    sequence += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<TrackerBackupInfo>, CoreError> {
        let dir = &self.paths.backup_root;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION)
            {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(TrackerBackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    sequence: parse_backup_sequence(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.sequence)));
        Ok(entries)
    }

    /// Replaces the committed document with the backup's contents.
    pub fn restore_backup(&self, backup: &TrackerBackupInfo) -> Result<TrackerDataset, CoreError> {
        let _guard = self.lock()?;
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let dataset = load_dataset_from_path(&backup.path)?;
        save_dataset_to_path(&dataset, &self.data_path())?;
        info!(backup = %backup.id, "tracker restored from backup");
        Ok(dataset)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("tracker store lock poisoned".into()))
    }

    fn read<T>(&self, query: impl FnOnce(&TrackerDataset) -> T) -> Result<T, CoreError> {
        Ok(query(&self.load()?))
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut TrackerDataset) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.lock()?;
        let mut dataset = self.load()?;
        let outcome = apply(&mut dataset)?;
        save_dataset_to_path(&dataset, &self.data_path())?;
        debug!(path = %self.data_path().display(), "tracker document written");
        Ok(outcome)
    }

    fn next_sequence(&self, stamp: &str) -> Result<u32, CoreError> {
        let prefix = format!("{}_{}_", BACKUP_PREFIX, stamp);
        Ok(self
            .list_backups()?
            .iter()
            .filter(|info| info.id.starts_with(&prefix))
            .map(|info| info.sequence + 1)
            .max()
            .unwrap_or(1))
    }

    /// Drops everything past the retention window, never touching `keep`.
    fn prune_backups(&self, keep: &str) {
        let entries = match self.list_backups() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "could not list backups for pruning");
                return;
            }
        };
        let stale = entries
            .into_iter()
            .filter(|entry| entry.id != keep)
            .skip(self.retention.saturating_sub(1));
        for entry in stale {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "could not prune backup");
            }
        }
    }
}

impl TrackerStore for JsonTrackerStore {
    fn insert_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.mutate(|data| data.insert_card(owner, card))
    }

    fn list_cards(&self, owner: UserId) -> Result<Vec<Card>, CoreError> {
        self.read(|data| data.cards_for(owner))
    }

    fn get_card(&self, owner: UserId, card_id: Uuid) -> Result<Option<Card>, CoreError> {
        self.read(|data| data.card(owner, card_id).cloned())
    }

    fn update_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.mutate(|data| data.update_card(owner, card))
    }

    fn delete_card(&self, owner: UserId, card_id: Uuid) -> Result<bool, CoreError> {
        self.mutate(|data| Ok(data.delete_card(owner, card_id)))
    }

    fn insert_voucher_with_periods(
        &self,
        owner: UserId,
        voucher: &Voucher,
        periods: &[VoucherPeriod],
    ) -> Result<VoucherWithPeriods, CoreError> {
        self.mutate(|data| data.insert_voucher_with_periods(owner, voucher, periods))
    }

    fn list_vouchers(&self, owner: UserId) -> Result<Vec<VoucherWithPeriods>, CoreError> {
        self.read(|data| data.vouchers_for(owner))
    }

    fn get_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<Option<Voucher>, CoreError> {
        self.read(|data| data.voucher(owner, voucher_id).cloned())
    }

    fn update_voucher_status(
        &self,
        owner: UserId,
        voucher_id: Uuid,
        status: VoucherStatus,
        now: DateTime<Utc>,
    ) -> Result<Voucher, CoreError> {
        self.mutate(|data| data.update_voucher_status(owner, voucher_id, status, now))
    }

    fn delete_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<bool, CoreError> {
        self.mutate(|data| Ok(data.delete_voucher(owner, voucher_id)))
    }

    fn get_period(
        &self,
        owner: UserId,
        period_id: Uuid,
    ) -> Result<Option<VoucherPeriod>, CoreError> {
        self.read(|data| data.period(owner, period_id).cloned())
    }

    fn list_periods(
        &self,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<Vec<VoucherPeriod>, CoreError> {
        self.read(|data| data.periods_for(owner, voucher_id))
    }

    fn update_period(
        &self,
        owner: UserId,
        period: &VoucherPeriod,
    ) -> Result<VoucherPeriod, CoreError> {
        self.mutate(|data| data.update_period(owner, period))
    }

    fn get_profile(&self, owner: UserId) -> Result<Option<UserProfile>, CoreError> {
        self.read(|data| data.profile(owner).cloned())
    }

    fn upsert_profile(
        &self,
        owner: UserId,
        profile: &UserProfile,
    ) -> Result<UserProfile, CoreError> {
        self.mutate(|data| Ok(data.upsert_profile(owner, profile)))
    }
}

/// Writes a dataset through a temporary sibling file followed by a rename.
pub fn save_dataset_to_path(dataset: &TrackerDataset, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_dataset(&tmp, dataset)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_dataset_from_path(path: &Path) -> Result<TrackerDataset, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn write_dataset(path: &Path, dataset: &TrackerDataset) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(dataset).map_err(|err| CoreError::Serde(err.to_string()))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn write_new_dataset(path: &Path, dataset: &TrackerDataset) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(dataset).map_err(|err| CoreError::Serde(err.to_string()))?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn backup_file_name(stamp: &str, sequence: u32, label: Option<&str>) -> String {
    let mut stem = format!("{}_{}_{:03}", BACKUP_PREFIX, stamp, sequence);
    if let Some(label) = label {
        stem.push('_');
        stem.push_str(label);
    }
    format!("{}.{}", stem, BACKUP_EXTENSION)
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

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut segments = stem.split('_').skip(1);
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Sequence segment after the timestamp; names without one sort first.
fn parse_backup_sequence(name: &str) -> u32 {
    name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))
        .and_then(|stem| stem.split('_').nth(3))
        .filter(|segment| is_digits(segment, segment.len()))
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("  Before Restore!! ")),
            Some("before-restore".into())
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn backup_names_carry_timestamp_and_sequence() {
        let name = backup_file_name("20250314_120501", 2, Some("manual"));
        assert_eq!(name, "tracker_20250314_120501_002_manual.json");
        let stamp = parse_backup_timestamp(&name).expect("timestamp");
        assert_eq!(stamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-03-14 12:05:01");
        assert_eq!(parse_backup_sequence(&name), 2);
        assert_eq!(parse_backup_sequence("tracker_20250314_120501_011.json"), 11);
        assert_eq!(parse_backup_sequence("tracker_20250314_120501.json"), 0);
        assert!(parse_backup_timestamp("tracker_2025_1205.json").is_none());
        assert!(parse_backup_timestamp("notes.txt").is_none());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/tracker.json")),
            PathBuf::from("/data/tracker.json.tmp")
        );
    }
}

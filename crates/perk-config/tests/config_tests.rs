use perk_config::{Config, ConfigError, ConfigManager};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn default_config_enables_weekly_reminders() {
    let cfg = Config::default();

    assert_eq!(cfg.default_reminder_days, 7);
    assert!(cfg.reminders_enabled);
    assert!(cfg.log_filter.is_none());
}

#[test]
fn config_manager_loads_defaults_when_missing() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("load config"), Config::default());
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        default_reminder_days: 3,
        data_root: Some(PathBuf::from("/tmp/perks")),
        log_filter: Some("perk_tracker=debug".into()),
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn config_backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let original = Config {
        default_reminder_days: 14,
        ..Config::default()
    };
    manager.save(&original).expect("save config");
    let name = manager
        .backup(&original, Some("Before reset"))
        .expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-reset.json"));

    manager.save(&Config::default()).expect("reset config");
    assert!(manager.list_backups().unwrap().contains(&name));

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.default_reminder_days, 14);
    assert_eq!(manager.load().unwrap().default_reminder_days, 14);
}

#[test]
fn restoring_unknown_backup_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let err = manager.restore("config_20250101_000000.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn back_to_back_backups_keep_both_snapshots() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let weekly = Config::default();
    let fortnightly = Config {
        default_reminder_days: 14,
        ..Config::default()
    };
    let first = manager.backup(&weekly, None).expect("first backup");
    let second = manager.backup(&fortnightly, None).expect("second backup");
    assert_ne!(first, second);

    let names = manager.list_backups().expect("list backups");
    assert_eq!(names, vec![second.clone(), first.clone()]);

    assert_eq!(manager.restore(&first).unwrap().default_reminder_days, 7);
    assert_eq!(manager.restore(&second).unwrap().default_reminder_days, 14);
}

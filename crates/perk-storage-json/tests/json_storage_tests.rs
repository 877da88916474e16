use chrono::{TimeZone, Utc};
use perk_core::{CardForm, CardService, FixedClock, NewVoucher, TrackerStore, VoucherService};
use perk_domain::{PeriodTransition, PeriodUpdate, UserId, VoucherStatus, VoucherWithPeriods};
use perk_storage_json::{JsonTrackerStore, StoragePaths};
use std::{fs, path::Path};
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 5, 2, 9, 30, 0).unwrap())
}

fn seed(store: &JsonTrackerStore, owner: UserId) -> VoucherWithPeriods {
    let card = CardService::create(
        store,
        &clock(),
        owner,
        CardForm {
            bank: "Axis Bank".into(),
            last4: "9876".into(),
            variant: "gold".into(),
            ..CardForm::default()
        },
    )
    .expect("create card");
    VoucherService::create(
        store,
        &clock(),
        owner,
        NewVoucher {
            card_id: card.id,
            name: "Movie tickets".into(),
            cycle_type: "monthly".into(),
            category: "entertainment".into(),
            value: 250.0,
            ..NewVoucher::default()
        },
    )
    .expect("create voucher")
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn json_store_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let owner = UserId::new();
    let created = {
        let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
        seed(&store, owner)
    };

    let reopened = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("reopen store");
    let vouchers = reopened.list_vouchers(owner).expect("list vouchers");
    assert_eq!(vouchers.len(), 1);
    assert_eq!(vouchers[0].voucher.id, created.voucher.id);
    assert_eq!(vouchers[0].periods.len(), 12);
    assert_eq!(vouchers[0].periods[0].label, "Jan 2025");
    assert!(reopened.data_path().ends_with("tracker.json"));
    assert!(reopened.list_cards(UserId::new()).unwrap().is_empty());
}

#[test]
fn period_updates_sync_voucher_through_committed_file() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
    let owner = UserId::new();
    let created = seed(&store, owner);

    let mut last = None;
    for period in &created.periods {
        last = Some(
            VoucherService::update_period_status(
                &store,
                &clock(),
                owner,
                period.id,
                PeriodUpdate::new(PeriodTransition::Paused),
            )
            .expect("pause period"),
        );
    }
    let last = last.expect("at least one period");
    assert!(last.voucher_synced);

    let voucher = store
        .get_voucher(owner, created.voucher.id)
        .unwrap()
        .expect("voucher");
    assert_eq!(voucher.status, VoucherStatus::Paused);
}

#[test]
fn failed_write_preserves_previous_document() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
    let owner = UserId::new();
    let created = seed(&store, owner);
    let path = store.data_path();
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory at the temp path makes File::create fail.
    let tmp_path = tmp_path_for(&path);
    fs::create_dir_all(&tmp_path).unwrap();

    let result = VoucherService::update_period_status(
        &store,
        &clock(),
        owner,
        created.periods[0].id,
        PeriodUpdate::new(PeriodTransition::Redeemed),
    );
    assert!(result.is_err(), "write through a blocked temp path must fail");
    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(current, original);

    let _ = fs::remove_dir_all(&tmp_path);
}

#[test]
fn json_store_creates_lists_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
    let owner = UserId::new();
    let created = seed(&store, owner);

    let info = store.backup(Some("Before cleanup")).expect("create backup");
    assert!(info.id.starts_with("tracker_"));
    assert!(info.id.ends_with("_before-cleanup.json"));
    assert!(info.created_at.is_some());

    VoucherService::delete(&store, owner, created.voucher.id).expect("delete voucher");
    assert!(store.list_vouchers(owner).unwrap().is_empty());

    let backups = store.list_backups().expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    let restored = store.restore_backup(&info).expect("restore backup");
    assert_eq!(restored.vouchers.len(), 1);
    assert_eq!(store.list_vouchers(owner).unwrap().len(), 1);
}

#[test]
fn backups_are_pruned_to_retention_keeping_newest() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::with_retention(StoragePaths::under(dir.path()), 2)
        .expect("open store");
    seed(&store, UserId::new());

    let mut last = None;
    for note in ["first", "second", "third", "fourth"] {
        last = Some(store.backup(Some(note)).expect("backup"));
    }
    let last = last.expect("backup info");
    assert!(last.path.exists(), "the backup just written must survive pruning");

    let kept: Vec<String> = store
        .list_backups()
        .unwrap()
        .into_iter()
        .map(|info| info.id)
        .collect();
    assert_eq!(kept.len(), 2);
    assert!(kept[0].ends_with("_fourth.json"), "kept {kept:?}");
    assert!(kept[1].ends_with("_third.json"), "kept {kept:?}");
}

#[test]
fn unnamed_backups_in_quick_succession_do_not_overwrite() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
    let owner = UserId::new();
    let created = seed(&store, owner);

    let before = store.backup(None).expect("first backup");
    VoucherService::delete(&store, owner, created.voucher.id).expect("delete voucher");
    let after = store.backup(None).expect("second backup");

    assert_ne!(before.id, after.id);
    assert_eq!(store.list_backups().unwrap().len(), 2);
    assert_eq!(store.list_backups().unwrap()[0].id, after.id);

    let restored = store.restore_backup(&before).expect("restore first backup");
    assert_eq!(restored.vouchers.len(), 1);
}

#[test]
fn restoring_missing_backup_fails() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTrackerStore::new(StoragePaths::under(dir.path())).expect("open store");
    let info = store.backup(None).expect("backup");
    fs::remove_file(&info.path).unwrap();
    assert!(store.restore_backup(&info).is_err());
}

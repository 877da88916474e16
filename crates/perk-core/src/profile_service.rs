use perk_domain::{non_blank, ProfileUpdate, UserId, UserProfile};

use crate::{
    storage::TrackerStore, time::Clock, voucher_service::MAX_REMINDER_DAYS, CoreError,
};

pub struct ProfileService;

impl ProfileService {
    pub fn get(store: &dyn TrackerStore, owner: UserId) -> Result<Option<UserProfile>, CoreError> {
        store.get_profile(owner)
    }

    /// Creates the profile on first save; later saves keep `created_at`.
    pub fn upsert(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, CoreError> {
        if let Some(days) = update.reminder_days {
            if days > MAX_REMINDER_DAYS {
                return Err(CoreError::Validation(format!(
                    "reminder days must be at most {MAX_REMINDER_DAYS}, got {days}"
                )));
            }
        }
        let now = clock.now();
        let mut profile = store
            .get_profile(owner)?
            .unwrap_or_else(|| UserProfile::new(owner, email, now));
        if !email.trim().is_empty() {
            profile.email = email.trim().to_string();
        }
        if update.full_name.is_some() {
            profile.full_name = non_blank(update.full_name);
        }
        if let Some(enabled) = update.reminder_enabled {
            profile.preferences.reminder_enabled = enabled;
        }
        if let Some(days) = update.reminder_days {
            profile.preferences.reminder_days = days;
        }
        profile.updated_at = now;
        store.upsert_profile(owner, &profile)
    }
}

use perk_domain::{is_valid_last4, non_blank, Card, CardVariant, UserId};
use tracing::info;
use uuid::Uuid;

use crate::{storage::TrackerStore, time::Clock, CoreError};

/// Card fields as submitted by a user, for both creation and edits.
#[derive(Debug, Clone)]
pub struct CardForm {
    pub bank: String,
    pub last4: String,
    /// One of `select`, `platinum`, `classic`, `gold`.
    pub variant: String,
    pub card_name: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl Default for CardForm {
    fn default() -> Self {
        Self {
            bank: String::new(),
            last4: String::new(),
            variant: CardVariant::default().as_str().into(),
            card_name: None,
            notes: None,
            is_active: true,
        }
    }
}

pub struct CardService;

impl CardService {
    pub fn create(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        form: CardForm,
    ) -> Result<Card, CoreError> {
        let variant = Self::validate(&form)?;
        let mut card = Card::new(owner, form.bank.trim(), form.last4.trim(), variant, clock.now());
        card.card_name = non_blank(form.card_name);
        card.notes = non_blank(form.notes);
        let card = store.insert_card(owner, &card)?;
        info!(card = %card.id, "card added");
        Ok(card)
    }

    pub fn update(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        card_id: Uuid,
        form: CardForm,
    ) -> Result<Card, CoreError> {
        let variant = Self::validate(&form)?;
        let mut card = store
            .get_card(owner, card_id)?
            .ok_or_else(|| CoreError::not_found("card", card_id))?;
        card.bank = form.bank.trim().to_string();
        card.last4 = form.last4.trim().to_string();
        card.variant = variant;
        card.card_name = non_blank(form.card_name);
        card.notes = non_blank(form.notes);
        card.is_active = form.is_active;
        card.touch(clock.now());
        store.update_card(owner, &card)
    }

    /// Deletes the card; its vouchers and periods go with it.
    pub fn delete(store: &dyn TrackerStore, owner: UserId, card_id: Uuid) -> Result<(), CoreError> {
        if !store.delete_card(owner, card_id)? {
            return Err(CoreError::not_found("card", card_id));
        }
        info!(card = %card_id, "card deleted");
        Ok(())
    }

    /// Cards owned by `owner`, newest first.
    pub fn list(store: &dyn TrackerStore, owner: UserId) -> Result<Vec<Card>, CoreError> {
        store.list_cards(owner)
    }

    fn validate(form: &CardForm) -> Result<CardVariant, CoreError> {
        if form.bank.trim().is_empty() {
            return Err(CoreError::Validation("bank is required".into()));
        }
        if !is_valid_last4(form.last4.trim()) {
            return Err(CoreError::Validation(format!(
                "last 4 digits must be exactly four digits, got `{}`",
                form.last4
            )));
        }
        Ok(form.variant.parse()?)
    }
}

//! The saved-card store.
//!
//! [`CardStore`] owns the user's saved flashcards. It loads the collection
//! once from a [`DurableSlot`] and writes the whole collection back after
//! every change. Failures to read or write the slot are reported through the
//! [`Notifier`] and never stop the session: the in-memory collection stays
//! authoritative.
//!
//! The store has two phases. Until [`CardStore::initialize`] has run, every
//! mutation is rejected with [`Error::StoreNotLoaded`], so an empty default
//! collection can never overwrite cards saved in an earlier session.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::card::{Card, CardIdentity, SavedCard};
use crate::error::{Error, Result};
use crate::notify::{Notification, Notifier};
use crate::storage::DurableSlot;

/// Result of [`CardStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The card was appended to the collection.
    Saved,
    /// A card with the same id was already saved; nothing changed.
    AlreadySaved,
}

/// Result of [`CardStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The card was not saved and now is.
    Saved,
    /// The card was saved and has been removed.
    Removed,
}

#[derive(Debug, Default)]
struct StoreState {
    loaded: bool,
    cards: Vec<SavedCard>,
}

/// What happened inside a critical section, reported once the lock is gone.
struct Applied<T> {
    value: T,
    write_error: Option<Error>,
}

/// Persistent collection of saved cards with at most one entry per id.
#[derive(Debug)]
pub struct CardStore {
    slot: Arc<dyn DurableSlot>,
    notifier: Arc<dyn Notifier>,
    key: String,
    identity: CardIdentity,
    state: Mutex<StoreState>,
}

impl CardStore {
    /// Create an uninitialized store over `slot`, keeping its collection
    /// under `key`.
    #[must_use]
    pub fn new(
        slot: Arc<dyn DurableSlot>,
        notifier: Arc<dyn Notifier>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            slot,
            notifier,
            key: key.into(),
            identity: CardIdentity::default(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Derive ids with `identity` instead of the question text.
    #[must_use]
    pub fn with_identity(mut self, identity: CardIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Get the slot key the collection is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the identity scheme in use.
    #[must_use]
    pub fn identity(&self) -> CardIdentity {
        self.identity
    }

    /// Check if [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    /// Load the saved collection from the slot.
    ///
    /// An empty slot yields an empty collection. Content that cannot be
    /// parsed, or a slot that cannot be read, is reported as a "Load Error"
    /// notification and the store continues with an empty collection. The
    /// store is loaded afterwards in every case. Calling this again returns
    /// the current collection without touching the slot.
    pub fn initialize(&self) -> Vec<SavedCard> {
        let (cards, load_error) = {
            let mut state = self.lock();
            if state.loaded {
                return state.cards.clone();
            }

            let (cards, load_error) = match self.load() {
                Ok(cards) => (cards, None),
                Err(err) => (Vec::new(), Some(err)),
            };
            state.cards = cards;
            state.loaded = true;
            (state.cards.clone(), load_error)
        };

        match load_error {
            Some(err) => {
                warn!("Failed to load saved cards: {}", err);
                self.notifier.notify(Notification::destructive(
                    "Load Error",
                    "Could not load saved cards.",
                ));
            }
            None => info!("Loaded {} saved cards from slot '{}'", cards.len(), self.key),
        }
        cards
    }

    /// Save a card.
    ///
    /// Saving a card whose id is already present changes nothing and
    /// reports "Already Saved".
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreNotLoaded`] before initialization. Write
    /// failures are reported as notifications, not errors.
    pub fn add(&self, card: Card) -> Result<AddOutcome> {
        let applied = self.apply(|cards| {
            let saved = SavedCard::new(card, self.identity);
            if cards.iter().any(|c| c.id == saved.id) {
                return (AddOutcome::AlreadySaved, false);
            }
            debug!("Saving card '{}'", saved.id);
            cards.push(saved);
            (AddOutcome::Saved, true)
        })?;

        match applied.value {
            AddOutcome::Saved => self.notify_saved(),
            AddOutcome::AlreadySaved => self.notifier.notify(Notification::info(
                "Already Saved",
                "This card is already in your saved list.",
            )),
        }
        self.report_write(applied.write_error);
        Ok(applied.value)
    }

    /// Remove the card with the given id.
    ///
    /// Returns `true` if a card was removed. A missing id changes nothing,
    /// writes nothing and notifies nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreNotLoaded`] before initialization.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let applied = self.apply(|cards| {
            let before = cards.len();
            cards.retain(|c| c.id != id);
            let removed = cards.len() < before;
            (removed, removed)
        })?;

        if applied.value {
            self.notify_removed();
        }
        self.report_write(applied.write_error);
        Ok(applied.value)
    }

    /// Save the card if it is not saved, remove it if it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreNotLoaded`] before initialization.
    pub fn toggle(&self, card: Card) -> Result<ToggleOutcome> {
        let applied = self.apply(|cards| {
            let saved = SavedCard::new(card, self.identity);
            if let Some(pos) = cards.iter().position(|c| c.id == saved.id) {
                cards.remove(pos);
                (ToggleOutcome::Removed, true)
            } else {
                cards.push(saved);
                (ToggleOutcome::Saved, true)
            }
        })?;

        match applied.value {
            ToggleOutcome::Saved => self.notify_saved(),
            ToggleOutcome::Removed => self.notify_removed(),
        }
        self.report_write(applied.write_error);
        Ok(applied.value)
    }

    /// Check if a card with the given id is saved.
    #[must_use]
    pub fn is_saved(&self, id: &str) -> bool {
        self.lock().cards.iter().any(|c| c.id == id)
    }

    /// Get the id a card would be saved under.
    #[must_use]
    pub fn id_for(&self, card: &Card) -> String {
        self.identity.id_for(card)
    }

    /// Get the saved card with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SavedCard> {
        self.lock().cards.iter().find(|c| c.id == id).cloned()
    }

    /// Get a snapshot of the collection in insertion order.
    #[must_use]
    pub fn cards(&self) -> Vec<SavedCard> {
        self.lock().cards.clone()
    }

    /// Get the number of saved cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().cards.len()
    }

    /// Check if no cards are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().cards.is_empty()
    }

    /// Read and parse the slot. Duplicate ids in stored data keep their
    /// first occurrence.
    fn load(&self) -> Result<Vec<SavedCard>> {
        let Some(raw) = self.slot.read(&self.key).map_err(|e| Error::LoadCorruption {
            key: self.key.clone(),
            message: e.to_string(),
        })?
        else {
            return Ok(Vec::new());
        };

        let parsed: Vec<SavedCard> =
            serde_json::from_str(&raw).map_err(|e| Error::LoadCorruption {
                key: self.key.clone(),
                message: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        let cards: Vec<SavedCard> = parsed
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        Ok(cards)
    }

    /// Run `change` against the collection and persist it if it reports a
    /// change, all under the state lock.
    fn apply<T>(
        &self,
        change: impl FnOnce(&mut Vec<SavedCard>) -> (T, bool),
    ) -> Result<Applied<T>> {
        let mut state = self.lock();
        if !state.loaded {
            return Err(Error::StoreNotLoaded);
        }

        let (value, changed) = change(&mut state.cards);
        let write_error = if changed {
            self.persist(&state.cards).err()
        } else {
            None
        };
        Ok(Applied { value, write_error })
    }

    fn persist(&self, cards: &[SavedCard]) -> Result<()> {
        let to_persistence_error = |e: Error| Error::Persistence {
            key: self.key.clone(),
            message: e.to_string(),
        };
        let json = serde_json::to_string(cards).map_err(|e| to_persistence_error(e.into()))?;
        self.slot
            .write(&self.key, &json)
            .map_err(to_persistence_error)?;
        debug!("Persisted {} saved cards", cards.len());
        Ok(())
    }

    fn report_write(&self, write_error: Option<Error>) {
        if let Some(err) = write_error {
            warn!("{}", err);
            self.notifier.notify(Notification::destructive(
                "Save Error",
                "Could not save cards.",
            ));
        }
    }

    fn notify_saved(&self) {
        self.notifier.notify(Notification::info(
            "Card Saved!",
            "The flashcard has been added to your saved list.",
        ));
    }

    fn notify_removed(&self) {
        self.notifier.notify(Notification::info(
            "Card Removed",
            "The flashcard has been removed from your saved list.",
        ));
    }

    // The collection is plain data, so a panic elsewhere cannot leave it
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

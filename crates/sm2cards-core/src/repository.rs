// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The storage contract the scheduler assumes.
//!
//! Writes are compare-and-swap on the state the caller read: if the stored
//! `repetitions` or `next_review` no longer match, the write is rejected
//! with [`RepositoryError::StaleWrite`] so the caller can re-fetch and
//! re-apply the rating. A stale write is never silently dropped.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use thiserror::Error;

use crate::due::Schedulable;
use crate::error::MalformedItem;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::card_state::RawCardState;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("card {0} was modified concurrently")]
    StaleWrite(CardId),
    #[error("card {0} not found")]
    NotFound(CardId),
    #[error("storage error: {0}")]
    Backend(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for RepositoryError {
    fn from(value: rusqlite::Error) -> Self {
        RepositoryError::Backend(value.to_string())
    }
}

/// A card as held in storage.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredCard {
    pub card_id: CardId,
    pub deck_name: String,
    pub state: RawCardState,
}

impl Schedulable for StoredCard {
    fn card_id(&self) -> CardId {
        self.card_id
    }

    fn deck(&self) -> &str {
        &self.deck_name
    }

    fn card_state(&self) -> Result<CardState, MalformedItem> {
        CardState::try_from(self.state.clone())
    }
}

pub trait CardRepository {
    fn get(&self, card_id: CardId) -> Result<StoredCard, RepositoryError>;

    /// Replace the card's state with `new`, provided the stored state still
    /// matches `expected`.
    fn put(
        &self,
        card_id: CardId,
        expected: &CardState,
        new: &CardState,
    ) -> Result<(), RepositoryError>;

    fn list_by_deck(&self, deck_name: &str) -> Result<Vec<StoredCard>, RepositoryError>;

    fn list_all(&self) -> Result<Vec<StoredCard>, RepositoryError>;
}

/// Whether a stored state is the one a writer read before computing its
/// update.
pub fn matches_expected(stored: &RawCardState, expected: &CardState) -> bool {
    stored.repetitions == Some(expected.repetitions) && stored.next_review == expected.next_review
}

/// A repository held in memory, for tests and embedding.
#[derive(Default)]
pub struct MemoryRepository {
    cards: Mutex<BTreeMap<CardId, StoredCard>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card, replacing any card with the same ID.
    pub fn insert(&self, card: StoredCard) -> Result<(), RepositoryError> {
        self.acquire()?.insert(card.card_id, card);
        Ok(())
    }

    fn acquire(&self) -> Result<MutexGuard<'_, BTreeMap<CardId, StoredCard>>, RepositoryError> {
        self.cards
            .lock()
            .map_err(|_| RepositoryError::Backend("repository lock poisoned".to_string()))
    }
}

impl CardRepository for MemoryRepository {
    fn get(&self, card_id: CardId) -> Result<StoredCard, RepositoryError> {
        self.acquire()?
            .get(&card_id)
            .cloned()
            .ok_or(RepositoryError::NotFound(card_id))
    }

    fn put(
        &self,
        card_id: CardId,
        expected: &CardState,
        new: &CardState,
    ) -> Result<(), RepositoryError> {
        let mut cards = self.acquire()?;
        let card = cards
            .get_mut(&card_id)
            .ok_or(RepositoryError::NotFound(card_id))?;
        if !matches_expected(&card.state, expected) {
            return Err(RepositoryError::StaleWrite(card_id));
        }
        card.state = RawCardState::from(new);
        Ok(())
    }

    fn list_by_deck(&self, deck_name: &str) -> Result<Vec<StoredCard>, RepositoryError> {
        Ok(self
            .acquire()?
            .values()
            .filter(|card| card.deck_name == deck_name)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<StoredCard>, RepositoryError> {
        Ok(self.acquire()?.values().cloned().collect())
    }
}

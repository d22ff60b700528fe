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

use std::cmp::Ordering;

use crate::error::MalformedItem;
use crate::retention::retention_at;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;

/// Anything the due-set selector can rank: an identity, a deck, and a card
/// state that may fail validation.
pub trait Schedulable {
    fn card_id(&self) -> CardId;

    fn deck(&self) -> &str;

    fn card_state(&self) -> Result<CardState, MalformedItem>;
}

/// A due item together with the state and retention it was ranked by.
#[derive(Debug)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub state: CardState,
    pub retention: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedItem {
    pub card_id: CardId,
    pub reason: MalformedItem,
}

/// The result of [`select_due`]: due items, most at risk of being forgotten
/// first, and the items that were skipped because their state was corrupt.
#[derive(Debug)]
pub struct DueSet<'a, T> {
    pub due: Vec<Ranked<'a, T>>,
    pub skipped: Vec<SkippedItem>,
}

impl<'a, T> DueSet<'a, T> {
    pub fn items(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.due.iter().map(|ranked| ranked.item)
    }

    pub fn len(&self) -> usize {
        self.due.len()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }
}

pub fn is_due(state: &CardState, now: Timestamp) -> bool {
    match state.next_review {
        None => true,
        Some(next_review) => next_review <= now,
    }
}

/// Select the items due at `now`, optionally restricted to one deck.
///
/// The order is: lowest estimated retention first, then earliest scheduled
/// review (unscheduled cards first), then card ID. A malformed item is
/// logged and reported in [`DueSet::skipped`]; it does not abort the batch.
pub fn select_due<'a, T: Schedulable>(
    items: &'a [T],
    now: Timestamp,
    scope: Option<&str>,
) -> DueSet<'a, T> {
    let mut due = Vec::new();
    let mut skipped = Vec::new();
    for item in items {
        if let Some(deck) = scope {
            if item.deck() != deck {
                continue;
            }
        }
        let state = match item.card_state() {
            Ok(state) => state,
            Err(reason) => {
                log::warn!("Skipping card {}: {reason}", item.card_id());
                skipped.push(SkippedItem {
                    card_id: item.card_id(),
                    reason,
                });
                continue;
            }
        };
        if is_due(&state, now) {
            let retention = retention_at(&state, now);
            due.push(Ranked {
                item,
                state,
                retention,
            });
        }
    }
    due.sort_by(by_priority);
    DueSet { due, skipped }
}

fn by_priority<T: Schedulable>(a: &Ranked<'_, T>, b: &Ranked<'_, T>) -> Ordering {
    a.retention
        .total_cmp(&b.retention)
        .then_with(|| a.state.next_review.cmp(&b.state.next_review))
        .then_with(|| a.item.card_id().cmp(&b.item.card_id()))
}

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

//! Load leveling: spreading reviews that cluster on the same day over the
//! following days.
//!
//! Cards that pass through the fixed rungs of the ladder together tend to
//! come due together. Leveling pushes the overflow of a full day forward by
//! at most `bounded_scan_days`, and never pulls a review earlier. When no
//! day in the window has room, the review stays where it was and the day is
//! allowed to overflow.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::date::Date;

/// A card with a tentative review date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledItem {
    pub card_id: CardId,
    pub next_review: Date,
}

impl ScheduledItem {
    /// `None` for cards that have no review scheduled.
    pub fn from_state(card_id: CardId, state: &CardState) -> Option<Self> {
        state.next_review.map(|next_review| Self {
            card_id,
            next_review: next_review.date(),
        })
    }
}

/// Assign each item a review date, at or after its tentative one, such that
/// no day holds more than `max_per_day` items wherever the scan window
/// allows.
pub fn level_load(
    items: &[ScheduledItem],
    config: &SchedulerConfig,
) -> Result<BTreeMap<CardId, Date>, ScheduleError> {
    config.validate()?;
    let capacity = usize::try_from(config.max_per_day).unwrap_or(usize::MAX);

    let mut ordered: Vec<&ScheduledItem> = items.iter().collect();
    ordered.sort_by_key(|item| (item.next_review, item.card_id));

    let mut load: HashMap<Date, usize> = HashMap::new();
    let mut assignments = BTreeMap::new();
    for item in ordered {
        let original = item.next_review;
        let has_room = |day: &Date| load.get(day).copied().unwrap_or(0) < capacity;
        let day = if has_room(&original) {
            original
        } else {
            let shifted = (1..=config.bounded_scan_days)
                .map(|offset| original.add_days(offset))
                .find(has_room);
            match shifted {
                Some(day) => {
                    log::debug!("Moving card {} from {original} to {day}.", item.card_id);
                    day
                }
                None => {
                    log::warn!(
                        "No room within {} days of {original}; leaving card {} overloaded.",
                        config.bounded_scan_days,
                        item.card_id
                    );
                    original
                }
            }
        };
        *load.entry(day).or_insert(0) += 1;
        assignments.insert(item.card_id, day);
    }
    Ok(assignments)
}

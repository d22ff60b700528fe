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

//! The SM-2 recurrence.
//!
//! The constants here are fixed by the algorithm and are deliberately not
//! configurable, so that a schedule can be reproduced from the review
//! history alone.

use crate::error::ScheduleError;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::rating::ReviewRating;
use crate::types::review_event::ReviewEvent;
use crate::types::timestamp::Timestamp;

/// The ease factor of a card that has never been reviewed.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// The hardest sustainable difficulty.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// The interval after the first success.
const FIRST_INTERVAL: u32 = 1;

/// The interval after the second consecutive success.
const SECOND_INTERVAL: u32 = 6;

/// The interval after a failure.
const RELEARN_INTERVAL: u32 = 1;

/// The maximum review interval in days (a hundred years).
const MAX_INTERVAL: u32 = 36_500;

/// Apply one review to a card state.
pub fn review(state: &CardState, rating: ReviewRating, now: Timestamp) -> CardState {
    let ease_factor = next_ease_factor(state.ease_factor, rating);
    let (repetitions, interval) = if rating.is_pass() {
        let interval = match state.repetitions {
            0 => FIRST_INTERVAL,
            1 => SECOND_INTERVAL,
            _ => scale_interval(state.interval, ease_factor),
        };
        (state.repetitions.saturating_add(1), interval)
    } else {
        (0, RELEARN_INTERVAL)
    };
    log::debug!(
        "SM-2: rating={rating} reps {}->{repetitions} ivl {}->{interval} ef {:.2}->{ease_factor:.2}",
        state.repetitions,
        state.interval,
        state.ease_factor
    );
    CardState {
        repetitions,
        ease_factor,
        interval,
        last_reviewed: Some(now),
        next_review: Some(now.add_days(interval)),
    }
}

/// Like [`review`], but taking the rating as a raw integer. Ratings outside
/// 1 to 5 are rejected, never clamped.
pub fn review_raw(
    state: &CardState,
    rating: u8,
    now: Timestamp,
) -> Result<CardState, ScheduleError> {
    let rating = ReviewRating::try_from(rating)?;
    Ok(review(state, rating, now))
}

/// Schedule a card that has no history, e.g. in quick practice. This is the
/// regular recurrence applied to a fresh card.
pub fn quick_review(rating: ReviewRating, now: Timestamp) -> CardState {
    review(&CardState::new(), rating, now)
}

/// The ease factor after a review with the given rating. Updated on every
/// review, failures included.
pub fn next_ease_factor(ease_factor: f64, rating: ReviewRating) -> f64 {
    let distance = 5.0 - f64::from(rating.value());
    let delta = 0.1 - distance * (0.08 + distance * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}

/// The analytics record for a transition produced by [`review`].
pub fn review_event(
    card_id: CardId,
    rating: ReviewRating,
    state: &CardState,
    now: Timestamp,
) -> ReviewEvent {
    ReviewEvent {
        card_id,
        rating,
        timestamp: now,
        resulting_interval: state.interval,
    }
}

fn scale_interval(interval: u32, ease_factor: f64) -> u32 {
    let scaled = (f64::from(interval) * ease_factor).round();
    scaled.clamp(1.0, f64::from(MAX_INTERVAL)) as u32
}

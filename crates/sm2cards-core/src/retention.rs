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

//! Forgetting-curve estimates and empirical review statistics.
//!
//! The forgetting curve is a ranking proxy, not a fitted model. What matters
//! is its ordering: retention falls with elapsed time and rises with both
//! ease and repetitions.

use serde::Serialize;

use crate::types::card_state::CardState;
use crate::types::review_event::ReviewEvent;
use crate::types::timestamp::Timestamp;

/// How much each consecutive success multiplies stability by.
const STABILITY_GROWTH: f64 = 1.3;

/// Days for retention to fall to 1/e.
pub fn stability(ease_factor: f64, repetitions: u32) -> f64 {
    let exponent = i32::try_from(repetitions).unwrap_or(i32::MAX);
    (ease_factor * STABILITY_GROWTH.powi(exponent)).max(f64::MIN_POSITIVE)
}

/// Estimated probability of recall, in `[0, 1]`. Negative elapsed time is
/// treated as zero.
pub fn estimate_retention(days_since_review: f64, ease_factor: f64, repetitions: u32) -> f64 {
    let days = if days_since_review.is_nan() {
        0.0
    } else {
        days_since_review.max(0.0)
    };
    (-days / stability(ease_factor, repetitions))
        .exp()
        .clamp(0.0, 1.0)
}

/// Estimated retention of a card at `now`. Cards that were never reviewed
/// have nothing to retain, and so score zero.
pub fn retention_at(state: &CardState, now: Timestamp) -> f64 {
    match state.last_reviewed {
        None => 0.0,
        Some(last_reviewed) => estimate_retention(
            now.days_since(last_reviewed),
            state.ease_factor,
            state.repetitions,
        ),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionStats {
    pub total_reviews: usize,
    pub successful_reviews: usize,
    /// Fraction of reviews rated 3 or above; zero with no reviews.
    pub success_rate: f64,
    /// Mean rating on the 1 to 5 scale; zero with no reviews.
    pub average_rating: f64,
    /// Successes since the most recent failure.
    pub current_streak: usize,
}

/// Reduce a review history to summary statistics. Events are considered in
/// timestamp order; events with equal timestamps keep their input order.
pub fn calculate_retention_stats(events: &[ReviewEvent]) -> RetentionStats {
    if events.is_empty() {
        return RetentionStats::default();
    }
    let mut ordered: Vec<&ReviewEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let total_reviews = ordered.len();
    let successful_reviews = ordered.iter().filter(|e| e.rating.is_pass()).count();
    let rating_sum: u64 = ordered.iter().map(|e| u64::from(e.rating.value())).sum();
    let current_streak = ordered
        .iter()
        .rev()
        .take_while(|e| e.rating.is_pass())
        .count();

    RetentionStats {
        total_reviews,
        successful_reviews,
        success_rate: successful_reviews as f64 / total_reviews as f64,
        average_rating: rating_sum as f64 / total_reviews as f64,
        current_streak,
    }
}

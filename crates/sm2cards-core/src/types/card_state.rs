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

use serde::Deserialize;
use serde::Serialize;

use crate::error::MalformedItem;
use crate::sm2::INITIAL_EASE_FACTOR;
use crate::sm2::MIN_EASE_FACTOR;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// The memory-model state of a single card.
///
/// This is a value type: scheduling never mutates it, every transition
/// returns a new state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCardState")]
pub struct CardState {
    /// Consecutive successful recalls since the last failure.
    pub repetitions: u32,
    /// Multiplicative difficulty factor, never below 1.3.
    pub ease_factor: f64,
    /// Days between the last review and the next one.
    pub interval: u32,
    /// Absent for cards that have never been reviewed.
    pub last_reviewed: Option<Timestamp>,
    /// Absent means the card is due immediately.
    pub next_review: Option<Timestamp>,
}

impl CardState {
    /// The state of a freshly authored card.
    pub fn new() -> Self {
        Self {
            repetitions: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            last_reviewed: None,
            next_review: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed.is_none()
    }

    /// Move the next review to `date`, keeping the time of day. Only ever
    /// moves the review later: an earlier or equal date, or an unscheduled
    /// card, leaves the state unchanged.
    pub fn postpone_to(&self, date: Date) -> Self {
        let mut state = self.clone();
        if let Some(next_review) = self.next_review {
            let moved = next_review.on_date(date);
            if moved > next_review {
                state.next_review = Some(moved);
            }
        }
        state
    }
}

impl Default for CardState {
    fn default() -> Self {
        Self::new()
    }
}

/// A card state as it comes out of storage: any field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCardState {
    pub repetitions: Option<u32>,
    pub ease_factor: Option<f64>,
    pub interval: Option<u32>,
    pub last_reviewed: Option<Timestamp>,
    pub next_review: Option<Timestamp>,
}

impl From<&CardState> for RawCardState {
    fn from(state: &CardState) -> Self {
        Self {
            repetitions: Some(state.repetitions),
            ease_factor: Some(state.ease_factor),
            interval: Some(state.interval),
            last_reviewed: state.last_reviewed,
            next_review: state.next_review,
        }
    }
}

impl TryFrom<RawCardState> for CardState {
    type Error = MalformedItem;

    fn try_from(raw: RawCardState) -> Result<Self, Self::Error> {
        let repetitions = raw
            .repetitions
            .ok_or(MalformedItem::MissingField("repetitions"))?;
        let ease_factor = raw
            .ease_factor
            .ok_or(MalformedItem::MissingField("easeFactor"))?;
        let interval = raw.interval.ok_or(MalformedItem::MissingField("interval"))?;
        if !ease_factor.is_finite() {
            return Err(MalformedItem::EaseNotFinite);
        }
        if ease_factor < MIN_EASE_FACTOR {
            return Err(MalformedItem::EaseTooLow(ease_factor));
        }
        if repetitions > 0 && interval == 0 {
            return Err(MalformedItem::ZeroInterval(repetitions));
        }
        match (raw.last_reviewed, raw.next_review) {
            (None, Some(_)) => return Err(MalformedItem::ScheduledButNeverReviewed),
            (Some(last), Some(next)) if next < last => {
                return Err(MalformedItem::ScheduledBeforeLastReview);
            }
            _ => {}
        }
        Ok(Self {
            repetitions,
            ease_factor,
            interval,
            last_reviewed: raw.last_reviewed,
            next_review: raw.next_review,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn reviewed() -> Fallible<CardState> {
        Ok(CardState {
            repetitions: 2,
            ease_factor: 2.5,
            interval: 6,
            last_reviewed: Some("2024-01-01T09:00:00Z".parse()?),
            next_review: Some("2024-01-07T09:00:00Z".parse()?),
        })
    }

    #[test]
    fn test_new_card() {
        let state = CardState::new();
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert!(state.is_new());
        assert!(state.next_review.is_none());
    }

    #[test]
    fn test_postpone_moves_later() -> Fallible<()> {
        let state = reviewed()?;
        let moved = state.postpone_to("2024-01-09".parse()?);
        assert_eq!(
            moved.next_review,
            Some("2024-01-09T09:00:00Z".parse::<Timestamp>()?)
        );
        assert_eq!(moved.interval, state.interval);
        Ok(())
    }

    #[test]
    fn test_postpone_never_moves_earlier() -> Fallible<()> {
        let state = reviewed()?;
        assert_eq!(state.postpone_to("2024-01-03".parse()?), state);
        assert_eq!(state.postpone_to("2024-01-07".parse()?), state);
        Ok(())
    }

    #[test]
    fn test_postpone_unscheduled_is_noop() -> Fallible<()> {
        let state = CardState::new();
        assert_eq!(state.postpone_to("2024-01-09".parse()?), state);
        Ok(())
    }

    #[test]
    fn test_raw_roundtrip() -> Fallible<()> {
        let state = reviewed()?;
        let raw = RawCardState::from(&state);
        assert_eq!(CardState::try_from(raw), Ok(state));
        Ok(())
    }

    #[test]
    fn test_missing_field() {
        let raw = RawCardState {
            repetitions: Some(0),
            ease_factor: None,
            interval: Some(0),
            ..Default::default()
        };
        assert_eq!(
            CardState::try_from(raw),
            Err(MalformedItem::MissingField("easeFactor"))
        );
    }

    #[test]
    fn test_ease_below_floor() {
        let raw = RawCardState {
            repetitions: Some(0),
            ease_factor: Some(1.2),
            interval: Some(1),
            ..Default::default()
        };
        assert_eq!(
            CardState::try_from(raw),
            Err(MalformedItem::EaseTooLow(1.2))
        );
    }

    #[test]
    fn test_zero_interval_after_success() {
        let raw = RawCardState {
            repetitions: Some(3),
            ease_factor: Some(2.5),
            interval: Some(0),
            ..Default::default()
        };
        assert_eq!(
            CardState::try_from(raw),
            Err(MalformedItem::ZeroInterval(3))
        );
    }

    #[test]
    fn test_scheduled_but_never_reviewed() -> Fallible<()> {
        let raw = RawCardState {
            repetitions: Some(0),
            ease_factor: Some(2.5),
            interval: Some(1),
            last_reviewed: None,
            next_review: Some("2024-01-01T00:00:00Z".parse()?),
        };
        assert_eq!(
            CardState::try_from(raw),
            Err(MalformedItem::ScheduledButNeverReviewed)
        );
        Ok(())
    }

    #[test]
    fn test_json_uses_validation() -> Fallible<()> {
        let json = r#"{"repetitions":1,"easeFactor":1.0,"interval":1,"lastReviewed":null,"nextReview":null}"#;
        assert!(serde_json::from_str::<CardState>(json).is_err());
        let state = reviewed()?;
        let json = serde_json::to_string(&state)?;
        assert_eq!(serde_json::from_str::<CardState>(&json)?, state);
        Ok(())
    }
}

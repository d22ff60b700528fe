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

use std::io::Write;

use sm2cards_core::CardRepository;
use sm2cards_core::Fallible;
use sm2cards_core::RepositoryError;
use sm2cards_core::Schedulable;
use sm2cards_core::ScheduledItem;
use sm2cards_core::SchedulerConfig;
use sm2cards_core::Timestamp;
use sm2cards_core::level_load;

use crate::collection::Collection;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LevelReport {
    /// Scheduled cards whose review falls after today.
    pub considered: usize,
    /// Cards whose review was postponed.
    pub moved: usize,
    /// Cards that changed while leveling and were left alone.
    pub stale: usize,
}

/// Spread upcoming reviews so no day holds more than the configured
/// maximum. Cards already due are not touched.
pub fn level<W: Write>(
    collection: &Collection,
    now: Timestamp,
    config: &SchedulerConfig,
    dry_run: bool,
    output: &mut W,
) -> Fallible<LevelReport> {
    let today = now.date();
    let mut upcoming = Vec::new();
    for stored in collection.live_cards(None)? {
        let state = match stored.card_state() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Skipping card {}: {e}", stored.card_id);
                continue;
            }
        };
        if let Some(item) = ScheduledItem::from_state(stored.card_id, &state) {
            if item.next_review > today {
                upcoming.push((item, state));
            }
        }
    }
    let items: Vec<ScheduledItem> = upcoming.iter().map(|(item, _)| *item).collect();
    let assignments = level_load(&items, config)?;

    let mut report = LevelReport {
        considered: items.len(),
        ..Default::default()
    };
    for (item, state) in &upcoming {
        let Some(&date) = assignments.get(&item.card_id) else {
            continue;
        };
        if date <= item.next_review {
            continue;
        }
        writeln!(
            output,
            "{}: {} -> {}",
            item.card_id.short(),
            item.next_review,
            date
        )?;
        if !dry_run {
            let moved = state.postpone_to(date);
            match collection.db.put(item.card_id, state, &moved) {
                Ok(()) => {}
                Err(RepositoryError::StaleWrite(_)) => {
                    log::warn!("Card {} changed while leveling, leaving it.", item.card_id);
                    report.stale += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        report.moved += 1;
    }
    let verb = if dry_run { "Would move" } else { "Moved" };
    writeln!(
        output,
        "{verb} {} of {} upcoming reviews.",
        report.moved, report.considered
    )?;
    if report.stale > 0 {
        writeln!(output, "{} cards changed while leveling and were left alone.", report.stale)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sm2cards_core::CardState;
    use sm2cards_core::Date;
    use sm2cards_core::ReviewRating;
    use sm2cards_core::ScheduleError;
    use sm2cards_core::review;

    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;

    fn now() -> Fallible<Timestamp> {
        Ok("2024-03-01T09:00:00Z".parse::<Timestamp>()?)
    }

    /// Every card in the fixture reviewed once at `now`, so all five fall
    /// due on the same day.
    fn setup() -> Fallible<Collection> {
        let directory = create_tmp_copy_of_test_directory()?;
        let collection = Collection::new(Some(directory), now()?)?;
        let fresh = CardState::new();
        let reviewed = review(&fresh, ReviewRating::Good, now()?);
        for card in &collection.cards {
            collection.db.put(card.id(), &fresh, &reviewed)?;
        }
        Ok(collection)
    }

    fn days(collection: &Collection) -> Fallible<BTreeMap<Date, usize>> {
        let mut days = BTreeMap::new();
        for card in collection.live_cards(None)? {
            if let Some(next_review) = card.card_state()?.next_review {
                *days.entry(next_review.date()).or_insert(0) += 1;
            }
        }
        Ok(days)
    }

    #[test]
    fn test_level() -> Fallible<()> {
        let collection = setup()?;
        let config = SchedulerConfig::new(2, 3)?;
        let mut output = Vec::new();
        let report = level(&collection, now()?, &config, false, &mut output)?;
        assert_eq!(
            report,
            LevelReport {
                considered: 5,
                moved: 3,
                stale: 0,
            }
        );
        let days = days(&collection)?;
        assert_eq!(days.values().copied().collect::<Vec<_>>(), vec![2, 2, 1]);
        assert_eq!(days.keys().next().copied(), Some(now()?.add_days(1).date()));
        Ok(())
    }

    #[test]
    fn test_dry_run_changes_nothing() -> Fallible<()> {
        let collection = setup()?;
        let config = SchedulerConfig::new(2, 3)?;
        let mut output = Vec::new();
        let report = level(&collection, now()?, &config, true, &mut output)?;
        assert_eq!(report.moved, 3);
        assert_eq!(days(&collection)?.values().copied().collect::<Vec<_>>(), vec![5]);
        assert!(String::from_utf8_lossy(&output).contains("Would move 3 of 5"));
        Ok(())
    }

    #[test]
    fn test_overload_when_window_is_full() -> Fallible<()> {
        let collection = setup()?;
        let config = SchedulerConfig::new(1, 1)?;
        let mut output = Vec::new();
        let report = level(&collection, now()?, &config, false, &mut output)?;
        assert_eq!(report.moved, 1);
        assert_eq!(days(&collection)?.values().copied().collect::<Vec<_>>(), vec![4, 1]);
        Ok(())
    }

    #[test]
    fn test_due_cards_are_left_alone() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let collection = Collection::new(Some(directory), now()?)?;
        let config = SchedulerConfig::new(1, 3)?;
        let mut output = Vec::new();
        let report = level(&collection, now()?, &config, false, &mut output)?;
        assert_eq!(report, LevelReport::default());
        Ok(())
    }

    #[test]
    fn test_invalid_capacity() -> Fallible<()> {
        let collection = setup()?;
        let config = SchedulerConfig {
            max_per_day: 0,
            bounded_scan_days: 3,
        };
        let mut output = Vec::new();
        let result = level(&collection, now()?, &config, false, &mut output);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(
                e.to_string(),
                format!("error: {}", ScheduleError::InvalidCapacity(0))
            );
        }
        Ok(())
    }
}

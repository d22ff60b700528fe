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

use std::collections::VecDeque;
use std::io::BufRead;
use std::io::Write;

use sm2cards_core::CardId;
use sm2cards_core::CardState;
use sm2cards_core::Fallible;
use sm2cards_core::RepositoryError;
use sm2cards_core::ReviewRating;
use sm2cards_core::Schedulable;
use sm2cards_core::Timestamp;
use sm2cards_core::clock::Clock;
use sm2cards_core::fail;
use sm2cards_core::review;
use sm2cards_core::sm2::review_event;

use crate::collection::Collection;
use crate::db::ReviewStore;
use crate::db::SessionId;

/// How many times a review is re-applied to a freshly read state before
/// giving up on a card that keeps changing underneath us.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Reviews acknowledged by the database.
    pub reviewed: usize,
    /// Reviews rated below Good. These cards were shown again.
    pub failed: usize,
    /// Distinct cards finished with a passing rating.
    pub completed: usize,
}

/// Run a study session over the due cards, reading ratings from `input`.
/// The session ends when every card has been passed or `input` runs out.
pub fn run_session<R: BufRead, W: Write>(
    collection: &Collection,
    clock: &dyn Clock,
    deck: Option<&str>,
    limit: Option<usize>,
    input: &mut R,
    output: &mut W,
) -> Fallible<SessionSummary> {
    let started_at = clock.now();
    let due = collection.select_due(started_at, deck)?;
    for skipped in &due.skipped {
        writeln!(output, "Skipping card {}: {}", skipped.card_id.short(), skipped.reason)?;
    }
    let mut queue: VecDeque<CardId> = due
        .cards
        .iter()
        .map(|study| study.card.id())
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    let mut summary = SessionSummary::default();
    if queue.is_empty() {
        writeln!(output, "No cards due.")?;
        return Ok(summary);
    }
    writeln!(
        output,
        "Drilling {} cards in {}.",
        queue.len(),
        collection.directory.display()
    )?;

    let session_id = collection.db.start_session(started_at)?;
    while let Some(card_id) = queue.pop_front() {
        let Some(card) = collection.card(card_id) else {
            continue;
        };
        writeln!(output)?;
        writeln!(output, "[{}] {}", card.deck_name(), card.front())?;
        write!(output, "Press Enter to reveal.")?;
        output.flush()?;
        if read_line(input)?.is_none() {
            break;
        }
        writeln!(output, "{}", card.back())?;
        let Some(rating) = read_rating(input, output)? else {
            break;
        };
        let state = submit_review(&collection.db, session_id, card_id, rating, clock.now())?;
        summary.reviewed += 1;
        if rating.is_pass() {
            summary.completed += 1;
            writeln!(output, "{rating}. Next review in {} days.", state.interval)?;
        } else {
            summary.failed += 1;
            writeln!(output, "{rating}. This card will be shown again.")?;
            queue.push_back(card_id);
        }
    }
    collection.db.finish_session(session_id, clock.now())?;

    writeln!(output)?;
    writeln!(
        output,
        "Session over: {} reviews, {} cards completed, {} forgotten.",
        summary.reviewed, summary.completed, summary.failed
    )?;
    Ok(summary)
}

/// Apply a rating to the card's stored state and persist the result with
/// its review event. On a stale write the state is read again and the
/// rating re-applied.
pub fn submit_review<S: ReviewStore>(
    store: &S,
    session_id: SessionId,
    card_id: CardId,
    rating: ReviewRating,
    now: Timestamp,
) -> Fallible<CardState> {
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let expected = store.get(card_id)?.card_state()?;
        let new = review(&expected, rating, now);
        let event = review_event(card_id, rating, &new, now);
        match store.commit_review(session_id, &expected, &new, &event) {
            Ok(()) => return Ok(new),
            Err(RepositoryError::StaleWrite(_)) => {
                log::warn!("Card {card_id} changed during review (attempt {attempt}), retrying.");
            }
            Err(e) => return Err(e.into()),
        }
    }
    fail(format!(
        "card {} kept changing, review not saved.",
        card_id.short()
    ))
}

fn read_line<R: BufRead>(input: &mut R) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn read_rating<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Fallible<Option<ReviewRating>> {
    loop {
        write!(
            output,
            "Rating (1 Forgot, 2 Hard, 3 Good, 4 Easy, 5 Perfect): "
        )?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match line.parse::<ReviewRating>() {
            Ok(rating) => return Ok(Some(rating)),
            Err(_) => writeln!(output, "Please enter a number from 1 to 5.")?,
        }
    }
}

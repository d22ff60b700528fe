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

use serde::Serialize;
use sm2cards_core::CardId;
use sm2cards_core::Fallible;
use sm2cards_core::Timestamp;

use crate::card::CardContent;
use crate::cmd::OutputFormat;
use crate::collection::Collection;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueEntry {
    card_id: CardId,
    deck_name: String,
    kind: &'static str,
    file: String,
    prompt: String,
    retention: f64,
    next_review: Option<Timestamp>,
}

/// Print the cards due at `now`, riskiest first.
pub fn list_due<W: Write>(
    collection: &Collection,
    now: Timestamp,
    deck: Option<&str>,
    format: OutputFormat,
    output: &mut W,
) -> Fallible<Vec<DueEntry>> {
    let due = collection.select_due(now, deck)?;
    let entries: Vec<DueEntry> = due
        .cards
        .iter()
        .map(|study| DueEntry {
            card_id: study.card.id(),
            deck_name: study.card.deck_name().to_string(),
            kind: match study.card.content() {
                CardContent::Basic { .. } => "basic",
                CardContent::Cloze { .. } => "cloze",
            },
            file: study.card.file_path().display().to_string(),
            prompt: study.card.front(),
            retention: study.retention,
            next_review: study.state.next_review,
        })
        .collect();
    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                writeln!(output, "No cards due.")?;
            }
            for entry in &entries {
                writeln!(
                    output,
                    "{}  {:>5.1}%  {}  {}",
                    entry.card_id.short(),
                    entry.retention * 100.0,
                    entry.deck_name,
                    entry.prompt.replace('\n', " ")
                )?;
            }
            if !due.skipped.is_empty() {
                writeln!(output, "Skipped {} malformed cards.", due.skipped.len())?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            writeln!(output, "{json}")?;
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use sm2cards_core::CardRepository;
    use sm2cards_core::CardState;
    use sm2cards_core::ReviewRating;
    use sm2cards_core::review;

    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;

    fn setup() -> Fallible<(Collection, Timestamp)> {
        let now: Timestamp = "2024-03-01T09:00:00Z".parse()?;
        let directory = create_tmp_copy_of_test_directory()?;
        Ok((Collection::new(Some(directory), now)?, now))
    }

    #[test]
    fn test_text_output() -> Fallible<()> {
        let (collection, now) = setup()?;
        let mut output = Vec::new();
        let entries = list_due(&collection, now, Some("geography"), OutputFormat::Text, &mut output)?;
        assert_eq!(entries.len(), 3);
        let output = String::from_utf8_lossy(&output);
        assert_eq!(output.lines().count(), 3);
        assert!(output.contains("[...] is the capital of Australia."));
        Ok(())
    }

    #[test]
    fn test_json_output() -> Fallible<()> {
        let (collection, now) = setup()?;
        let mut output = Vec::new();
        list_due(&collection, now, Some("math"), OutputFormat::Json, &mut output)?;
        let value: serde_json::Value = serde_json::from_slice(&output)?;
        let entries = value.as_array().map(Vec::len);
        assert_eq!(entries, Some(2));
        assert_eq!(value[0]["deckName"], "math");
        assert_eq!(value[0]["kind"], "basic");
        assert_eq!(value[0]["retention"], 0.0);
        assert!(value[0]["nextReview"].is_null());
        Ok(())
    }

    #[test]
    fn test_reviewed_cards_rank_after_new_ones() -> Fallible<()> {
        let (collection, now) = setup()?;
        let reviewed = collection.cards[0].id();
        let before = CardState::new();
        let after = review(&before, ReviewRating::Good, now);
        collection.db.put(reviewed, &before, &after)?;
        let later = now.add_days(3);
        let mut output = Vec::new();
        let entries = list_due(&collection, later, None, OutputFormat::Text, &mut output)?;
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[4].card_id, reviewed);
        assert!(entries[4].retention > 0.0);
        Ok(())
    }

    #[test]
    fn test_nothing_due() -> Fallible<()> {
        let (collection, now) = setup()?;
        let mut output = Vec::new();
        let entries = list_due(&collection, now, Some("history"), OutputFormat::Text, &mut output)?;
        assert!(entries.is_empty());
        assert_eq!(String::from_utf8_lossy(&output), "No cards due.\n");
        Ok(())
    }
}

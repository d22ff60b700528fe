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
use sm2cards_core::Fallible;
use sm2cards_core::RetentionStats;
use sm2cards_core::Timestamp;
use sm2cards_core::calculate_retention_stats;

use crate::cmd::OutputFormat;
use crate::collection::Collection;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    cards_in_deck_count: usize,
    cards_in_db_count: usize,
    due_count: usize,
    today_review_count: usize,
    retention: RetentionStats,
}

pub fn print_deck_stats<W: Write>(
    collection: &Collection,
    now: Timestamp,
    format: OutputFormat,
    output: &mut W,
) -> Fallible<Stats> {
    let events = collection.db.review_events()?;
    let stats = Stats {
        cards_in_deck_count: collection.cards.len(),
        cards_in_db_count: collection.db.card_count()?,
        due_count: collection.select_due(now, None)?.cards.len(),
        today_review_count: collection.db.today_review_count(now.date())?,
        retention: calculate_retention_stats(&events),
    };

    match format {
        OutputFormat::Text => {
            let r = &stats.retention;
            writeln!(output, "Cards in deck:     {}", stats.cards_in_deck_count)?;
            writeln!(output, "Cards in database: {}", stats.cards_in_db_count)?;
            writeln!(output, "Due now:           {}", stats.due_count)?;
            writeln!(output, "Reviewed today:    {}", stats.today_review_count)?;
            writeln!(output, "Total reviews:     {}", r.total_reviews)?;
            writeln!(
                output,
                "Success rate:      {:.1}% ({} of {})",
                r.success_rate * 100.0,
                r.successful_reviews,
                r.total_reviews
            )?;
            writeln!(output, "Average rating:    {:.2}", r.average_rating)?;
            writeln!(output, "Current streak:    {}", r.current_streak)?;
        }
        OutputFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            writeln!(output, "{stats_json}")?;
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use sm2cards_core::ReviewRating;

    use super::*;
    use crate::cmd::drill::submit_review;
    use crate::helper::create_tmp_copy_of_test_directory;

    #[test]
    fn test_stats_json() -> Fallible<()> {
        let now: Timestamp = "2024-03-01T09:00:00Z".parse()?;
        let directory = create_tmp_copy_of_test_directory()?;
        let collection = Collection::new(Some(directory), now)?;
        let session_id = collection.db.start_session(now)?;
        let ids: Vec<_> = collection.cards.iter().map(|card| card.id()).collect();
        submit_review(&collection.db, session_id, ids[0], ReviewRating::Forgot, now)?;
        submit_review(&collection.db, session_id, ids[1], ReviewRating::Good, now)?;
        submit_review(&collection.db, session_id, ids[2], ReviewRating::Perfect, now)?;

        let mut output = Vec::new();
        print_deck_stats(&collection, now, OutputFormat::Json, &mut output)?;
        let value: serde_json::Value = serde_json::from_slice(&output)?;
        assert_eq!(value["cardsInDeckCount"], 5);
        assert_eq!(value["cardsInDbCount"], 5);
        assert_eq!(value["dueCount"], 2);
        assert_eq!(value["todayReviewCount"], 3);
        assert_eq!(value["retention"]["totalReviews"], 3);
        assert_eq!(value["retention"]["successfulReviews"], 2);
        assert_eq!(value["retention"]["averageRating"], 3.0);
        assert_eq!(value["retention"]["currentStreak"], 2);
        Ok(())
    }

    #[test]
    fn test_stats_text_empty_history() -> Fallible<()> {
        let now: Timestamp = "2024-03-01T09:00:00Z".parse()?;
        let directory = create_tmp_copy_of_test_directory()?;
        let collection = Collection::new(Some(directory), now)?;
        let mut output = Vec::new();
        print_deck_stats(&collection, now, OutputFormat::Text, &mut output)?;
        let output = String::from_utf8_lossy(&output);
        assert!(output.contains("Due now:           5"));
        assert!(output.contains("Success rate:      0.0% (0 of 0)"));
        Ok(())
    }
}

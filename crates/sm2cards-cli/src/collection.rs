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

use std::collections::HashMap;
use std::env::current_dir;
use std::fs::read_to_string;
use std::path::PathBuf;
use std::time::Instant;

use sm2cards_core::CardId;
use sm2cards_core::CardRepository;
use sm2cards_core::CardState;
use sm2cards_core::ErrorReport;
use sm2cards_core::Fallible;
use sm2cards_core::SchedulerConfig;
use sm2cards_core::StoredCard;
use sm2cards_core::Timestamp;
use sm2cards_core::due::SkippedItem;
use sm2cards_core::fail;

use crate::card::Card;
use crate::db::Database;
use crate::parser::parse_deck;

const DATABASE_FILE: &str = "sm2cards.db";
const CONFIG_FILE: &str = "sm2cards.toml";

/// A deck directory: its parsed cards, its database, and its configuration.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub cards: Vec<Card>,
    pub config: SchedulerConfig,
    index: HashMap<CardId, usize>,
}

/// A due card, with the state and retention it was ranked by.
pub struct StudyCard<'a> {
    pub card: &'a Card,
    pub state: CardState,
    pub retention: f64,
}

pub struct DueCards<'a> {
    pub cards: Vec<StudyCard<'a>>,
    pub skipped: Vec<SkippedItem>,
}

impl Collection {
    /// Open the collection, adding any card not yet in the database and
    /// refiling cards that moved to another deck file.
    pub fn new(directory: Option<String>, now: Timestamp) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let config = {
            let config_path = directory.join(CONFIG_FILE);
            if config_path.exists() {
                SchedulerConfig::from_toml(&read_to_string(config_path)?)?
            } else {
                SchedulerConfig::default()
            }
        };

        let cards = {
            log::debug!("Loading deck...");
            let start = Instant::now();
            let cards = parse_deck(&directory)?;
            let end = Instant::now();
            let duration = end.duration_since(start).as_millis();
            log::debug!("Deck loaded in {duration}ms.");
            cards
        };

        let known = db.card_decks()?;
        let mut added = 0;
        for card in &cards {
            match known.get(&card.id()) {
                None => {
                    db.insert_card(card.id(), card.deck_name(), &CardState::new(), now)?;
                    added += 1;
                }
                Some(stored_deck) if stored_deck != card.deck_name() => {
                    db.set_deck_name(card.id(), card.deck_name())?;
                }
                Some(_) => {}
            }
        }
        if added > 0 {
            log::debug!("Added {added} new cards.");
        }

        let index = cards
            .iter()
            .enumerate()
            .map(|(i, card)| (card.id(), i))
            .collect();

        Ok(Self {
            directory,
            db,
            cards,
            config,
            index,
        })
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.index.get(&card_id).map(|&i| &self.cards[i])
    }

    /// Stored cards whose content is still present in the deck files.
    pub fn live_cards(&self, deck: Option<&str>) -> Fallible<Vec<StoredCard>> {
        let stored = match deck {
            Some(deck) => self.db.list_by_deck(deck)?,
            None => self.db.list_all()?,
        };
        Ok(stored
            .into_iter()
            .filter(|card| self.index.contains_key(&card.card_id))
            .collect())
    }

    /// The due cards, riskiest first.
    pub fn select_due(&self, now: Timestamp, deck: Option<&str>) -> Fallible<DueCards<'_>> {
        let live = self.live_cards(deck)?;
        let set = sm2cards_core::select_due(&live, now, deck);
        let cards = set
            .due
            .into_iter()
            .filter_map(|ranked| {
                self.card(ranked.item.card_id).map(|card| StudyCard {
                    card,
                    state: ranked.state,
                    retention: ranked.retention,
                })
            })
            .collect();
        Ok(DueCards {
            cards,
            skipped: set.skipped,
        })
    }
}

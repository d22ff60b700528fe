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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use sm2cards_core::CardId;
use sm2cards_core::CardRepository;
use sm2cards_core::CardState;
use sm2cards_core::Date;
use sm2cards_core::Fallible;
use sm2cards_core::RawCardState;
use sm2cards_core::RepositoryError;
use sm2cards_core::ReviewEvent;
use sm2cards_core::StoredCard;
use sm2cards_core::Timestamp;

pub type SessionId = i64;

/// A card store that can record a review atomically.
pub trait ReviewStore: CardRepository {
    /// Write a card's new state and append its review event, both or
    /// neither. The state write is compare-and-swap on `expected`.
    fn commit_review(
        &self,
        session_id: SessionId,
        expected: &CardState,
        new: &CardState,
        event: &ReviewEvent,
    ) -> Result<(), RepositoryError>;
}

const CARD_COLUMNS: &str = "card_id, deck_name, repetitions, ease_factor, interval_days, last_reviewed, next_review";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Return the deck each card in the database is filed under.
    pub fn card_decks(&self) -> Fallible<HashMap<CardId, String>> {
        let mut decks = HashMap::new();
        let conn = self.acquire()?;
        let mut stmt = conn.prepare("select card_id, deck_name from cards;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: CardId = row.get(0)?;
            let deck_name: String = row.get(1)?;
            decks.insert(id, deck_name);
        }
        Ok(decks)
    }

    /// File a card under another deck. Its memory state is kept.
    pub fn set_deck_name(&self, card_id: CardId, deck_name: &str) -> Fallible<()> {
        log::debug!("Moving card {card_id} to deck {deck_name}.");
        let conn = self.acquire()?;
        let sql = "update cards set deck_name = ? where card_id = ?;";
        conn.execute(sql, (deck_name, card_id))?;
        Ok(())
    }

    /// Add a new card to the database.
    pub fn insert_card(
        &self,
        card_id: CardId,
        deck_name: &str,
        state: &CardState,
        added_at: Timestamp,
    ) -> Fallible<()> {
        log::debug!("Adding new card: {card_id}");
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let sql = "insert into cards (card_id, deck_name, added_at, repetitions, ease_factor, interval_days, last_reviewed, next_review) values (?, ?, ?, ?, ?, ?, ?, ?);";
        tx.execute(
            sql,
            (
                card_id,
                deck_name,
                added_at,
                state.repetitions,
                state.ease_factor,
                state.interval,
                state.last_reviewed,
                state.next_review,
            ),
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn card_count(&self) -> Fallible<usize> {
        let conn = self.acquire()?;
        let count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn start_session(&self, started_at: Timestamp) -> Fallible<SessionId> {
        let conn = self.acquire()?;
        let sql = "insert into sessions (started_at) values (?) returning session_id;";
        let session_id: SessionId = conn.query_row(sql, [started_at], |row| row.get(0))?;
        log::debug!("Started session {session_id}.");
        Ok(session_id)
    }

    pub fn finish_session(&self, session_id: SessionId, ended_at: Timestamp) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "update sessions set ended_at = ? where session_id = ?;";
        conn.execute(sql, (ended_at, session_id))?;
        Ok(())
    }

    /// The full review history, oldest first.
    pub fn review_events(&self) -> Fallible<Vec<ReviewEvent>> {
        let conn = self.acquire()?;
        let sql = "select card_id, rating, reviewed_at, resulting_interval from reviews order by reviewed_at, review_id;";
        let mut stmt = conn.prepare(sql)?;
        let events = stmt
            .query_map([], |row| {
                Ok(ReviewEvent {
                    card_id: row.get(0)?,
                    rating: row.get(1)?,
                    timestamp: row.get(2)?,
                    resulting_interval: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// The number of reviews made on the given UTC day.
    pub fn today_review_count(&self, today: Date) -> Fallible<usize> {
        let conn = self.acquire()?;
        let sql = "select count(*) from reviews where substr(reviewed_at, 1, 10) = ?;";
        let count: i64 = conn.query_row(sql, [today], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Backend("database lock poisoned".to_string()))
    }
}

impl CardRepository for Database {
    fn get(&self, card_id: CardId) -> Result<StoredCard, RepositoryError> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([card_id])?;
        match rows.next()? {
            Some(row) => Ok(stored_card(row)?),
            None => Err(RepositoryError::NotFound(card_id)),
        }
    }

    fn put(
        &self,
        card_id: CardId,
        expected: &CardState,
        new: &CardState,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        compare_and_swap(&tx, card_id, expected, new)?;
        tx.commit()?;
        Ok(())
    }

    fn list_by_deck(&self, deck_name: &str) -> Result<Vec<StoredCard>, RepositoryError> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards where deck_name = ? order by card_id;");
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([deck_name], stored_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    fn list_all(&self) -> Result<Vec<StoredCard>, RepositoryError> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards order by card_id;");
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([], stored_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }
}

impl ReviewStore for Database {
    fn commit_review(
        &self,
        session_id: SessionId,
        expected: &CardState,
        new: &CardState,
        event: &ReviewEvent,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        compare_and_swap(&tx, event.card_id, expected, new)?;
        let sql = "insert into reviews (session_id, card_id, reviewed_at, rating, resulting_interval) values (?, ?, ?, ?, ?);";
        tx.execute(
            sql,
            (
                session_id,
                event.card_id,
                event.timestamp,
                event.rating,
                event.resulting_interval,
            ),
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn stored_card(row: &Row<'_>) -> rusqlite::Result<StoredCard> {
    Ok(StoredCard {
        card_id: row.get(0)?,
        deck_name: row.get(1)?,
        state: RawCardState {
            repetitions: row.get(2)?,
            ease_factor: row.get(3)?,
            interval: row.get(4)?,
            last_reviewed: row.get(5)?,
            next_review: row.get(6)?,
        },
    })
}

fn compare_and_swap(
    tx: &Transaction,
    card_id: CardId,
    expected: &CardState,
    new: &CardState,
) -> Result<(), RepositoryError> {
    let sql = "update cards set repetitions = ?, ease_factor = ?, interval_days = ?, last_reviewed = ?, next_review = ? where card_id = ? and repetitions = ? and next_review is ?;";
    let changed = tx.execute(
        sql,
        (
            new.repetitions,
            new.ease_factor,
            new.interval,
            new.last_reviewed,
            new.next_review,
            card_id,
            expected.repetitions,
            expected.next_review,
        ),
    )?;
    if changed == 0 {
        let exists: i64 = tx.query_row(
            "select count(*) from cards where card_id = ?;",
            [card_id],
            |row| row.get(0),
        )?;
        return if exists > 0 {
            log::debug!("Stale write to card {card_id}.");
            Err(RepositoryError::StaleWrite(card_id))
        } else {
            Err(RepositoryError::NotFound(card_id))
        };
    }
    Ok(())
}

fn schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

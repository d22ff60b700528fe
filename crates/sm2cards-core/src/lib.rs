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

//! sm2cards-core: the scheduling engine of sm2cards.
//!
//! Every operation here is a pure function over caller-owned values:
//! - `sm2`: the SM-2 review transition
//! - `due`: selecting and ranking due cards
//! - `leveling`: spreading clustered reviews over nearby days
//! - `retention`: forgetting-curve estimates and review statistics
//!
//! Storage and time are supplied by the caller through `repository` and
//! `clock`.

pub mod clock;
pub mod config;
pub mod due;
pub mod error;
pub mod leveling;
pub mod repository;
pub mod retention;
pub mod sm2;
pub mod types;

// Re-exports for convenience
pub use config::SchedulerConfig;
pub use due::{DueSet, Schedulable, select_due};
pub use error::{ErrorReport, Fallible, MalformedItem, ScheduleError, fail};
pub use leveling::{ScheduledItem, level_load};
pub use repository::{CardRepository, MemoryRepository, RepositoryError, StoredCard};
pub use retention::{RetentionStats, calculate_retention_stats, estimate_retention};
pub use sm2::review;
pub use types::card_id::CardId;
pub use types::card_state::{CardState, RawCardState};
pub use types::date::Date;
pub use types::rating::ReviewRating;
pub use types::review_event::ReviewEvent;
pub use types::timestamp::Timestamp;

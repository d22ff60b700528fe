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

use serde::Serialize;

use crate::types::card_id::CardId;
use crate::types::rating::ReviewRating;
use crate::types::timestamp::Timestamp;

/// An immutable record of one review, appended to the history once per
/// scheduling transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub rating: ReviewRating,
    pub timestamp: Timestamp,
    /// The interval, in days, the review produced.
    pub resulting_interval: u32,
}

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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use thiserror::Error;

use crate::repository::RepositoryError;

/// Precondition violations raised by the scheduling functions. These are
/// programming errors upstream, never transient conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid rating {0}: ratings go from 1 (forgot) to 5 (perfect)")]
    InvalidRating(u8),
    #[error("`{0}` is not a rating: ratings go from 1 (forgot) to 5 (perfect)")]
    UnparseableRating(String),
    #[error("invalid capacity {0}: at least one review per day is required")]
    InvalidCapacity(i64),
    #[error("malformed card state: {0}")]
    MalformedItem(#[from] MalformedItem),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a stored card state could not be turned into a [`CardState`].
///
/// [`CardState`]: crate::types::card_state::CardState
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedItem {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("ease factor {0} is below the minimum of 1.3")]
    EaseTooLow(f64),
    #[error("ease factor is not a finite number")]
    EaseNotFinite,
    #[error("card has {0} repetitions but a zero interval")]
    ZeroInterval(u32),
    #[error("next review is set but the card was never reviewed")]
    ScheduledButNeverReviewed,
    #[error("next review is earlier than the last review")]
    ScheduledBeforeLastReview,
}

/// The application-level error: a message for the user.
#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl From<ScheduleError> for ErrorReport {
    fn from(value: ScheduleError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

impl From<MalformedItem> for ErrorReport {
    fn from(value: MalformedItem) -> Self {
        ErrorReport::new(format!("malformed card state: {value}"))
    }
}

impl From<RepositoryError> for ErrorReport {
    fn from(value: RepositoryError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {value}"))
    }
}

impl From<std::fmt::Error> for ErrorReport {
    fn from(value: std::fmt::Error) -> Self {
        ErrorReport::new(format!("formatting error: {value}"))
    }
}

impl From<chrono::ParseError> for ErrorReport {
    fn from(value: chrono::ParseError) -> Self {
        ErrorReport::new(format!("invalid date or timestamp: {value}"))
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport::new(format!("invalid configuration: {value}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::new(format!("JSON error: {value}"))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for ErrorReport {
    fn from(value: rusqlite::Error) -> Self {
        ErrorReport::new(format!("database error: {value}"))
    }
}

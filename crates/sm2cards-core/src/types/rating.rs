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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

#[cfg(feature = "sqlite")]
use rusqlite::ToSql;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSql;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSqlError;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSqlResult;
#[cfg(feature = "sqlite")]
use rusqlite::types::ToSqlOutput;
#[cfg(feature = "sqlite")]
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ScheduleError;

/// The learner's self-assessed recall quality for one review.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReviewRating {
    Forgot = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
    Perfect = 5,
}

impl ReviewRating {
    pub const ALL: [ReviewRating; 5] = [
        ReviewRating::Forgot,
        ReviewRating::Hard,
        ReviewRating::Good,
        ReviewRating::Easy,
        ReviewRating::Perfect,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Ratings of 3 and above count as a successful recall.
    pub fn is_pass(self) -> bool {
        self.value() >= 3
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewRating::Forgot => "Forgot",
            ReviewRating::Hard => "Hard",
            ReviewRating::Good => "Good",
            ReviewRating::Easy => "Easy",
            ReviewRating::Perfect => "Perfect",
        }
    }
}

impl TryFrom<u8> for ReviewRating {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ReviewRating::Forgot),
            2 => Ok(ReviewRating::Hard),
            3 => Ok(ReviewRating::Good),
            4 => Ok(ReviewRating::Easy),
            5 => Ok(ReviewRating::Perfect),
            _ => Err(ScheduleError::InvalidRating(value)),
        }
    }
}

impl From<ReviewRating> for u8 {
    fn from(value: ReviewRating) -> Self {
        value.value()
    }
}

impl FromStr for ReviewRating {
    type Err = ScheduleError;

    /// Parse a rating typed by the learner, e.g. `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u8 = s
            .parse()
            .map_err(|_| ScheduleError::UnparseableRating(s.to_string()))?;
        ReviewRating::try_from(value)
    }
}

impl Display for ReviewRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for ReviewRating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.value())))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for ReviewRating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: i64 = FromSql::column_result(value)?;
        let value = u8::try_from(value).map_err(|_| FromSqlError::OutOfRange(value))?;
        ReviewRating::try_from(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_integer() -> Result<(), ScheduleError> {
        for rating in ReviewRating::ALL {
            assert_eq!(ReviewRating::try_from(rating.value())?, rating);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(
            ReviewRating::try_from(0),
            Err(ScheduleError::InvalidRating(0))
        );
        assert_eq!(
            ReviewRating::try_from(6),
            Err(ScheduleError::InvalidRating(6))
        );
    }

    #[test]
    fn test_parse() -> Result<(), ScheduleError> {
        assert_eq!(" 4\n".parse::<ReviewRating>()?, ReviewRating::Easy);
        assert_eq!(
            "0".parse::<ReviewRating>(),
            Err(ScheduleError::InvalidRating(0))
        );
        assert_eq!(
            "good".parse::<ReviewRating>(),
            Err(ScheduleError::UnparseableRating("good".to_string()))
        );
        assert_eq!(
            " 300 ".parse::<ReviewRating>(),
            Err(ScheduleError::UnparseableRating("300".to_string()))
        );
        assert!(
            ScheduleError::UnparseableRating("good".to_string())
                .to_string()
                .starts_with("`good` is not a rating")
        );
        Ok(())
    }

    #[test]
    fn test_pass_threshold() {
        assert!(!ReviewRating::Forgot.is_pass());
        assert!(!ReviewRating::Hard.is_pass());
        assert!(ReviewRating::Good.is_pass());
        assert!(ReviewRating::Easy.is_pass());
        assert!(ReviewRating::Perfect.is_pass());
    }

    #[test]
    fn test_serializes_as_integer() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&ReviewRating::Easy)?, "4");
        let rating: ReviewRating = serde_json::from_str("2")?;
        assert_eq!(rating, ReviewRating::Hard);
        assert!(serde_json::from_str::<ReviewRating>("9").is_err());
        Ok(())
    }
}

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

use chrono::Days;
use chrono::NaiveDate;
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

const FORMAT: &str = "%Y-%m-%d";

/// A calendar day.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Saturates at the largest representable date.
    pub fn add_days(self, days: u32) -> Self {
        Self(
            self.0
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        )
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(NaiveDate::parse_from_str(s, FORMAT)?))
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for Date {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for Date {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Date::from_str(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_display_and_parse() -> Fallible<()> {
        let date: Date = "2024-02-29".parse()?;
        assert_eq!(date.to_string(), "2024-02-29");
        Ok(())
    }

    #[test]
    fn test_add_days_crosses_month() -> Fallible<()> {
        let date: Date = "2024-01-30".parse()?;
        assert_eq!(date.add_days(3), "2024-02-02".parse::<Date>()?);
        Ok(())
    }

    #[test]
    fn test_add_days_saturates() {
        let date = Date::new(NaiveDate::MAX);
        assert_eq!(date.add_days(1), date);
    }
}

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

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
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

use crate::types::date::Date;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A UTC instant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The UTC calendar day this instant falls on.
    pub fn date(self) -> Date {
        Date::new(self.0.date_naive())
    }

    /// Saturates at the largest representable instant.
    pub fn add_days(self, days: u32) -> Self {
        let ts = self
            .0
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(ts)
    }

    /// Fractional days elapsed since `earlier`. Negative if `earlier` is in
    /// the future.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        let elapsed = self.0.signed_duration_since(earlier.0);
        elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    /// The same time of day on another calendar day.
    pub fn on_date(self, date: Date) -> Self {
        Self(date.into_inner().and_time(self.0.time()).and_utc())
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc)))
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_rfc3339()))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Timestamp::from_str(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

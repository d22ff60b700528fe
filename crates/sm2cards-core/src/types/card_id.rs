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

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

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
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A card's identity: the BLAKE3 hash of its content. Wrapped because blake3
/// does not implement Ord and PartialOrd.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CardId {
    inner: blake3::Hash,
}

impl CardId {
    pub fn hash_bytes(bytes: &[u8]) -> Self {
        Self {
            inner: blake3::hash(bytes),
        }
    }

    pub fn to_hex(self) -> String {
        self.inner.to_hex().to_string()
    }

    /// The first eight hex digits, for display.
    pub fn short(self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(8);
        hex
    }

    /// The identity of a card of the given kind with the given content
    /// fields. Fields are length-prefixed, so text moved from one field into
    /// its neighbour yields a different card.
    pub fn from_fields(kind: &str, fields: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_bytes());
        for field in fields {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Self {
            inner: hasher.finalize(),
        }
    }

    pub fn from_hex(s: &str) -> Fallible<Self> {
        let inner = blake3::Hash::from_hex(s).map_err(|_| {
            ErrorReport::new(format!("`{s}` is not a card ID: expected 64 hex digits"))
        })?;
        Ok(Self { inner })
    }
}

impl PartialOrd for CardId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CardId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.as_bytes().cmp(other.inner.as_bytes())
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for CardId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for CardId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_hex()))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for CardId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        CardId::from_hex(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = CardId::hash_bytes(b"test");
        assert_eq!(
            id.to_string(),
            "4878ca0425c739fa427f7eda20fe845f6b2e46ba5fe2a14df5b1e32f50603215"
        );
        assert_eq!(id.short(), "4878ca04");
    }

    #[test]
    fn test_hex_roundtrip() -> Fallible<()> {
        let id = CardId::hash_bytes(b"test");
        assert_eq!(CardId::from_hex(&id.to_hex())?, id);
        Ok(())
    }

    #[test]
    fn test_invalid_hex() {
        let result = CardId::from_hex("not a hash");
        assert_eq!(
            result,
            Err(ErrorReport::new(
                "`not a hash` is not a card ID: expected 64 hex digits"
            ))
        );
    }

    #[test]
    fn test_ordering() -> Fallible<()> {
        let a =
            CardId::from_hex("0000000000000000000000000000000000000000000000000000000000000000")?;
        let b =
            CardId::from_hex("0000000000000000000000000000000000000000000000000000000000000001")?;
        assert!(a < b);
        Ok(())
    }

    #[test]
    fn test_fields_do_not_run_together() {
        let a = CardId::from_fields("Basic", &[b"ab", b"c"]);
        let b = CardId::from_fields("Basic", &[b"a", b"bc"]);
        assert_ne!(a, b);
        assert_ne!(a, CardId::from_fields("Cloze", &[b"ab", b"c"]));
        assert_eq!(a, CardId::from_fields("Basic", &[b"ab", b"c"]));
    }
}

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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ScheduleError;

const DEFAULT_MAX_PER_DAY: i64 = 50;
const DEFAULT_BOUNDED_SCAN_DAYS: u32 = 3;

/// Load leveling options. These are the only tunable knobs: the SM-2
/// constants are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// The most reviews to place on one calendar day.
    pub max_per_day: i64,
    /// How many days past its original date a review may be pushed.
    pub bounded_scan_days: u32,
}

impl SchedulerConfig {
    pub fn new(max_per_day: i64, bounded_scan_days: u32) -> Result<Self, ScheduleError> {
        let config = Self {
            max_per_day,
            bounded_scan_days,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document such as:
    ///
    /// ```toml
    /// max_per_day = 30
    /// bounded_scan_days = 2
    /// ```
    ///
    /// Missing keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ScheduleError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ScheduleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.max_per_day <= 0 {
            return Err(ScheduleError::InvalidCapacity(self.max_per_day));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_per_day: DEFAULT_MAX_PER_DAY,
            bounded_scan_days: DEFAULT_BOUNDED_SCAN_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), ScheduleError> {
        assert_eq!(SchedulerConfig::from_toml("")?, SchedulerConfig::default());
        Ok(())
    }

    #[test]
    fn test_partial() -> Result<(), ScheduleError> {
        let config = SchedulerConfig::from_toml("max_per_day = 12")?;
        assert_eq!(config.max_per_day, 12);
        assert_eq!(config.bounded_scan_days, DEFAULT_BOUNDED_SCAN_DAYS);
        Ok(())
    }

    #[test]
    fn test_full() -> Result<(), ScheduleError> {
        let config = SchedulerConfig::from_toml("max_per_day = 2\nbounded_scan_days = 5\n")?;
        assert_eq!(config, SchedulerConfig::new(2, 5)?);
        Ok(())
    }

    #[test]
    fn test_non_positive_capacity() {
        assert_eq!(
            SchedulerConfig::from_toml("max_per_day = 0"),
            Err(ScheduleError::InvalidCapacity(0))
        );
        assert_eq!(
            SchedulerConfig::new(-4, 3),
            Err(ScheduleError::InvalidCapacity(-4))
        );
    }

    #[test]
    fn test_unknown_key() {
        let result = SchedulerConfig::from_toml("max_per_dya = 3");
        assert!(matches!(result, Err(ScheduleError::InvalidConfig(_))));
    }

    #[test]
    fn test_wrong_type() {
        let result = SchedulerConfig::from_toml("bounded_scan_days = -1");
        assert!(matches!(result, Err(ScheduleError::InvalidConfig(_))));
    }
}

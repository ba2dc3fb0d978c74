//! Locale settings that influence value coercion

use chrono::{FixedOffset, Offset, Utc};

/// Order of the day and month fields when reading slash dates like "3/4/2020"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateOrder {
    /// Month first (US style)
    #[default]
    Mdy,
    /// Day first
    Dmy,
}

/// Serial date epoch used by a workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01, with the fictitious 1900-02-29 at serial 60
    #[default]
    Excel1900,
    /// Serial 0 is 1904-01-01
    Excel1904,
}

/// Locale configuration used when text is coerced to numbers and dates
///
/// This replaces any process-wide locale: everything that depends on the
/// user's region travels with the evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueLocale {
    /// Day/month ordering for ambiguous slash dates
    pub date_order: DateOrder,
    /// Serial date epoch
    pub date_system: DateSystem,
    /// Offset of local time from UTC, in minutes (used by TODAY/NOW)
    pub utc_offset_minutes: i32,
}

impl ValueLocale {
    /// Create a locale with the given date order and default everything else
    pub fn with_date_order(date_order: DateOrder) -> Self {
        Self {
            date_order,
            ..Self::default()
        }
    }

    /// Set the date system
    pub fn date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    /// Set the UTC offset in minutes
    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Get the UTC offset as a chrono fixed offset
    ///
    /// Offsets outside +/- 24 hours fall back to UTC.
    pub fn fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }
}

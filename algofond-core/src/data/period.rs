//! Trailing fetch windows such as `2y`, `6mo`, `90d`.

use super::provider::DataError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// A look-back window ending at the fetch date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrailingPeriod {
    pub amount: u32,
    pub unit: PeriodUnit,
}

impl TrailingPeriod {
    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: PeriodUnit::Days,
        }
    }

    pub fn months(amount: u32) -> Self {
        Self {
            amount,
            unit: PeriodUnit::Months,
        }
    }

    pub fn years(amount: u32) -> Self {
        Self {
            amount,
            unit: PeriodUnit::Years,
        }
    }

    /// First calendar date of the window that ends on `end`.
    pub fn start_from(&self, end: NaiveDate) -> NaiveDate {
        let n = self.amount;
        let start = match self.unit {
            PeriodUnit::Days => end.checked_sub_days(chrono::Days::new(n as u64)),
            PeriodUnit::Weeks => end.checked_sub_days(chrono::Days::new(n as u64 * 7)),
            PeriodUnit::Months => end.checked_sub_months(Months::new(n)),
            PeriodUnit::Years => end.checked_sub_months(Months::new(n.saturating_mul(12))),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for TrailingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            PeriodUnit::Days => "d",
            PeriodUnit::Weeks => "w",
            PeriodUnit::Months => "mo",
            PeriodUnit::Years => "y",
        };
        write!(f, "{}{suffix}", self.amount)
    }
}

impl FromStr for TrailingPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| DataError::InvalidPeriod(s.to_string()))?;
        let (digits, suffix) = s.split_at(split);
        let amount: u32 = digits
            .parse()
            .map_err(|_| DataError::InvalidPeriod(s.to_string()))?;
        if amount == 0 {
            return Err(DataError::InvalidPeriod(s.to_string()));
        }
        let unit = match suffix {
            "d" => PeriodUnit::Days,
            "w" | "wk" => PeriodUnit::Weeks,
            "mo" => PeriodUnit::Months,
            "y" => PeriodUnit::Years,
            _ => return Err(DataError::InvalidPeriod(s.to_string())),
        };
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for TrailingPeriod {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrailingPeriod> for String {
    fn from(period: TrailingPeriod) -> Self {
        period.to_string()
    }
}

//! Contribution calendar domain types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordinal intensity bucket of a calendar cell.
///
/// Serialized as the integers `0..=4`, matching the source's `data-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ContributionLevel {
    None,
    FirstQuartile,
    SecondQuartile,
    ThirdQuartile,
    FourthQuartile,
}

impl TryFrom<u8> for ContributionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ContributionLevel::None),
            1 => Ok(ContributionLevel::FirstQuartile),
            2 => Ok(ContributionLevel::SecondQuartile),
            3 => Ok(ContributionLevel::ThirdQuartile),
            4 => Ok(ContributionLevel::FourthQuartile),
            other => Err(format!("contribution level out of range: {other}")),
        }
    }
}

impl From<ContributionLevel> for u8 {
    fn from(level: ContributionLevel) -> Self {
        match level {
            ContributionLevel::None => 0,
            ContributionLevel::FirstQuartile => 1,
            ContributionLevel::SecondQuartile => 2,
            ContributionLevel::ThirdQuartile => 3,
            ContributionLevel::FourthQuartile => 4,
        }
    }
}

/// One calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub count: u32,
    pub level: ContributionLevel,
}

/// Parsed calendar for a single year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearResult {
    pub year: i32,
    /// Days in ascending date order.
    pub days: Vec<DayRecord>,
    /// Sum of `count` over `days`.
    pub total: u64,
}

impl YearResult {
    /// Build a year result, sorting days and deriving the total.
    pub fn new(year: i32, mut days: Vec<DayRecord>) -> Self {
        days.sort_by_key(|d| d.date);
        let total = days.iter().map(|d| u64::from(d.count)).sum();
        Self { year, days, total }
    }
}

/// Aggregated result over every included year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// Sum of every included year's total.
    pub total: u64,
    /// Included years in ascending order.
    pub years: BTreeMap<i32, YearResult>,
}

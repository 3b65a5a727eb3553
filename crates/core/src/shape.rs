//! Response shaping: flat day list or year-grouped mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AggregatedResponse, DayRecord};
use crate::query::ResponseFormat;

/// `{total, days}` with every day across included years in date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatResponse {
    pub total: u64,
    pub days: Vec<DayRecord>,
}

/// Per-year entry of the nested shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub total: u64,
    pub days: Vec<DayRecord>,
}

/// `{total, years: {year: {total, days}}}` with years ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedResponse {
    pub total: u64,
    pub years: BTreeMap<i32, YearSummary>,
}

/// The body returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapedResponse {
    Flat(FlatResponse),
    Nested(NestedResponse),
}

/// Render an aggregated response in the requested format.
pub fn shape(response: &AggregatedResponse, format: ResponseFormat) -> ShapedResponse {
    match format {
        ResponseFormat::Flat => {
            let mut days: Vec<DayRecord> = response.years.values().flat_map(|r| r.days.iter().copied()).collect();
            days.sort_by_key(|d| d.date);
            ShapedResponse::Flat(FlatResponse { total: response.total, days })
        }
        ResponseFormat::Nested => {
            let years = response
                .years
                .iter()
                .map(|(&year, r)| (year, YearSummary { total: r.total, days: r.days.clone() }))
                .collect();
            ShapedResponse::Nested(NestedResponse { total: response.total, years })
        }
    }
}

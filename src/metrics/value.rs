//! Numeric diagnostic values emitted by metrics.
//!
//! Unit identifiers and grouping-key field names are a stable contract
//! consumed by the reporting layer; they serialize under their exact wire
//! spellings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed unit enumeration for numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "normalizedPercentage_smallerIsBetter")]
    NormalizedPercentageSmallerIsBetter,

    #[serde(rename = "timeDurationInMs_smallerIsBetter")]
    TimeDurationInMsSmallerIsBetter,

    #[serde(rename = "unitlessNumber_smallerIsBetter")]
    UnitlessNumberSmallerIsBetter,
}

/// One numeric diagnostic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericValue {
    pub name: String,

    pub unit: Unit,

    pub value: f64,

    pub description: String,

    /// Keys the reporting layer groups by, e.g. the owning expectation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub grouping_keys: BTreeMap<String, String>,

    /// Named lists of supporting values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub diagnostics: BTreeMap<String, Vec<NumericValue>>,
}

impl NumericValue {
    pub fn new(name: &str, unit: Unit, value: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            unit,
            value,
            description: description.to_string(),
            grouping_keys: BTreeMap::new(),
            diagnostics: BTreeMap::new(),
        }
    }
}

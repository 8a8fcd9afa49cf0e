use serde::{Serialize, Serializer};
use thiserror::Error;

/// Marker written wherever a named field could not be located.
pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Result payload has no content items")]
    MissingContents,
}

/// A single extracted scalar, or the not-found sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    NotFound,
}

impl FieldValue {
    pub fn is_found(&self) -> bool {
        !matches!(self, FieldValue::NotFound)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::NotFound => serializer.serialize_str(NOT_FOUND),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::NotFound => write!(f, "{NOT_FOUND}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    pub billing_period: FieldValue,
    pub electricity_consumption: FieldValue,
}

/// Per-period breakdown of a multi-period bill.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodList {
    Parsed(Vec<PeriodRecord>),
    /// Embedded JSON that did not parse, passed through verbatim.
    Unparsed(String),
    Missing,
}

impl Serialize for PeriodList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PeriodList::Parsed(periods) => periods.serialize(serializer),
            PeriodList::Unparsed(raw) => serializer.serialize_str(raw),
            PeriodList::Missing => serializer.serialize_str(NOT_FOUND),
        }
    }
}

/// Normalized view of one analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    pub billing_period: FieldValue,
    pub electricity_consumption: FieldValue,
    pub periods: PeriodList,
}

impl ExtractedRecord {
    /// All fields absent; what a payload without a field map yields.
    pub fn not_found() -> Self {
        Self {
            billing_period: FieldValue::NotFound,
            electricity_consumption: FieldValue::NotFound,
            periods: PeriodList::Missing,
        }
    }

    /// Sum of per-period consumption, when a period list was parsed.
    pub fn total_period_consumption(&self) -> Option<f64> {
        match &self.periods {
            PeriodList::Parsed(periods) => Some(
                periods
                    .iter()
                    .filter_map(|p| p.electricity_consumption.as_number())
                    .sum(),
            ),
            _ => None,
        }
    }
}

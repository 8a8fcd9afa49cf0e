use billsight_core::AnalysisResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lookup::{loose_quantity_of, loose_text_of, quantity_of, text_of, FieldKey};
use crate::types::{ExtractError, ExtractedRecord, FieldValue, PeriodList, PeriodRecord};

/// Key names the normalizer looks for, with their localized fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldKeys {
    pub billing_period: FieldKey,
    pub consumption: FieldKey,
    pub billing_data: FieldKey,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            billing_period: FieldKey::new("BillingPeriod", &["計費期間", "账单期间"]),
            consumption: FieldKey::new("ElectricityConsumption", &["用電量", "用电量"]),
            billing_data: FieldKey::new("BillingData", &["賬單資料"]),
        }
    }
}

/// Turns a terminal analysis payload into an [`ExtractedRecord`].
///
/// Missing or misshapen fields degrade to sentinels; only a payload with no
/// content items at all is rejected.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    keys: FieldKeys,
}

impl Normalizer {
    pub fn new(keys: FieldKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &FieldKeys {
        &self.keys
    }

    pub fn extract(&self, result: &AnalysisResult) -> Result<ExtractedRecord, ExtractError> {
        let first = result
            .contents()
            .and_then(|c| c.first())
            .ok_or(ExtractError::MissingContents)?;

        let Some(fields) = first.get("fields").and_then(Value::as_object) else {
            tracing::debug!("No field map in first content item");
            return Ok(ExtractedRecord::not_found());
        };

        Ok(ExtractedRecord {
            billing_period: self.keys.billing_period.resolve(fields, text_of),
            electricity_consumption: self.keys.consumption.resolve(fields, quantity_of),
            periods: self.periods(fields),
        })
    }

    /// The first name whose field yields a period list wins.
    fn periods(&self, fields: &Map<String, Value>) -> PeriodList {
        self.keys
            .billing_data
            .names()
            .filter_map(|name| fields.get(name))
            .map(|field| self.period_field(field))
            .find(|periods| *periods != PeriodList::Missing)
            .unwrap_or(PeriodList::Missing)
    }

    fn period_field(&self, field: &Value) -> PeriodList {
        if let Some(items) = field.get("valueArray").and_then(Value::as_array) {
            let periods = items
                .iter()
                .map(|item| self.tagged_period(item.get("valueObject").and_then(Value::as_object)))
                .collect();
            return PeriodList::Parsed(periods);
        }

        match field.get("valueString").and_then(Value::as_str) {
            Some(raw) => self.embedded_periods(raw),
            None => PeriodList::Missing,
        }
    }

    fn tagged_period(&self, object: Option<&Map<String, Value>>) -> PeriodRecord {
        let Some(object) = object else {
            return PeriodRecord {
                billing_period: FieldValue::NotFound,
                electricity_consumption: FieldValue::NotFound,
            };
        };
        PeriodRecord {
            billing_period: self.keys.billing_period.resolve(object, text_of),
            electricity_consumption: self.keys.consumption.resolve(object, quantity_of),
        }
    }

    /// Some analyzers return the period table as a JSON string. Anything that
    /// is not a JSON array is handed back untouched.
    fn embedded_periods(&self, raw: &str) -> PeriodList {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => PeriodList::Parsed(
                items
                    .iter()
                    .map(|item| self.loose_period(item.as_object()))
                    .collect(),
            ),
            Ok(_) | Err(_) => {
                tracing::debug!(raw, "Embedded billing data is not a JSON array, passing through");
                PeriodList::Unparsed(raw.to_string())
            }
        }
    }

    fn loose_period(&self, object: Option<&Map<String, Value>>) -> PeriodRecord {
        let resolve = |key: &FieldKey, reader: fn(&Value) -> FieldValue| {
            object.map_or(FieldValue::NotFound, |o| key.resolve(o, reader))
        };
        PeriodRecord {
            billing_period: resolve(&self.keys.billing_period, loose_text_of),
            electricity_consumption: resolve(&self.keys.consumption, loose_quantity_of),
        }
    }
}

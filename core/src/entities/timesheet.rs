//! Timesheet line returned by `timesheet/getTimeSheetData`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::error::PrismResult;
use crate::response::from_value;

/// One pay line of a batch. Numbers default to 0.0, `charge_date` to `None`.
///
/// The vendor uses snake_case keys for this record, unlike the rest of the
/// API, and `hrs_units_paid` for the paid hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timesheet {
    #[serde(deserialize_with = "de::optional_string")]
    pub charge_date: Option<String>,
    #[serde(deserialize_with = "de::string")]
    pub pay_code: String,
    #[serde(rename = "hrs_units_paid", deserialize_with = "de::number")]
    pub hours_paid: f64,
    #[serde(deserialize_with = "de::number")]
    pub hours_worked: f64,
    #[serde(deserialize_with = "de::number")]
    pub pay_rate: f64,
    #[serde(deserialize_with = "de::number")]
    pub pay_amount: f64,
}

impl Timesheet {
    pub fn from_api_response(value: Value) -> PrismResult<Self> {
        from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrismError;
    use serde_json::json;

    #[test]
    fn maps_vendor_keys() {
        let line = Timesheet::from_api_response(json!({
            "charge_date": "2024-01-01",
            "pay_code": "REG",
            "hrs_units_paid": "8.00",
            "hours_worked": 8,
            "pay_rate": 21.5,
            "pay_amount": "172.00"
        }))
        .unwrap();
        assert_eq!(line.charge_date.as_deref(), Some("2024-01-01"));
        assert_eq!(line.pay_code, "REG");
        assert_eq!(line.hours_paid, 8.0);
        assert_eq!(line.hours_worked, 8.0);
        assert_eq!(line.pay_rate, 21.5);
        assert_eq!(line.pay_amount, 172.0);
    }

    #[test]
    fn empty_record_uses_defaults() {
        let line = Timesheet::from_api_response(json!({})).unwrap();
        assert_eq!(line, Timesheet::default());
        assert!(line.charge_date.is_none());
        assert_eq!(line.hours_paid, 0.0);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let err = Timesheet::from_api_response(json!({"pay_amount": "lots"})).unwrap_err();
        assert!(matches!(err, PrismError::Deserialization(_)));
    }
}

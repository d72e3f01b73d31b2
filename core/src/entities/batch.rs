//! Payroll batch records.
//!
//! # Design
//! A batch is identified by `batch_id` + `client_id`. The `checksum` read
//! with a batch is the vendor's optimistic-concurrency token: an update or
//! finalize must echo the checksum from the most recent read, and the
//! server rejects a stale one. Nothing here caches or refreshes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::error::PrismResult;
use crate::response::from_value;

/// Timesheet batch status that allows finalizing.
pub const READY_STATUS: &str = "TS.READY";

/// Error code the vendor reports when nothing is wrong.
pub const NO_ERROR_CODE: &str = "0";

/// One row of `payroll/getBatchListByDate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchListEntry {
    #[serde(deserialize_with = "de::string")]
    pub batch_id: String,
    #[serde(deserialize_with = "de::string")]
    pub batch_type: String,
    #[serde(deserialize_with = "de::string")]
    pub batch_status: String,
    #[serde(deserialize_with = "de::string")]
    pub pay_date: String,
    #[serde(deserialize_with = "de::string")]
    pub description: String,
}

/// Batch detail from `payroll/getBatchInfo`, kept so an update can echo
/// its checksum and control fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayrollBatch {
    #[serde(deserialize_with = "de::string")]
    pub batch_id: String,
    #[serde(deserialize_with = "de::string")]
    pub client_id: String,
    #[serde(deserialize_with = "de::string")]
    pub batch_type: String,
    #[serde(deserialize_with = "de::string")]
    pub batch_status: String,
    #[serde(deserialize_with = "de::string")]
    pub checksum: String,
    #[serde(deserialize_with = "de::string")]
    pub pay_date: String,
    #[serde(deserialize_with = "de::string")]
    pub period_start: String,
    #[serde(deserialize_with = "de::string")]
    pub period_end: String,
    #[serde(deserialize_with = "de::integer")]
    pub weeks_worked: i64,
    #[serde(deserialize_with = "de::string")]
    pub processor: String,
    #[serde(deserialize_with = "de::string")]
    pub cutoff_date: String,
    #[serde(deserialize_with = "de::string")]
    pub delivery_date: String,
    #[serde(deserialize_with = "de::integer")]
    pub deduct_period: i64,
}

impl PayrollBatch {
    /// Accepts either `{"batchInfo": {...}}` or the bare record.
    pub fn from_api_response(value: Value) -> PrismResult<Self> {
        let record = match value {
            Value::Object(mut map) if map.contains_key("batchInfo") => {
                map.remove("batchInfo").unwrap_or(Value::Null)
            }
            other => other,
        };
        from_value(record)
    }

    /// Deduction period to send on update; the vendor rejects 0 or less.
    pub fn effective_deduct_period(&self) -> i64 {
        if self.deduct_period > 0 {
            self.deduct_period
        } else {
            1
        }
    }
}

/// Current state of a batch's timesheet upload, from
/// `timesheet/getBatchStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchStatus {
    #[serde(deserialize_with = "de::string")]
    pub batch_status: String,
    #[serde(deserialize_with = "de::string")]
    pub error_code: String,
    #[serde(deserialize_with = "de::string")]
    pub error_message: String,
    #[serde(deserialize_with = "de::string")]
    pub checksum: String,
}

impl BatchStatus {
    pub fn from_api_response(value: Value) -> PrismResult<Self> {
        from_value(value)
    }

    /// True only when the status is exactly `TS.READY` and the error code
    /// is exactly `"0"`.
    pub fn is_ready(&self) -> bool {
        self.batch_status == READY_STATUS && self.error_code == NO_ERROR_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrismError;
    use serde_json::json;

    #[test]
    fn payroll_batch_unwraps_batch_info() {
        let batch = PayrollBatch::from_api_response(json!({
            "batchInfo": {
                "batchId": 1001,
                "clientId": "C1",
                "checksum": "abc",
                "payDate": "2024-01-08",
                "periodStart": "2024-01-01",
                "periodEnd": "2024-01-08",
                "weeksWorked": "1",
                "processor": "JDOE",
                "deductPeriod": 2
            }
        }))
        .unwrap();
        assert_eq!(batch.batch_id, "1001");
        assert_eq!(batch.checksum, "abc");
        assert_eq!(batch.weeks_worked, 1);
        assert_eq!(batch.effective_deduct_period(), 2);
    }

    #[test]
    fn payroll_batch_accepts_bare_record() {
        let batch = PayrollBatch::from_api_response(json!({"batchId": "7"})).unwrap();
        assert_eq!(batch.batch_id, "7");
        assert_eq!(batch.cutoff_date, "");
    }

    #[test]
    fn whole_numbers_map_in_either_form() {
        for weeks in [json!(2), json!("2"), json!(2.0), json!("2.0")] {
            let batch = PayrollBatch::from_api_response(json!({ "weeksWorked": weeks })).unwrap();
            assert_eq!(batch.weeks_worked, 2);
        }
    }

    #[test]
    fn fractional_counts_are_rejected_in_either_form() {
        for weeks in [json!(1.5), json!("1.5")] {
            let err = PayrollBatch::from_api_response(json!({ "weeksWorked": weeks })).unwrap_err();
            assert!(matches!(err, PrismError::Deserialization(_)));
        }
    }

    #[test]
    fn non_positive_deduct_period_falls_back_to_one() {
        for period in [0, -3] {
            let batch = PayrollBatch {
                deduct_period: period,
                ..PayrollBatch::default()
            };
            assert_eq!(batch.effective_deduct_period(), 1);
        }
    }

    #[test]
    fn batch_status_ready_needs_both_sentinels() {
        let status = |batch_status: &str, error_code: &str| BatchStatus {
            batch_status: batch_status.to_string(),
            error_code: error_code.to_string(),
            ..BatchStatus::default()
        };
        assert!(status("TS.READY", "0").is_ready());
        assert!(!status("TS.PENDING", "0").is_ready());
        assert!(!status("TS.READY", "12").is_ready());
        assert!(!status("ts.ready", "0").is_ready());
        assert!(!status("TS.PENDING", "12").is_ready());
    }

    #[test]
    fn batch_status_accepts_numeric_error_code() {
        let status = BatchStatus::from_api_response(json!({
            "batchStatus": "TS.READY",
            "errorCode": 0,
            "checksum": "c-1"
        }))
        .unwrap();
        assert!(status.is_ready());
        assert_eq!(status.checksum, "c-1");
    }
}

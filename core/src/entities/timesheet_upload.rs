//! Result of posting CSV data to `timesheet/upload`.

use serde::Deserialize;
use serde_json::Value;

use super::de;
use crate::error::PrismResult;
use crate::response::from_value;

/// Outcome of one timesheet upload.
///
/// `upload_key` is what `approve_upload` expects as its upload ID. Rows the
/// vendor could not import are listed in `import_failures`; an upload with
/// any failure should not be finalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimesheetUpload {
    batch_id: String,
    param_data: Value,
    reject_result: Value,
    accept_result: Value,
    error_code: String,
    error_message: String,
    extension: Value,
    imported_records: i64,
    import_failures: Vec<Value>,
    upload_key: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireUpload {
    #[serde(deserialize_with = "de::string")]
    batch_id: String,
    param_data: Value,
    reject_result: Value,
    accept_result: Value,
    #[serde(deserialize_with = "de::string")]
    error_code: String,
    #[serde(deserialize_with = "de::string")]
    error_message: String,
    extension: Value,
    import_result: WireImportResult,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireImportResult {
    #[serde(deserialize_with = "de::integer")]
    import_file_records: i64,
    #[serde(rename = "importFailure", deserialize_with = "de::failures")]
    import_failures: Vec<Value>,
    #[serde(deserialize_with = "de::string")]
    upload_key: String,
}

impl From<WireUpload> for TimesheetUpload {
    fn from(wire: WireUpload) -> Self {
        Self {
            batch_id: wire.batch_id,
            param_data: wire.param_data,
            reject_result: wire.reject_result,
            accept_result: wire.accept_result,
            error_code: wire.error_code,
            error_message: wire.error_message,
            extension: wire.extension,
            imported_records: wire.import_result.import_file_records,
            import_failures: wire.import_result.import_failures,
            upload_key: wire.import_result.upload_key,
        }
    }
}

impl TimesheetUpload {
    pub fn from_api_response(value: Value) -> PrismResult<Self> {
        from_value::<WireUpload>(value).map(Self::from)
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn param_data(&self) -> &Value {
        &self.param_data
    }

    pub fn reject_result(&self) -> &Value {
        &self.reject_result
    }

    pub fn accept_result(&self) -> &Value {
        &self.accept_result
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn extension(&self) -> &Value {
        &self.extension
    }

    /// Number of records the vendor read from the file.
    pub fn imported_records(&self) -> i64 {
        self.imported_records
    }

    pub fn upload_key(&self) -> &str {
        &self.upload_key
    }

    /// True iff the vendor reported at least one import failure.
    pub fn has_errors(&self) -> bool {
        !self.import_failures.is_empty()
    }

    pub fn errors(&self) -> &[Value] {
        &self.import_failures
    }
}

//! CSV helper for timesheet uploads.
//!
//! Produces text in the `MyTimeIn` template layout, ready to pass as the
//! `raw_data` of `TimesheetUploadService::upload`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PrismError, PrismResult};

/// Header row of the upload template, in column order.
pub const HEADERS: [&str; 4] = ["Employee ID", "Date", "Hours", "Code"];

/// One typed row of the upload template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetRow {
    pub employee_id: String,
    pub date: String,
    pub hours: String,
    pub code: String,
}

impl TimesheetRow {
    fn cells(&self) -> [&str; 4] {
        [&self.employee_id, &self.date, &self.hours, &self.code]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvService;

impl CsvService {
    pub fn new() -> Self {
        Self
    }

    pub fn headers(&self) -> [&'static str; 4] {
        HEADERS
    }

    /// Builds CSV from loosely typed rows. Each row must be an object or an
    /// array with exactly four scalar fields, taken in order.
    pub fn create_from_data(&self, rows: &[Value]) -> PrismResult<String> {
        let mut writer = new_writer();
        write_record(&mut writer, HEADERS)?;
        for (index, row) in rows.iter().enumerate() {
            let cells = row_cells(index, row)?;
            write_record(&mut writer, &cells)?;
        }
        finish(writer)
    }

    /// Builds CSV from typed rows.
    pub fn create_from_rows(&self, rows: &[TimesheetRow]) -> PrismResult<String> {
        let mut writer = new_writer();
        write_record(&mut writer, HEADERS)?;
        for row in rows {
            write_record(&mut writer, row.cells())?;
        }
        finish(writer)
    }
}

fn row_cells(index: usize, row: &Value) -> PrismResult<Vec<String>> {
    let fields: Vec<&Value> = match row {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => {
            return Err(PrismError::Validation(format!(
                "invalid entry at {index} - not a record"
            )))
        }
    };
    if fields.len() != HEADERS.len() {
        return Err(PrismError::Validation(format!(
            "missing required data at {index}: expected {} fields, got {}",
            HEADERS.len(),
            fields.len()
        )));
    }
    fields
        .into_iter()
        .map(|field| match field {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            _ => Err(PrismError::Validation(format!(
                "invalid entry at {index} - nested values are not allowed"
            ))),
        })
        .collect()
}

fn new_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn write_record<I, F>(writer: &mut csv::Writer<Vec<u8>>, record: I) -> PrismResult<()>
where
    I: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    writer
        .write_record(record)
        .map_err(|e| PrismError::Csv(e.to_string()))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> PrismResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| PrismError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PrismError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_rows_keep_field_order() {
        let csv = CsvService::new()
            .create_from_data(&[json!({
                "empId": "1",
                "date": "2024-01-01",
                "hours": "8",
                "code": "REG"
            })])
            .unwrap();
        assert_eq!(csv, "Employee ID,Date,Hours,Code\n1,2024-01-01,8,REG\n");
    }

    #[test]
    fn array_rows_and_numbers_are_accepted() {
        let csv = CsvService::new()
            .create_from_data(&[json!(["2", "2024-01-02", 7.5, "OT"])])
            .unwrap();
        assert_eq!(csv, "Employee ID,Date,Hours,Code\n2,2024-01-02,7.5,OT\n");
    }

    #[test]
    fn empty_input_yields_header_only() {
        let csv = CsvService::new().create_from_data(&[]).unwrap();
        assert_eq!(csv, "Employee ID,Date,Hours,Code\n");
    }

    #[test]
    fn wrong_field_count_cites_index() {
        let rows = [
            json!(["1", "2024-01-01", "8", "REG"]),
            json!({"empId": "2", "date": "2024-01-01", "hours": "8"}),
        ];
        let err = CsvService::new().create_from_data(&rows).unwrap_err();
        match err {
            PrismError::Validation(message) => assert!(message.contains("at 1"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scalar_row_is_not_a_record() {
        let err = CsvService::new()
            .create_from_data(&[json!("1,2024-01-01,8,REG")])
            .unwrap_err();
        match err {
            PrismError::Validation(message) => {
                assert_eq!(message, "invalid entry at 0 - not a record")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = CsvService::new()
            .create_from_rows(&[TimesheetRow {
                employee_id: "3".into(),
                date: "2024-01-03".into(),
                hours: "4".into(),
                code: "A,B".into(),
            }])
            .unwrap();
        assert_eq!(csv, "Employee ID,Date,Hours,Code\n3,2024-01-03,4,\"A,B\"\n");
    }
}

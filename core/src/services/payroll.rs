//! Payroll batches: lookup, creation and employee assignment.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PrismConfig;
use crate::entities::{BatchListEntry, PayrollBatch};
use crate::error::{PrismError, PrismResult};
use crate::http::{HttpRequest, HttpResponse};
use crate::response::{decode, decode_or_not_found, from_value, one_or_many, scalar_string};
use crate::services::employee::employee_ids;
use crate::services::{require, DATE_FORMAT};
use crate::transport::Transport;

const GET_BATCH_LIST_BY_DATE_PATH: &str = "payroll/getBatchListByDate";
const GET_BATCH_INFO_PATH: &str = "payroll/getBatchInfo";
const CREATE_PAYROLL_BATCHES_PATH: &str = "payroll/createPayrollBatches";
const GET_EMPLOYEE_FOR_BATCH_PATH: &str = "payroll/getEmployeeForBatch";
const UPDATE_PAYROLL_BATCH_PATH: &str = "payroll/updatePayrollBatchWithOptions";

/// Batch type for batches created by this client.
pub const MANUAL_BATCH_TYPE: &str = "M";

/// Body of `payroll/createPayrollBatches`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub client_id: String,
    pub pay_date: String,
    pub batch_type: String,
    pub employee: Vec<BatchEmployee>,
}

/// One employee line of a batch payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmployee {
    pub employee_id: String,
    pub period_start: String,
    pub period_end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks_worked: Option<i64>,
}

/// Body of `payroll/updatePayrollBatchWithOptions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchRequest {
    pub client_id: String,
    pub batch_id: String,
    pub checksum: String,
    pub batch_control: BatchControl,
    pub employee: Vec<BatchEmployee>,
}

/// Control fields echoed from the batch read before an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchControl {
    pub batch_type: String,
    pub pay_date: String,
    pub period_start: String,
    pub period_end: String,
    pub weeks_worked: i64,
    pub processor: String,
    pub cutoff_date: String,
    pub delivery_date: String,
    pub deduct_period: i64,
}

pub struct PayrollService<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a PrismConfig,
}

impl<'a, T: ?Sized> PayrollService<'a, T> {
    pub fn new(transport: &'a T, config: &'a PrismConfig) -> Self {
        Self { transport, config }
    }

    pub fn build_get_batch_list(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        client_id: &str,
    ) -> PrismResult<HttpRequest> {
        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        self.config.build_get(
            GET_BATCH_LIST_BY_DATE_PATH,
            &[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("clientId", client_id),
                ("dateType", "PAY"),
            ],
        )
    }

    /// Entries under `batchList`; a 404 means no batches in the window.
    pub fn parse_get_batch_list(&self, response: HttpResponse) -> PrismResult<Vec<BatchListEntry>> {
        let Some(body) = decode_or_not_found(&response)? else {
            return Ok(Vec::new());
        };
        one_or_many(body.get("batchList"))
            .into_iter()
            .map(from_value)
            .collect()
    }

    pub fn build_get_payroll_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<HttpRequest> {
        self.config.build_get(
            GET_BATCH_INFO_PATH,
            &[("clientId", client_id), ("batchId", batch_id)],
        )
    }

    pub fn parse_get_payroll_batch(&self, response: HttpResponse) -> PrismResult<Option<PayrollBatch>> {
        decode_or_not_found(&response)?
            .map(PayrollBatch::from_api_response)
            .transpose()
    }

    /// Manual batch covering `start..end`, paid on `end`, one line per
    /// employee.
    pub fn build_create_batch<S: AsRef<str>>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        client_id: &str,
        employee_ids: &[S],
    ) -> PrismResult<HttpRequest> {
        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        let payload = CreateBatchRequest {
            client_id: client_id.to_string(),
            pay_date: end.clone(),
            batch_type: MANUAL_BATCH_TYPE.to_string(),
            employee: employee_ids
                .iter()
                .map(|id| BatchEmployee {
                    employee_id: id.as_ref().to_string(),
                    period_start: start.clone(),
                    period_end: end.clone(),
                    weeks_worked: None,
                })
                .collect(),
        };
        self.config.build_post_json(CREATE_PAYROLL_BATCHES_PATH, &payload)
    }

    /// The created batch's number. Creation answers with `batchNum`, while
    /// queries call the same value `batchId`.
    pub fn parse_create_batch(&self, response: HttpResponse) -> PrismResult<String> {
        let body = decode(&response)?;
        body.get("batchNum")
            .and_then(scalar_string)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PrismError::Deserialization("create response has no batchNum".to_string()))
    }

    pub fn build_get_employees_for_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<HttpRequest> {
        self.config.build_get(
            GET_EMPLOYEE_FOR_BATCH_PATH,
            &[("clientId", client_id), ("batchId", batch_id)],
        )
    }

    pub fn parse_get_employees_for_batch(&self, response: HttpResponse) -> PrismResult<Vec<String>> {
        Ok(decode_or_not_found(&response)?
            .map(|body| employee_ids(&body))
            .unwrap_or_default())
    }

    /// Full batch-control payload built from `original`. The checksum is
    /// echoed as read, so the server refuses the update if the batch
    /// changed since.
    pub fn build_update_employees<S: AsRef<str>>(
        &self,
        batch_id: &str,
        client_id: &str,
        employees: &[S],
        original: &PayrollBatch,
    ) -> PrismResult<HttpRequest> {
        let batch_type = if original.batch_type.is_empty() {
            MANUAL_BATCH_TYPE.to_string()
        } else {
            original.batch_type.clone()
        };
        let payload = UpdateBatchRequest {
            client_id: client_id.to_string(),
            batch_id: batch_id.to_string(),
            checksum: original.checksum.clone(),
            batch_control: BatchControl {
                batch_type,
                pay_date: original.pay_date.clone(),
                period_start: original.period_start.clone(),
                period_end: original.period_end.clone(),
                weeks_worked: original.weeks_worked,
                processor: original.processor.clone(),
                cutoff_date: original.cutoff_date.clone(),
                delivery_date: original.delivery_date.clone(),
                deduct_period: original.effective_deduct_period(),
            },
            employee: employees
                .iter()
                .map(|id| BatchEmployee {
                    employee_id: id.as_ref().to_string(),
                    period_start: original.period_start.clone(),
                    period_end: original.period_end.clone(),
                    weeks_worked: Some(original.weeks_worked),
                })
                .collect(),
        };
        self.config.build_post_json(UPDATE_PAYROLL_BATCH_PATH, &payload)
    }
}

impl<'a, T: Transport + ?Sized> PayrollService<'a, T> {
    /// ID of the first batch paid on `date`, or `None` when there is none.
    ///
    /// Only the first match is returned; use `get_batch_list_by_date_range`
    /// for the full list.
    pub fn get_batch_list_by_date(&self, date: NaiveDate, client_id: &str) -> PrismResult<Option<String>> {
        require(client_id, "client_id")?;
        let request = self.build_get_batch_list(date, date, client_id)?;
        let batches = self.parse_get_batch_list(self.transport.execute(request)?)?;
        Ok(batches.into_iter().next().map(|entry| entry.batch_id))
    }

    /// Every batch paid between `start` and `end`; empty on 404. The dates
    /// go out as given, reversed or not.
    pub fn get_batch_list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        client_id: &str,
    ) -> PrismResult<Vec<BatchListEntry>> {
        require(client_id, "client_id")?;
        let request = self.build_get_batch_list(start, end, client_id)?;
        self.parse_get_batch_list(self.transport.execute(request)?)
    }

    /// Full batch detail, including the checksum needed for updates.
    pub fn get_payroll_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<Option<PayrollBatch>> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        let request = self.build_get_payroll_batch(batch_id, client_id)?;
        self.parse_get_payroll_batch(self.transport.execute(request)?)
    }

    /// Creates a manual batch and returns its number.
    pub fn create_batch<S: AsRef<str>>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        client_id: &str,
        employee_ids: &[S],
    ) -> PrismResult<String> {
        require(client_id, "client_id")?;
        if employee_ids.is_empty() {
            return Err(PrismError::Validation(
                "at least 1 employee must be specified".to_string(),
            ));
        }
        let request = self.build_create_batch(start, end, client_id, employee_ids)?;
        let batch_id = self.parse_create_batch(self.transport.execute(request)?)?;
        info!(%batch_id, client_id, %start, %end, employees = employee_ids.len(), "created payroll batch");
        Ok(batch_id)
    }

    /// Employee IDs assigned to a batch; empty on 404.
    pub fn get_employees_for_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<Vec<String>> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        let request = self.build_get_employees_for_batch(batch_id, client_id)?;
        self.parse_get_employees_for_batch(self.transport.execute(request)?)
    }

    /// Replaces the batch's employees, guarded by `original.checksum`.
    pub fn update_employees_for_payroll_batch<S: AsRef<str>>(
        &self,
        batch_id: &str,
        client_id: &str,
        employees: &[S],
        original: &PayrollBatch,
    ) -> PrismResult<Value> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        require(&original.checksum, "checksum")?;
        debug!(batch_id, client_id, employees = employees.len(), "updating batch employees");
        let request = self.build_update_employees(batch_id, client_id, employees, original)?;
        decode(&self.transport.execute(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn config() -> PrismConfig {
        PrismConfig::new("1.22", "https://api.prismhr.com/").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn build_get_batch_list_uses_pay_dates() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let req = service
            .build_get_batch_list(date(2024, 1, 1), date(2024, 1, 31), "C1")
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("startDate".to_string(), "2024-01-01".to_string()),
                ("endDate".to_string(), "2024-01-31".to_string()),
                ("clientId".to_string(), "C1".to_string()),
                ("dateType".to_string(), "PAY".to_string()),
            ]
        );
    }

    #[test]
    fn parse_get_batch_list_404_is_empty() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let batches = service
            .parse_get_batch_list(HttpResponse::new(404, r#"{"errorMessage":"No batches"}"#))
            .unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn parse_get_batch_list_other_4xx_raises() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let err = service
            .parse_get_batch_list(HttpResponse::new(400, r#"{"errorMessage":"Bad dates"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "Received 400: 'Bad dates' when contacting API");
    }

    #[test]
    fn parse_get_batch_list_accepts_single_object() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let batches = service
            .parse_get_batch_list(HttpResponse::new(
                200,
                r#"{"batchList":{"batchId":"1001","payDate":"2024-01-08"}}"#,
            ))
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_id, "1001");
    }

    #[test]
    fn build_create_batch_is_manual_with_one_line_per_employee() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let req = service
            .build_create_batch(date(2024, 1, 1), date(2024, 1, 8), "C1", &["E1", "E2"])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.url.ends_with("payroll/createPayrollBatches"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["clientId"], "C1");
        assert_eq!(body["batchType"], "M");
        assert_eq!(body["payDate"], "2024-01-08");
        assert_eq!(body["employee"].as_array().unwrap().len(), 2);
        assert_eq!(body["employee"][1]["employeeId"], "E2");
        assert_eq!(body["employee"][1]["periodStart"], "2024-01-01");
        assert_eq!(body["employee"][1]["periodEnd"], "2024-01-08");
        assert!(body["employee"][0].get("weeksWorked").is_none());
    }

    #[test]
    fn parse_create_batch_reads_batch_num() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let id = service
            .parse_create_batch(HttpResponse::new(200, r#"{"batchNum":20240101}"#))
            .unwrap();
        assert_eq!(id, "20240101");
    }

    #[test]
    fn parse_create_batch_5xx_is_api_error() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let err = service
            .parse_create_batch(HttpResponse::new(500, "boom"))
            .unwrap_err();
        assert!(matches!(err, PrismError::Api { status: 500, .. }));
    }

    #[test]
    fn parse_get_payroll_batch_404_is_none() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let batch = service
            .parse_get_payroll_batch(HttpResponse::new(404, "{}"))
            .unwrap();
        assert!(batch.is_none());
    }

    #[test]
    fn parse_get_employees_for_batch_404_is_empty() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let ids = service
            .parse_get_employees_for_batch(HttpResponse::new(404, "{}"))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn build_update_echoes_original_batch() {
        let config = config();
        let service = PayrollService::<()>::new(&(), &config);
        let original = PayrollBatch {
            batch_id: "1001".into(),
            batch_type: "M".into(),
            checksum: "CK-9".into(),
            pay_date: "2024-01-08".into(),
            period_start: "2024-01-01".into(),
            period_end: "2024-01-08".into(),
            weeks_worked: 1,
            processor: "JDOE".into(),
            cutoff_date: "2024-01-05".into(),
            delivery_date: "2024-01-07".into(),
            deduct_period: 0,
            ..PayrollBatch::default()
        };
        let req = service
            .build_update_employees("1001", "C1", &["E1"], &original)
            .unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["checksum"], "CK-9");
        assert_eq!(body["batchId"], "1001");
        let control = &body["batchControl"];
        assert_eq!(control["payDate"], "2024-01-08");
        assert_eq!(control["processor"], "JDOE");
        assert_eq!(control["cutoffDate"], "2024-01-05");
        assert_eq!(control["deliveryDate"], "2024-01-07");
        assert_eq!(control["weeksWorked"], 1);
        assert_eq!(control["deductPeriod"], 1);
        assert_eq!(body["employee"][0]["employeeId"], "E1");
        assert_eq!(body["employee"][0]["weeksWorked"], 1);
    }
}

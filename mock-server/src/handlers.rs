//! Handlers emulating the PrismHR REST endpoints used by the client.

use std::collections::HashMap;

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{
    Db, MockState, TimesheetLine, DEMO_PASSWORD, DEMO_PEO_ID, DEMO_USERNAME, TS_ERROR,
    TS_FINALIZED, TS_READY,
};

/// Most IDs accepted by one `getEmployee` call.
pub const MAX_EMPLOYEE_IDS: usize = 15;

/// Error body in the vendor's shape.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "errorCode": self.status.as_u16().to_string(),
            "errorMessage": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type Reply = Result<Json<Value>, ApiError>;

fn query_pairs(query: Option<String>) -> Vec<(String, String)> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn param(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}

fn required(pairs: &[(String, String)], key: &str) -> Result<String, ApiError> {
    param(pairs, key).ok_or_else(|| ApiError::bad_request(format!("{key} is required")))
}

fn form_required(form: &HashMap<String, String>, key: &str) -> Result<String, ApiError> {
    form.get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ApiError::bad_request(format!("{key} is required")))
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get("sessionId")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if state.sessions.contains(token) {
        Ok(())
    } else {
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "Session is not valid"))
    }
}

/// Records the call and checks the session in one step.
async fn enter(db: &Db, headers: &HeaderMap, endpoint: &str) -> Result<(), ApiError> {
    let mut state = db.write().await;
    state.record(endpoint);
    authorize(&state, headers)
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

pub async fn create_peo_session(
    State(db): State<Db>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let mut state = db.write().await;
    state.record("login/createPeoSession");
    let username = form_required(&form, "username")?;
    let password = form_required(&form, "password")?;
    let peo_id = form_required(&form, "peoId")?;
    if username != DEMO_USERNAME || password != DEMO_PASSWORD || peo_id != DEMO_PEO_ID {
        warn!(%username, "rejected login");
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let session_id = state.open_session();
    Ok(Json(json!({ "sessionId": session_id, "errorCode": "0" })))
}

// ---------------------------------------------------------------------------
// employee
// ---------------------------------------------------------------------------

pub async fn get_employee(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "employee/getEmployee").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let ids: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "employeeId")
        .map(|(_, v)| v.as_str())
        .collect();
    if ids.is_empty() {
        return Err(ApiError::bad_request("employeeId is required"));
    }
    if ids.len() > MAX_EMPLOYEE_IDS {
        return Err(ApiError::bad_request(format!(
            "At most {MAX_EMPLOYEE_IDS} employee IDs may be requested"
        )));
    }
    let state = db.read().await;
    let roster = state.roster(&client_id);
    let found: Vec<_> = ids
        .iter()
        .filter_map(|id| roster.iter().find(|e| e.id == *id))
        .collect();
    Ok(Json(json!({ "employee": found })))
}

pub async fn get_employee_list(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "employee/getEmployeeList").await?;
    let client_id = required(&query_pairs(query), "clientId")?;
    let state = db.read().await;
    let ids: Vec<&str> = state.roster(&client_id).iter().map(|e| e.id.as_str()).collect();
    if ids.is_empty() {
        return Err(ApiError::not_found("No employees found"));
    }
    Ok(Json(json!({ "employeeList": { "employeeId": ids } })))
}

pub async fn get_employers_info(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "employee/getEmployersInfo").await?;
    let employee_id = required(&query_pairs(query), "employeeId")?;
    let state = db.read().await;
    let client = state
        .employees
        .iter()
        .find(|(_, roster)| roster.iter().any(|e| e.id == employee_id))
        .map(|(client_id, _)| client_id.clone())
        .ok_or_else(|| ApiError::not_found(format!("Employee {employee_id} not found")))?;
    let name = state.clients.get(&client).cloned().unwrap_or_default();
    Ok(Json(json!({
        "employerInfo": { "employeeId": employee_id, "clientId": client, "clientName": name }
    })))
}

// ---------------------------------------------------------------------------
// payroll
// ---------------------------------------------------------------------------

pub async fn get_batch_list_by_date(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Reply {
    enter(&db, &headers, "payroll/getBatchListByDate").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let start = required(&pairs, "startDate")?;
    let end = required(&pairs, "endDate")?;
    let state = db.read().await;
    let batches: Vec<Value> = state
        .batches
        .values()
        .filter(|b| b.client_id == client_id && b.pay_date >= start && b.pay_date <= end)
        .map(|b| {
            json!({
                "batchId": b.batch_id,
                "batchType": b.batch_type,
                "batchStatus": "INIT",
                "payDate": b.pay_date,
            })
        })
        .collect();
    if batches.is_empty() {
        return Err(ApiError::not_found("No batches found"));
    }
    Ok(Json(json!({ "batchList": batches })))
}

pub async fn get_batch_info(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "payroll/getBatchInfo").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let batch_id = required(&pairs, "batchId")?;
    let state = db.read().await;
    let batch = state
        .batch(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    Ok(Json(json!({ "batchInfo": batch.info() })))
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

pub async fn create_payroll_batches(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Reply {
    enter(&db, &headers, "payroll/createPayrollBatches").await?;
    let client_id = str_field(&payload, "clientId")
        .ok_or_else(|| ApiError::bad_request("clientId is required"))?;
    let pay_date = str_field(&payload, "payDate")
        .ok_or_else(|| ApiError::bad_request("payDate is required"))?;
    if str_field(&payload, "batchType").as_deref() != Some("M") {
        return Err(ApiError::bad_request("Only manual batches are supported"));
    }
    let lines = payload
        .get("employee")
        .and_then(Value::as_array)
        .filter(|lines| !lines.is_empty())
        .ok_or_else(|| ApiError::bad_request("At least one employee is required"))?;
    let employees: Vec<String> = lines.iter().filter_map(|l| str_field(l, "employeeId")).collect();
    let period_start = str_field(&lines[0], "periodStart").unwrap_or_default();
    let period_end = str_field(&lines[0], "periodEnd").unwrap_or_default();

    let mut state = db.write().await;
    if !state.clients.contains_key(&client_id) {
        return Err(ApiError::bad_request(format!("Unknown client {client_id}")));
    }
    let batch_id = state.create_batch(&client_id, &pay_date, &period_start, &period_end, employees);
    debug!(%batch_id, %client_id, "created batch");
    Ok(Json(json!({ "batchNum": batch_id, "errorCode": "0" })))
}

pub async fn get_employee_for_batch(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Reply {
    enter(&db, &headers, "payroll/getEmployeeForBatch").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let batch_id = required(&pairs, "batchId")?;
    let state = db.read().await;
    let batch = state
        .batch(&client_id, &batch_id)
        .filter(|b| !b.employees.is_empty())
        .ok_or_else(|| ApiError::not_found("No employees in batch"))?;
    Ok(Json(json!({ "employeeList": { "employeeId": batch.employees } })))
}

pub async fn update_payroll_batch_with_options(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Reply {
    enter(&db, &headers, "payroll/updatePayrollBatchWithOptions").await?;
    let client_id = str_field(&payload, "clientId")
        .ok_or_else(|| ApiError::bad_request("clientId is required"))?;
    let batch_id = str_field(&payload, "batchId")
        .ok_or_else(|| ApiError::bad_request("batchId is required"))?;
    let checksum = str_field(&payload, "checksum").unwrap_or_default();
    let deduct_period = payload
        .pointer("/batchControl/deductPeriod")
        .and_then(Value::as_i64)
        .unwrap_or_default();
    if deduct_period <= 0 {
        return Err(ApiError::bad_request("deductPeriod must be positive"));
    }
    let employees: Vec<String> = payload
        .get("employee")
        .and_then(Value::as_array)
        .map(|lines| lines.iter().filter_map(|l| str_field(l, "employeeId")).collect())
        .unwrap_or_default();

    let mut state = db.write().await;
    let batch = state
        .batch_mut(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    if batch.checksum != checksum {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "Batch was modified since it was read",
        ));
    }
    batch.employees = employees;
    batch.deduct_period = deduct_period;
    batch.rotate_checksum();
    Ok(Json(json!({ "batchId": batch_id, "errorCode": "0" })))
}

// ---------------------------------------------------------------------------
// timesheet
// ---------------------------------------------------------------------------

fn parse_lines(raw: &str) -> (Vec<TimesheetLine>, usize, Vec<Value>) {
    let mut lines = Vec::new();
    let mut failures = Vec::new();
    let mut records = 0;
    for (index, row) in raw.lines().enumerate().skip(1) {
        if row.trim().is_empty() {
            continue;
        }
        records += 1;
        let cells: Vec<&str> = row.split(',').collect();
        let hours = cells.get(2).and_then(|h| h.trim().parse::<f64>().ok());
        match (cells.len(), hours) {
            (4, Some(hours)) => lines.push(TimesheetLine {
                employee_id: cells[0].to_string(),
                date: cells[1].to_string(),
                hours,
                code: cells[3].to_string(),
            }),
            _ => failures.push(json!({
                "lineNumber": index + 1,
                "errorMessage": "Malformed line"
            })),
        }
    }
    (lines, records, failures)
}

pub async fn upload(State(db): State<Db>, headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Reply {
    enter(&db, &headers, "timesheet/upload").await?;
    let client_id = form_required(&form, "clientId")?;
    let batch_id = form_required(&form, "batchList")?;
    form_required(&form, "userId")?;
    if form_required(&form, "templateId")? != "MyTimeIn" {
        return Err(ApiError::bad_request("Unknown template"));
    }
    let file_data = form_required(&form, "fileData")?;
    let (lines, records, mut failures) = parse_lines(&file_data);

    let mut state = db.write().await;
    let roster: Vec<String> = state.roster(&client_id).iter().map(|e| e.id.clone()).collect();
    let batch = state
        .batch_mut(&client_id, &batch_id)
        .ok_or_else(|| ApiError::bad_request(format!("Batch {batch_id} is not open")))?;
    for line in &lines {
        if !roster.contains(&line.employee_id) {
            failures.push(json!({
                "employeeId": line.employee_id,
                "errorMessage": "Unknown employee"
            }));
        }
    }
    let upload_key = Uuid::new_v4().to_string();
    if failures.is_empty() {
        batch.lines.extend(lines);
        batch.timesheet_status = TS_READY.to_string();
        batch.error_code = "0".to_string();
    } else {
        batch.timesheet_status = TS_ERROR.to_string();
        batch.error_code = "1".to_string();
    }
    batch.upload_keys.push(upload_key.clone());
    batch.rotate_checksum();

    Ok(Json(json!({
        "batchId": batch_id,
        "errorCode": batch.error_code,
        "errorMessage": "",
        "importResult": {
            "importFileRecords": records.to_string(),
            "importFailure": failures,
            "uploadKey": upload_key,
        }
    })))
}

pub async fn get_batch_status(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "timesheet/getBatchStatus").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let batch_id = required(&pairs, "batchId")?;
    let state = db.read().await;
    let batch = state
        .batch(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    Ok(Json(json!({
        "batchId": batch.batch_id,
        "batchStatus": batch.timesheet_status,
        "errorCode": batch.error_code,
        "checksum": batch.checksum,
    })))
}

pub async fn finalize_prism_batch_entry(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    enter(&db, &headers, "timesheet/finalizePrismBatchEntry").await?;
    let client_id = form_required(&form, "clientId")?;
    let batch_id = form_required(&form, "batchId")?;
    let checksum = form_required(&form, "checksum")?;
    let mut state = db.write().await;
    let batch = state
        .batch_mut(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    if batch.checksum != checksum {
        return Err(ApiError::new(StatusCode::CONFLICT, "Checksum does not match"));
    }
    if batch.timesheet_status != TS_READY {
        return Err(ApiError::bad_request("Batch is not ready to finalize"));
    }
    batch.timesheet_status = TS_FINALIZED.to_string();
    batch.rotate_checksum();
    Ok(Json(json!({ "batchId": batch_id, "errorCode": "0" })))
}

pub async fn accept(State(db): State<Db>, headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Reply {
    enter(&db, &headers, "timesheet/accept").await?;
    let client_id = form_required(&form, "clientId")?;
    let batch_id = form_required(&form, "batchList")?;
    let upload_id = form_required(&form, "uploadId")?;
    form_required(&form, "userId")?;
    let mut state = db.write().await;
    let batch = state
        .batch_mut(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    if !batch.upload_keys.contains(&upload_id) {
        return Err(ApiError::not_found(format!("Upload {upload_id} not found")));
    }
    batch.approved = true;
    Ok(Json(json!({ "uploadId": upload_id, "errorCode": "0" })))
}

pub async fn get_param_data(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "timesheet/getParamData").await?;
    let client_id = required(&query_pairs(query), "clientId")?;
    let state = db.read().await;
    let batches: Vec<&str> = state
        .batches
        .values()
        .filter(|b| b.client_id == client_id)
        .map(|b| b.batch_id.as_str())
        .collect();
    Ok(Json(json!({
        "paramData": {
            "template": [
                { "templateId": "MyTimeIn", "description": "Employee ID, Date, Hours, Code" }
            ],
            "batch": batches,
        }
    })))
}

pub async fn get_timesheet_data(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    enter(&db, &headers, "timesheet/getTimeSheetData").await?;
    let pairs = query_pairs(query);
    let client_id = required(&pairs, "clientId")?;
    let batch_id = required(&pairs, "batchId")?;
    let state = db.read().await;
    let batch = state
        .batch(&client_id, &batch_id)
        .ok_or_else(|| ApiError::not_found(format!("Batch {batch_id} not found")))?;
    let lines: Vec<Value> = batch.lines.iter().map(TimesheetLine::to_json).collect();
    Ok(Json(json!({ "timeSheetData": lines })))
}

// ---------------------------------------------------------------------------
// clientMaster
// ---------------------------------------------------------------------------

pub async fn get_client_list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    enter(&db, &headers, "clientMaster/getClientList").await?;
    let state = db.read().await;
    let clients: Vec<Value> = state
        .clients
        .iter()
        .map(|(id, name)| json!({ "clientId": id, "clientName": name }))
        .collect();
    Ok(Json(json!({ "clientListResult": { "clientList": clients } })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lines_skips_header_and_flags_malformed_rows() {
        let raw = "Employee ID,Date,Hours,Code\nE001,2024-01-01,8,REG\nE002,2024-01-01,x,REG\nE003,2024-01-01\n";
        let (lines, records, failures) = parse_lines(raw);
        assert_eq!(records, 3);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].hours, 8.0);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0]["lineNumber"], 3);
    }

    #[test]
    fn param_ignores_empty_values() {
        let pairs = query_pairs(Some("a=&b=2".to_string()));
        assert_eq!(param(&pairs, "a"), None);
        assert_eq!(param(&pairs, "b").as_deref(), Some("2"));
    }
}

//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, the expected request, a simulated
//! response and the expected parse result. Results are compared as JSON
//! values so field order never matters.

use prism_api::{
    EmployeeService, HttpMethod, HttpRequest, HttpResponse, PayrollService, PrismConfig,
    TimesheetUploadService,
};
use serde_json::{json, Value};

const BASE_URL: &str = "https://api.prismhr.com/api-1.22/services/rest/";

fn config() -> PrismConfig {
    PrismConfig::new("1.22", "https://api.prismhr.com/").unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    let path = req.url.split('?').next().unwrap();
    assert_eq!(
        path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
    if let Some(query) = expected.get("query") {
        assert_eq!(req.query_pairs(), pairs(query), "{name}: query");
        assert!(req.body.is_none(), "{name}: body should be None");
    }
    if let Some(form) = expected.get("form") {
        assert_eq!(req.form_pairs(), pairs(form), "{name}: form");
    }
}

fn str_input<'a>(case: &'a Value, key: &str) -> &'a str {
    case["input"][key].as_str().unwrap()
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[test]
fn employee_test_vectors() {
    let raw = include_str!("../../test-vectors/employees.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let config = config();
    let service = EmployeeService::<()>::new(&(), &config);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let ids: Vec<String> = serde_json::from_value(case["input"]["ids"].clone()).unwrap();

        let req = service
            .build_get_employees(&ids, str_input(case, "client_id"))
            .unwrap();
        check_request(name, &req, &case["expected_request"]);

        let employees = service.parse_get_employees(simulated(case)).unwrap();
        assert_eq!(
            serde_json::to_value(&employees).unwrap(),
            case["expected_result"],
            "{name}: parsed result"
        );
    }
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[test]
fn batch_test_vectors() {
    let raw = include_str!("../../test-vectors/batches.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let config = config();
    let service = PayrollService::<()>::new(&(), &config);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = service
            .build_get_payroll_batch(str_input(case, "batch_id"), str_input(case, "client_id"))
            .unwrap();
        check_request(name, &req, &case["expected_request"]);

        let batch = service.parse_get_payroll_batch(simulated(case)).unwrap();
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            case["expected_result"],
            "{name}: parsed result"
        );
    }
}

// ---------------------------------------------------------------------------
// Timesheet upload
// ---------------------------------------------------------------------------

#[test]
fn timesheet_upload_test_vectors() {
    let raw = include_str!("../../test-vectors/timesheet_upload.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let config = config();
    let service = TimesheetUploadService::<()>::new(&(), &config);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = service
            .build_upload(
                str_input(case, "batch_id"),
                str_input(case, "client_id"),
                str_input(case, "user_id"),
                str_input(case, "raw_data"),
            )
            .unwrap();
        check_request(name, &req, &case["expected_request"]);

        let upload = service.parse_upload(simulated(case)).unwrap();
        let actual = json!({
            "batch_id": upload.batch_id(),
            "error_code": upload.error_code(),
            "imported_records": upload.imported_records(),
            "upload_key": upload.upload_key(),
            "errors": upload.errors(),
        });
        assert_eq!(actual, case["expected_result"], "{name}: parsed result");
        assert_eq!(
            upload.has_errors(),
            !upload.errors().is_empty(),
            "{name}: has_errors"
        );
    }
}

//! In-memory state behind the mock PrismHR endpoints.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

pub type Db = Arc<RwLock<MockState>>;

pub const DEMO_CLIENT: &str = "1111";
pub const EMPTY_CLIENT: &str = "2222";
pub const DEMO_USERNAME: &str = "admin";
pub const DEMO_PASSWORD: &str = "secret";
pub const DEMO_PEO_ID: &str = "350*HSG";

/// Timesheet status values reported by `getBatchStatus`.
pub const TS_EMPTY: &str = "TS.EMPTY";
pub const TS_READY: &str = "TS.READY";
pub const TS_ERROR: &str = "TS.ERROR";
pub const TS_FINALIZED: &str = "TS.FINALIZED";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

#[derive(Clone, Debug)]
pub struct Batch {
    pub batch_id: String,
    pub client_id: String,
    pub batch_type: String,
    pub pay_date: String,
    pub period_start: String,
    pub period_end: String,
    pub weeks_worked: i64,
    pub processor: String,
    pub deduct_period: i64,
    pub checksum: String,
    pub employees: Vec<String>,
    pub timesheet_status: String,
    pub error_code: String,
    pub upload_keys: Vec<String>,
    pub lines: Vec<TimesheetLine>,
    pub approved: bool,
}

impl Batch {
    pub fn info(&self) -> Value {
        json!({
            "batchId": self.batch_id,
            "clientId": self.client_id,
            "batchType": self.batch_type,
            "batchStatus": "INIT",
            "checksum": self.checksum,
            "payDate": self.pay_date,
            "periodStart": self.period_start,
            "periodEnd": self.period_end,
            "weeksWorked": self.weeks_worked.to_string(),
            "processor": self.processor,
            "cutoffDate": self.period_end,
            "deliveryDate": self.pay_date,
            "deductPeriod": self.deduct_period,
        })
    }

    pub fn rotate_checksum(&mut self) {
        self.checksum = Uuid::new_v4().simple().to_string();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimesheetLine {
    pub employee_id: String,
    pub date: String,
    pub hours: f64,
    pub code: String,
}

impl TimesheetLine {
    pub fn to_json(&self) -> Value {
        json!({
            "employeeId": self.employee_id,
            "charge_date": self.date,
            "pay_code": self.code,
            "hrs_units_paid": format!("{:.2}", self.hours),
            "hours_worked": self.hours,
            "pay_rate": "0.00",
            "pay_amount": "0.00",
        })
    }
}

/// Everything the mock server knows, plus a log of which endpoints were hit.
#[derive(Debug, Default)]
pub struct MockState {
    pub sessions: HashSet<String>,
    pub clients: BTreeMap<String, String>,
    pub employees: BTreeMap<String, Vec<Employee>>,
    pub batches: BTreeMap<String, Batch>,
    pub next_batch: u64,
    pub calls: Vec<String>,
}

impl MockState {
    /// One demo client with 20 employees (`E001`..`E020`) and one client
    /// with none.
    pub fn seeded() -> Self {
        let mut clients = BTreeMap::new();
        clients.insert(DEMO_CLIENT.to_string(), "DEMO".to_string());
        clients.insert(EMPTY_CLIENT.to_string(), "EMPTY".to_string());

        let roster = (1..=20)
            .map(|n| Employee {
                id: format!("E{n:03}"),
                first_name: format!("First{n}"),
                last_name: format!("Last{n}"),
                email_address: format!("e{n}@example.com"),
            })
            .collect();
        let mut employees = BTreeMap::new();
        employees.insert(DEMO_CLIENT.to_string(), roster);

        Self {
            clients,
            employees,
            next_batch: 1001,
            ..Self::default()
        }
    }

    pub fn shared(self) -> Db {
        Arc::new(RwLock::new(self))
    }

    pub fn record(&mut self, endpoint: &str) {
        self.calls.push(endpoint.to_string());
    }

    /// How many times `endpoint` (e.g. `employee/getEmployee`) was called.
    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == endpoint).count()
    }

    pub fn open_session(&mut self) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone());
        token
    }

    pub fn roster(&self, client_id: &str) -> &[Employee] {
        self.employees
            .get(client_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn create_batch(
        &mut self,
        client_id: &str,
        pay_date: &str,
        period_start: &str,
        period_end: &str,
        employees: Vec<String>,
    ) -> String {
        let batch_id = self.next_batch.to_string();
        self.next_batch += 1;
        let mut batch = Batch {
            batch_id: batch_id.clone(),
            client_id: client_id.to_string(),
            batch_type: "M".to_string(),
            pay_date: pay_date.to_string(),
            period_start: period_start.to_string(),
            period_end: period_end.to_string(),
            weeks_worked: 1,
            processor: "API".to_string(),
            deduct_period: 0,
            checksum: String::new(),
            employees,
            timesheet_status: TS_EMPTY.to_string(),
            error_code: "0".to_string(),
            upload_keys: Vec::new(),
            lines: Vec::new(),
            approved: false,
        };
        batch.rotate_checksum();
        self.batches.insert(batch_id.clone(), batch);
        batch_id
    }

    pub fn batch(&self, client_id: &str, batch_id: &str) -> Option<&Batch> {
        self.batches
            .get(batch_id)
            .filter(|b| b.client_id == client_id)
    }

    pub fn batch_mut(&mut self, client_id: &str, batch_id: &str) -> Option<&mut Batch> {
        self.batches
            .get_mut(batch_id)
            .filter(|b| b.client_id == client_id)
    }
}

//! Single entry point to the PrismHR API.
//!
//! # Design
//! `PrismApi` owns one `Transport` and one `PrismConfig`. Services are
//! created on demand and borrow both, so each call sees the configuration
//! current at that moment. Authenticating replaces the config with a new
//! snapshot carrying the session header; it never edits the old one.
//!
//! The facade is meant for a single owner. `authenticate` and
//! `set_session` take `&mut self`, so concurrent session changes must be
//! serialized by the caller.

use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{PrismConfig, Session, DEFAULT_HOSTNAME};
use crate::entities::{BatchListEntry, BatchStatus, Employee, PayrollBatch, Timesheet, TimesheetUpload};
use crate::error::{PrismError, PrismResult};
use crate::services::{
    ClientService, CsvService, EmployeeService, LoginService, PayrollService,
    TimesheetUploadService,
};
use crate::transport::{Transport, UreqTransport};

/// Length of a batch created by `find_or_create_payroll_batch`.
pub const BATCH_PERIOD_DAYS: i64 = 7;

/// Facade over every service, holding the session for its lifetime.
pub struct PrismApi<T: Transport = UreqTransport> {
    transport: T,
    config: PrismConfig,
}

impl PrismApi<UreqTransport> {
    /// Client for `hostname` on API `version`, over the default transport.
    ///
    /// Fails with `PrismError::Configuration` before any request is made
    /// if the hostname is not a URL or the version is not supported.
    pub fn new(version: &str, hostname: &str) -> PrismResult<Self> {
        Ok(Self::with_transport(
            UreqTransport::new(),
            PrismConfig::new(version, hostname)?,
        ))
    }

    /// Client for the public host on the latest supported version.
    pub fn with_defaults() -> PrismResult<Self> {
        Self::new(crate::config::ApiVersion::default().as_str(), DEFAULT_HOSTNAME)
    }
}

impl<T: Transport> PrismApi<T> {
    pub fn with_transport(transport: T, config: PrismConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &PrismConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Logs in and attaches the returned session to every later request.
    pub fn authenticate(&mut self, username: &str, password: &str, peo_id: &str) -> PrismResult<bool> {
        let session = self.login_service().login(username, password, peo_id)?;
        self.config = self.config.with_session(session);
        info!("authenticated with PrismHR");
        Ok(true)
    }

    /// Reuses an existing session token without logging in.
    pub fn set_session(&mut self, token: impl Into<String>) {
        self.config = self.config.with_session(Session::new(token));
    }

    pub fn session(&self) -> Option<&str> {
        self.config.session().map(Session::token)
    }

    pub fn login_service(&self) -> LoginService<'_, T> {
        LoginService::new(&self.transport, &self.config)
    }

    pub fn employee_service(&self) -> EmployeeService<'_, T> {
        EmployeeService::new(&self.transport, &self.config)
    }

    pub fn payroll_service(&self) -> PayrollService<'_, T> {
        PayrollService::new(&self.transport, &self.config)
    }

    pub fn timesheet_upload_service(&self) -> TimesheetUploadService<'_, T> {
        TimesheetUploadService::new(&self.transport, &self.config)
    }

    pub fn client_service(&self) -> ClientService<'_, T> {
        ClientService::new(&self.transport, &self.config)
    }

    pub fn csv_service(&self) -> CsvService {
        CsvService::new()
    }

    // ---------------------------------------------------------------------
    // Employees
    // ---------------------------------------------------------------------

    pub fn get_employee(&self, id: &str, client_id: &str) -> PrismResult<Option<Employee>> {
        self.employee_service().get_employee(id, client_id)
    }

    pub fn get_employees<S: AsRef<str>>(&self, ids: &[S], client_id: &str) -> PrismResult<Vec<Employee>> {
        self.employee_service().get_employees(ids, client_id)
    }

    pub fn get_all_employees(&self, client_id: &str) -> PrismResult<Vec<Employee>> {
        self.employee_service().get_all_employees(client_id)
    }

    pub fn get_employer(&self, employee_id: &str) -> PrismResult<Value> {
        self.employee_service().get_employer(employee_id)
    }

    // ---------------------------------------------------------------------
    // Payroll batches
    // ---------------------------------------------------------------------

    /// ID of the first batch paid on `date`, or of a new manual batch
    /// covering `date..date + 7 days` when none exists.
    ///
    /// This reads then writes without any lock: two callers racing on the
    /// same date and client can both create a batch.
    pub fn find_or_create_payroll_batch<S: AsRef<str>>(
        &self,
        date: NaiveDate,
        client_id: &str,
        employee_ids: &[S],
    ) -> PrismResult<String> {
        let payroll = self.payroll_service();
        if let Some(batch_id) = payroll.get_batch_list_by_date(date, client_id)? {
            return Ok(batch_id);
        }
        info!(%date, client_id, "no batch found for date, creating one");
        payroll.create_batch(date, batch_period_end(date)?, client_id, employee_ids)
    }

    /// Creates a manual batch covering `date..date + 7 days`.
    pub fn create_payroll_batch<S: AsRef<str>>(
        &self,
        date: NaiveDate,
        client_id: &str,
        employee_ids: &[S],
    ) -> PrismResult<String> {
        self.payroll_service()
            .create_batch(date, batch_period_end(date)?, client_id, employee_ids)
    }

    pub fn get_payroll_batches(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        client_id: &str,
    ) -> PrismResult<Vec<BatchListEntry>> {
        self.payroll_service()
            .get_batch_list_by_date_range(start, end, client_id)
    }

    pub fn get_payroll_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<Option<PayrollBatch>> {
        self.payroll_service().get_payroll_batch(batch_id, client_id)
    }

    pub fn get_employees_in_payroll_batch(&self, batch_id: &str, client_id: &str) -> PrismResult<Vec<String>> {
        self.payroll_service().get_employees_for_batch(batch_id, client_id)
    }

    /// Reads the batch, then updates its employees with the checksum just
    /// read. Fails with `BatchNotFound` if the batch does not exist.
    pub fn update_employees_in_payroll_batch<S: AsRef<str>>(
        &self,
        batch_id: &str,
        client_id: &str,
        employees: &[S],
    ) -> PrismResult<Value> {
        let payroll = self.payroll_service();
        let original = payroll
            .get_payroll_batch(batch_id, client_id)?
            .ok_or_else(|| PrismError::BatchNotFound {
                batch_id: batch_id.to_string(),
                client_id: client_id.to_string(),
            })?;
        payroll.update_employees_for_payroll_batch(batch_id, client_id, employees, &original)
    }

    // ---------------------------------------------------------------------
    // Timesheets
    // ---------------------------------------------------------------------

    pub fn get_available_timesheet_templates(&self, client_id: &str) -> PrismResult<Vec<Value>> {
        self.timesheet_upload_service().get_available_templates(client_id)
    }

    pub fn get_timesheet_param_data(&self, client_id: &str) -> PrismResult<Value> {
        self.timesheet_upload_service().get_param_data(client_id)
    }

    pub fn get_timesheet_data(&self, batch_id: &str, client_id: &str) -> PrismResult<Vec<Timesheet>> {
        self.timesheet_upload_service()
            .get_timesheet_data(batch_id, client_id)
    }

    /// Uploads raw CSV (see `csv_service`) against an open batch.
    pub fn upload_timesheets(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        raw_data: &str,
    ) -> PrismResult<TimesheetUpload> {
        self.timesheet_upload_service()
            .upload(batch_id, client_id, user_id, raw_data)
    }

    pub fn get_timesheet_batch_status(&self, batch_id: &str, client_id: &str) -> PrismResult<BatchStatus> {
        self.timesheet_upload_service()
            .get_batch_status(batch_id, client_id)
    }

    /// Finalizes the batch's upload if, and only if, its status is
    /// `TS.READY` with error code `"0"`. Otherwise returns `false` without
    /// calling the finalize endpoint.
    pub fn finalize_timesheet_upload(&self, batch_id: &str, client_id: &str) -> PrismResult<bool> {
        let timesheets = self.timesheet_upload_service();
        let status = timesheets.get_batch_status(batch_id, client_id)?;
        if !status.is_ready() {
            warn!(
                batch_id,
                batch_status = %status.batch_status,
                error_code = %status.error_code,
                "batch not ready, skipping finalize"
            );
            return Ok(false);
        }
        timesheets.finalize_upload(batch_id, client_id, &status.checksum)?;
        Ok(true)
    }

    pub fn approve_timesheet_upload(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        upload_id: &str,
    ) -> PrismResult<Value> {
        self.timesheet_upload_service()
            .approve_upload(batch_id, client_id, user_id, upload_id)
    }

    // ---------------------------------------------------------------------
    // Clients
    // ---------------------------------------------------------------------

    pub fn get_all_clients(&self) -> PrismResult<Value> {
        self.client_service().get_all_clients()
    }
}

fn batch_period_end(start: NaiveDate) -> PrismResult<NaiveDate> {
    start
        .checked_add_signed(Duration::days(BATCH_PERIOD_DAYS))
        .ok_or_else(|| PrismError::Validation(format!("date {start} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_bad_hostname_and_version() {
        assert!(matches!(
            PrismApi::new("1.22", "not-a-url"),
            Err(PrismError::Configuration(_))
        ));
        assert!(matches!(
            PrismApi::new("9.99", DEFAULT_HOSTNAME),
            Err(PrismError::Configuration(_))
        ));
    }

    #[test]
    fn with_defaults_targets_public_host() {
        let api = PrismApi::with_defaults().unwrap();
        assert_eq!(
            api.config().base_uri(),
            "https://api.prismhr.com/api-1.22/services/rest/"
        );
        assert!(api.session().is_none());
    }

    #[test]
    fn set_session_rebuilds_config() {
        let mut api = PrismApi::new("1.22", "http://localhost:3000/").unwrap();
        let before = api.config().clone();
        api.set_session("S-1");
        assert_eq!(api.session(), Some("S-1"));
        assert!(before.session().is_none());
    }

    #[test]
    fn batch_period_is_one_week() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        assert_eq!(
            batch_period_end(start).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }
}

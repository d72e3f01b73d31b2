//! Per-resource services over the vendor API.
//!
//! # Design
//! Each service borrows a `Transport` and a `PrismConfig` snapshot; none
//! holds a client of its own. Operations follow the same shape: validate
//! arguments, `build_*` an `HttpRequest`, execute it, `parse_*` the
//! `HttpResponse`. The build and parse halves are public so callers can run
//! the round-trip themselves.

pub mod client;
pub mod csv;
pub mod employee;
pub mod login;
pub mod payroll;
pub mod timesheet;

pub use client::ClientService;
pub use self::csv::{CsvService, TimesheetRow};
pub use employee::EmployeeService;
pub use login::LoginService;
pub use payroll::PayrollService;
pub use timesheet::TimesheetUploadService;

use crate::error::{PrismError, PrismResult};

/// Fails fast, before any request, when a required argument is empty.
pub(crate) fn require(value: &str, name: &str) -> PrismResult<()> {
    if value.trim().is_empty() {
        return Err(PrismError::Validation(format!("{name} cannot be empty")));
    }
    Ok(())
}

/// Date format the vendor expects in query strings and payloads.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

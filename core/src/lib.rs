//! Typed, blocking client for the PrismHR REST API.
//!
//! # Overview
//! Covers employees, payroll batches, timesheet uploads and client listing.
//! `PrismApi` is the entry point: it holds the configuration and session
//! and hands out per-resource services.
//!
//! # Design
//! - Every service splits an operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); the
//!   `Transport` in between does the I/O. `UreqTransport` is the default.
//! - Calls are synchronous and sequential; nothing runs in parallel, not
//!   even chunked employee lookups.
//! - A 404 on list queries is an empty result, not an error. Every other
//!   non-2xx becomes a `PrismError` carrying the status code.
//! - No retries, caching or persisted state. The only concurrency control
//!   is the vendor's batch checksum, which the caller echoes back.
//!
//! ```no_run
//! use prism_api::PrismApi;
//!
//! # fn main() -> Result<(), prism_api::PrismError> {
//! let mut api = PrismApi::new("1.22", "https://api.prismhr.com/")?;
//! api.authenticate("user", "password", "350*HSG")?;
//! let employees = api.get_all_employees("1111")?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod http;
pub mod response;
pub mod services;
pub mod transport;

pub use client::PrismApi;
pub use config::{ApiVersion, PrismConfig, Session};
pub use entities::{BatchListEntry, BatchStatus, Employee, PayrollBatch, Timesheet, TimesheetUpload};
pub use error::{PrismError, PrismResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use services::{
    ClientService, CsvService, EmployeeService, LoginService, PayrollService, TimesheetRow,
    TimesheetUploadService,
};
pub use transport::{Transport, UreqTransport};

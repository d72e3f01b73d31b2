//! Local stand-in for the PrismHR REST API, used by the client's
//! integration tests and for manual runs against seeded demo data.

pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

pub use handlers::ApiError;
pub use state::{Db, MockState};

/// Path prefix the client builds for API version 1.22.
pub const BASE_PATH: &str = "/api-1.22/services/rest";

/// Router over freshly seeded state.
pub fn app() -> Router {
    app_with_state(MockState::seeded().shared())
}

/// Router over caller-owned state, so tests can inspect it afterwards.
pub fn app_with_state(db: Db) -> Router {
    let api = Router::new()
        .route("/login/createPeoSession", post(handlers::create_peo_session))
        .route("/employee/getEmployee", get(handlers::get_employee))
        .route("/employee/getEmployeeList", get(handlers::get_employee_list))
        .route("/employee/getEmployersInfo", get(handlers::get_employers_info))
        .route("/payroll/getBatchListByDate", get(handlers::get_batch_list_by_date))
        .route("/payroll/getBatchInfo", get(handlers::get_batch_info))
        .route("/payroll/createPayrollBatches", post(handlers::create_payroll_batches))
        .route("/payroll/getEmployeeForBatch", get(handlers::get_employee_for_batch))
        .route(
            "/payroll/updatePayrollBatchWithOptions",
            post(handlers::update_payroll_batch_with_options),
        )
        .route("/timesheet/upload", post(handlers::upload))
        .route("/timesheet/getBatchStatus", get(handlers::get_batch_status))
        .route(
            "/timesheet/finalizePrismBatchEntry",
            post(handlers::finalize_prism_batch_entry),
        )
        .route("/timesheet/accept", post(handlers::accept))
        .route("/timesheet/getParamData", get(handlers::get_param_data))
        .route("/timesheet/getTimeSheetData", get(handlers::get_timesheet_data))
        .route("/clientMaster/getClientList", get(handlers::get_client_list))
        .with_state(db);
    Router::new().nest(BASE_PATH, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

//! Timesheet upload lifecycle for one batch.
//!
//! A batch moves through: upload (CSV posted) → status check (status and
//! checksum read) → finalize (needs that checksum) → approve (needs the
//! upload key). This service runs each step on its own; it does not cache
//! checksums or upload keys between calls.

use serde_json::Value;
use tracing::debug;

use crate::config::PrismConfig;
use crate::entities::{BatchStatus, Timesheet, TimesheetUpload};
use crate::error::PrismResult;
use crate::http::{HttpRequest, HttpResponse};
use crate::response::{decode, one_or_many, pointer};
use crate::services::require;
use crate::transport::Transport;

const UPLOAD_PATH: &str = "timesheet/upload";
const ACCEPT_PATH: &str = "timesheet/accept";
const FINALIZE_PATH: &str = "timesheet/finalizePrismBatchEntry";
const GET_BATCH_STATUS_PATH: &str = "timesheet/getBatchStatus";
const GET_PARAM_DATA_PATH: &str = "timesheet/getParamData";
const GET_TIMESHEET_DATA_PATH: &str = "timesheet/getTimeSheetData";

/// Upload template every CSV produced by `CsvService` conforms to.
pub const TEMPLATE_ID: &str = "MyTimeIn";

pub struct TimesheetUploadService<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a PrismConfig,
}

impl<'a, T: ?Sized> TimesheetUploadService<'a, T> {
    pub fn new(transport: &'a T, config: &'a PrismConfig) -> Self {
        Self { transport, config }
    }

    pub fn build_upload(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        raw_data: &str,
    ) -> PrismResult<HttpRequest> {
        self.config.build_post_form(
            UPLOAD_PATH,
            &[
                ("clientId", client_id),
                ("templateId", TEMPLATE_ID),
                ("userId", user_id),
                ("batchList", batch_id),
                ("fileData", raw_data),
            ],
        )
    }

    pub fn parse_upload(&self, response: HttpResponse) -> PrismResult<TimesheetUpload> {
        TimesheetUpload::from_api_response(decode(&response)?)
    }

    pub fn build_get_batch_status(&self, batch_id: &str, client_id: &str) -> PrismResult<HttpRequest> {
        self.config.build_get(
            GET_BATCH_STATUS_PATH,
            &[("batchId", batch_id), ("clientId", client_id)],
        )
    }

    pub fn parse_get_batch_status(&self, response: HttpResponse) -> PrismResult<BatchStatus> {
        BatchStatus::from_api_response(decode(&response)?)
    }

    pub fn build_finalize(&self, batch_id: &str, client_id: &str, checksum: &str) -> PrismResult<HttpRequest> {
        self.config.build_post_form(
            FINALIZE_PATH,
            &[("clientId", client_id), ("batchId", batch_id), ("checksum", checksum)],
        )
    }

    pub fn build_approve(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        upload_id: &str,
    ) -> PrismResult<HttpRequest> {
        self.config.build_post_form(
            ACCEPT_PATH,
            &[
                ("clientId", client_id),
                ("templateId", TEMPLATE_ID),
                ("userId", user_id),
                ("batchList", batch_id),
                ("uploadId", upload_id),
            ],
        )
    }

    pub fn build_get_param_data(&self, client_id: &str) -> PrismResult<HttpRequest> {
        self.config
            .build_get(GET_PARAM_DATA_PATH, &[("clientId", client_id)])
    }

    pub fn build_get_timesheet_data(&self, batch_id: &str, client_id: &str) -> PrismResult<HttpRequest> {
        self.config.build_get(
            GET_TIMESHEET_DATA_PATH,
            &[("batchId", batch_id), ("clientId", client_id)],
        )
    }

    pub fn parse_get_timesheet_data(&self, response: HttpResponse) -> PrismResult<Vec<Timesheet>> {
        let body = decode(&response)?;
        one_or_many(body.get("timeSheetData"))
            .into_iter()
            .map(Timesheet::from_api_response)
            .collect()
    }
}

impl<'a, T: Transport + ?Sized> TimesheetUploadService<'a, T> {
    /// Posts raw CSV text against `batch_id` using `TEMPLATE_ID`.
    pub fn upload(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        raw_data: &str,
    ) -> PrismResult<TimesheetUpload> {
        require(client_id, "client_id")?;
        require(user_id, "user_id")?;
        require(batch_id, "batch_id")?;
        require(raw_data, "raw_data")?;
        let request = self.build_upload(batch_id, client_id, user_id, raw_data)?;
        let upload = self.parse_upload(self.transport.execute(request)?)?;
        debug!(
            batch_id,
            records = upload.imported_records(),
            failures = upload.errors().len(),
            "uploaded timesheets"
        );
        Ok(upload)
    }

    /// Current status and checksum of the batch's upload.
    pub fn get_batch_status(&self, batch_id: &str, client_id: &str) -> PrismResult<BatchStatus> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        let request = self.build_get_batch_status(batch_id, client_id)?;
        self.parse_get_batch_status(self.transport.execute(request)?)
    }

    /// Moves the upload into the payroll batch. `checksum` must come from
    /// the latest `get_batch_status`.
    pub fn finalize_upload(&self, batch_id: &str, client_id: &str, checksum: &str) -> PrismResult<Value> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        require(checksum, "checksum")?;
        let request = self.build_finalize(batch_id, client_id, checksum)?;
        decode(&self.transport.execute(request)?)
    }

    /// Flags an upload as approved. `upload_id` is the upload key returned
    /// by `upload`.
    pub fn approve_upload(
        &self,
        batch_id: &str,
        client_id: &str,
        user_id: &str,
        upload_id: &str,
    ) -> PrismResult<Value> {
        require(client_id, "client_id")?;
        require(user_id, "user_id")?;
        require(batch_id, "batch_id")?;
        require(upload_id, "upload_id")?;
        let request = self.build_approve(batch_id, client_id, user_id, upload_id)?;
        decode(&self.transport.execute(request)?)
    }

    /// Batches, pay groups, templates and other upload parameters.
    pub fn get_param_data(&self, client_id: &str) -> PrismResult<Value> {
        require(client_id, "client_id")?;
        let request = self.build_get_param_data(client_id)?;
        decode(&self.transport.execute(request)?)
    }

    /// Upload templates available to this account (`paramData.template`).
    pub fn get_available_templates(&self, client_id: &str) -> PrismResult<Vec<Value>> {
        let param_data = self.get_param_data(client_id)?;
        Ok(one_or_many(pointer(&param_data, &["paramData", "template"])))
    }

    /// Pay lines currently in the batch.
    pub fn get_timesheet_data(&self, batch_id: &str, client_id: &str) -> PrismResult<Vec<Timesheet>> {
        require(client_id, "client_id")?;
        require(batch_id, "batch_id")?;
        let request = self.build_get_timesheet_data(batch_id, client_id)?;
        self.parse_get_timesheet_data(self.transport.execute(request)?)
    }
}

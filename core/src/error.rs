//! Error types for the PrismHR API client.
//!
//! # Design
//! One enum covers every failure a caller can see. Construction problems
//! (`Configuration`) and bad arguments (`Validation`) are raised before any
//! request leaves the process. Non-2xx responses become `Authentication`
//! (login only) or `Api`, both carrying the status code. A 404 on list
//! queries never reaches this type; services translate it into an empty
//! result.

use thiserror::Error;

/// Errors returned by the PrismHR client and its services.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Invalid hostname or API version given when building the client.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A required argument was empty or malformed.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The login endpoint rejected the credentials (4xx).
    #[error("Received {status}: '{body}' when authenticating with API.")]
    Authentication { status: u16, body: String },

    /// Any other non-2xx response. `message` is the vendor's
    /// `errorMessage` field, or the raw body when the field is absent.
    #[error("Received {status}: '{message}' when contacting API")]
    Api { status: u16, message: String },

    /// The batch an update was requested for does not exist.
    #[error("payroll batch {batch_id} not found for client {client_id}")]
    BatchNotFound { batch_id: String, client_id: String },

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// CSV output could not be produced.
    #[error("csv encoding failed: {0}")]
    Csv(String),
}

impl PrismError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            PrismError::Authentication { status, .. } | PrismError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type PrismResult<T> = Result<T, PrismError>;

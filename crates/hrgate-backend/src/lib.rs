//! HTTP client for the HR FastAPI backend
//!
//! This crate owns every upstream call the gateway makes, plus the shared
//! error taxonomy and relay request logging.

mod client;
mod error;
pub mod request_log;

pub use client::{
    BackendClient, DocumentRequest, DocumentSubmission, EmployeeRecord, JobStatusPayload,
};
pub use error::BackendError;

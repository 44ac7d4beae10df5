//! Clients for the hosted services all the hard work is delegated to.
//!
//! Calls are awaited to completion under one fixed timeout. There is no
//! retry, backoff, or cancellation: a failed or slow call surfaces a
//! single error and the operation that triggered it is abandoned.

pub mod generate;
pub mod transcribe;

use std::time::Duration;

use crate::error::{GriotError, Result};

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GriotError::Other(format!("failed to build HTTP client: {e}")))
}

use thiserror::Error;

use super::emotion_mapper::SignalCode;

#[derive(Error, Debug)]
pub enum ReportDispatchError {
    #[error("failed to encode reading: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("receiver at {url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Fire-and-forget delivery of a signal code to the receiving device.
///
/// `report` makes exactly one attempt. Failures are logged by the
/// implementation and never returned, retried or queued.
pub trait SignalReporter: Send {
    fn report(&mut self, code: SignalCode);
}

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameAcquisitionError {
    #[error("could not open capture device {index}: {reason}")]
    DeviceOpen { index: i32, reason: String },
    #[error("capture device stopped delivering frames: {0}")]
    StreamEnded(String),
    #[error("snapshot request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("snapshot endpoint {url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("snapshot could not be decoded: {0}")]
    Decode(#[source] image::ImageError),
}

/// Yields the current camera frame on demand.
///
/// - `Ok(Some(frame))`: a frame to process.
/// - `Ok(None)`: nothing this time; the caller skips the iteration.
/// - `Err(_)`: the source is exhausted for this run.
///
/// Each call is independent and best-effort; sources never retry.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameAcquisitionError>;
}

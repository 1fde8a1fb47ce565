/// Local capture device read through OpenCV's `VideoCapture`.
///
/// The device is opened once, by index; failing to open it is an
/// initialization error. A failed read ends the run.
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::capture::domain::frame_source::{FrameAcquisitionError, FrameSource};
use crate::shared::frame::Frame;

pub struct OpenCvCameraSource {
    capture: VideoCapture,
    device_index: i32,
    next_index: usize,
}

// Safety: the capture handle is owned by the single pipeline thread.
unsafe impl Send for OpenCvCameraSource {}

impl OpenCvCameraSource {
    pub fn open(device_index: i32) -> Result<Self, FrameAcquisitionError> {
        let open_error = |reason: String| FrameAcquisitionError::DeviceOpen {
            index: device_index,
            reason,
        };
        let capture = VideoCapture::new(device_index, videoio::CAP_ANY)
            .map_err(|e| open_error(e.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|e| open_error(e.to_string()))?;
        if !opened {
            return Err(open_error("device not available".into()));
        }
        log::info!("Opened capture device {device_index}");
        Ok(Self {
            capture,
            device_index,
            next_index: 0,
        })
    }
}

impl FrameSource for OpenCvCameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameAcquisitionError> {
        let mut raw = Mat::default();
        let grabbed = self
            .capture
            .read(&mut raw)
            .map_err(|e| FrameAcquisitionError::StreamEnded(e.to_string()))?;
        if !grabbed || raw.empty() {
            log::error!("Failed to capture frame from device {}", self.device_index);
            return Err(FrameAcquisitionError::StreamEnded(
                "device returned no frame".into(),
            ));
        }

        let frame = mat_to_frame(&raw, self.next_index)
            .map_err(|e| FrameAcquisitionError::StreamEnded(e.to_string()))?;
        self.next_index += 1;
        Ok(Some(frame))
    }
}

impl Drop for OpenCvCameraSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

/// Converts a BGR, BGRA or gray 8-bit `Mat` to an RGB frame.
pub fn mat_to_frame(mat: &Mat, index: usize) -> opencv::Result<Frame> {
    let code = match mat.channels() {
        1 => imgproc::COLOR_GRAY2RGB,
        4 => imgproc::COLOR_BGRA2RGB,
        _ => imgproc::COLOR_BGR2RGB,
    };
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(mat, &mut rgb, code)?;
    let data = rgb.data_bytes()?.to_vec();
    Ok(Frame::new(data, rgb.cols() as u32, rgb.rows() as u32, 3, index))
}

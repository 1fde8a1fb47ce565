/// HighGUI window showing each frame with face boxes, emotion labels and
/// the arming square.
///
/// `stop_requested` pumps the window's event loop for 1 ms, which is also
/// what makes the last `imshow` visible.
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc};

use crate::display::domain::frame_display::FrameDisplay;
use crate::shared::constants::{ARMING_SQUARE_CAPTION, QUIT_KEY};
use crate::shared::face_report::FaceReport;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const FACE_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);
const SQUARE_COLOR: (f64, f64, f64) = (155.0, 0.0, 0.0);

pub struct OpenCvWindowDisplay {
    window: String,
    arming_square: Option<Region>,
}

// Safety: HighGUI is only driven from the pipeline thread.
unsafe impl Send for OpenCvWindowDisplay {}

impl OpenCvWindowDisplay {
    pub fn new(window: &str, arming_square: Option<Region>) -> opencv::Result<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            window: window.to_string(),
            arming_square,
        })
    }
}

impl FrameDisplay for OpenCvWindowDisplay {
    fn render(
        &mut self,
        frame: &Frame,
        faces: &[FaceReport],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut canvas = frame_to_bgr_mat(frame)?;
        annotate(&mut canvas, faces, self.arming_square)?;
        highgui::imshow(&self.window, &canvas)?;
        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        match highgui::wait_key(1) {
            Ok(key) => key >= 0 && (key & 0xFF) as u8 == QUIT_KEY as u8,
            Err(e) => {
                log::warn!("Key poll failed: {e}");
                false
            }
        }
    }
}

impl Drop for OpenCvWindowDisplay {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

/// Draws face boxes with their labels, then the arming square.
fn annotate(canvas: &mut Mat, faces: &[FaceReport], arming_square: Option<Region>) -> opencv::Result<()> {
    for face in faces {
        let r = face.region;
        imgproc::rectangle(
            canvas,
            Rect::new(r.x, r.y, r.width, r.height),
            bgr(FACE_COLOR),
            2,
            imgproc::LINE_8,
            0,
        )?;
        put_label(canvas, face.label.as_str(), Point::new(r.x, r.y - 10), 0.9, 2)?;
    }

    if let Some(square) = arming_square {
        imgproc::rectangle(
            canvas,
            Rect::new(square.x, square.y, square.width, square.height),
            bgr(SQUARE_COLOR),
            2,
            imgproc::LINE_8,
            0,
        )?;
        put_label(
            canvas,
            ARMING_SQUARE_CAPTION,
            Point::new(square.x, square.y - 10),
            0.5,
            1,
        )?;
    }
    Ok(())
}

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

fn put_label(
    canvas: &mut Mat,
    text: &str,
    origin: Point,
    scale: f64,
    thickness: i32,
) -> opencv::Result<()> {
    imgproc::put_text(
        canvas,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        scale,
        bgr(FACE_COLOR),
        thickness,
        imgproc::LINE_8,
        false,
    )
}

/// Owned BGR `Mat` copy of an RGB (or gray) frame.
fn frame_to_bgr_mat(frame: &Frame) -> opencv::Result<Mat> {
    let channels = frame.channels() as i32;
    let flat = Mat::from_slice(frame.data())?;
    let shaped = flat.reshape(channels, frame.height() as i32)?;
    let code = if channels == 1 {
        imgproc::COLOR_GRAY2BGR
    } else {
        imgproc::COLOR_RGB2BGR
    };
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&*shaped, &mut bgr, code)?;
    Ok(bgr)
}

use crate::shared::face_report::FaceReport;
use crate::shared::frame::Frame;

/// Presents the annotated frame and relays the operator's stop request.
///
/// Rendering is cosmetic: the pipeline logs a failed render and carries on.
pub trait FrameDisplay: Send {
    fn render(&mut self, frame: &Frame, faces: &[FaceReport])
        -> Result<(), Box<dyn std::error::Error>>;

    /// Polls operator input once. `true` ends the loop.
    fn stop_requested(&mut self) -> bool;
}

/// No window, no input. The run ends through cancellation or a frame limit.
pub struct HeadlessDisplay;

impl FrameDisplay for HeadlessDisplay {
    fn render(
        &mut self,
        _frame: &Frame,
        _faces: &[FaceReport],
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        false
    }
}

use crate::classification::domain::emotion_label::EmotionLabel;
use crate::signal::domain::emotion_mapper::SignalCode;

use super::region::Region;

/// Outcome for one face in one frame: where it was, what it looked like,
/// and the code that was actually reported (after gating).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceReport {
    pub region: Region,
    pub label: EmotionLabel,
    pub code: SignalCode,
}

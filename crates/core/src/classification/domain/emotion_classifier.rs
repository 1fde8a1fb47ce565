use thiserror::Error;

use crate::shared::frame::Frame;

use super::emotion_label::EmotionLabel;

#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("face crop could not be prepared: {0}")]
    Preprocess(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("classifier returned no scores")]
    EmptyOutput,
}

/// Domain interface for emotion classification of a single face crop.
///
/// The crop is already a located face, so implementations must not run
/// their own face-presence check. A failure affects only this face.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, face: &Frame) -> Result<EmotionLabel, ClassificationError>;
}

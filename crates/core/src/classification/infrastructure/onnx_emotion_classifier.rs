/// FER+ emotion classifier using ONNX Runtime via `ort`.
///
/// The model takes a 64×64 single-channel face in raw 0–255 intensities
/// and emits one logit per emotion; the arg max of the softmax is the
/// dominant emotion.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::classification::domain::emotion_classifier::{ClassificationError, EmotionClassifier};
use crate::classification::domain::emotion_label::EmotionLabel;
use crate::shared::frame::Frame;

const INPUT_SIZE: u32 = 64;

/// Number of logits the FER+ model emits.
const FERPLUS_CLASSES: usize = 8;

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self { session })
    }

    fn scores(&mut self, face: &Frame) -> Result<Vec<f32>, ClassificationError> {
        let input = preprocess(face)?;
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(ClassificationError::EmptyOutput);
        }
        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        if logits.is_empty() {
            return Err(ClassificationError::EmptyOutput);
        }
        if logits.len() != FERPLUS_CLASSES {
            return Err(ClassificationError::Inference(format!(
                "expected {FERPLUS_CLASSES} emotion scores, got {}",
                logits.len()
            )));
        }
        Ok(softmax(&logits.iter().copied().collect::<Vec<_>>()))
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face: &Frame) -> Result<EmotionLabel, ClassificationError> {
        let probabilities = self.scores(face)?;
        let (index, confidence) = dominant(&probabilities).ok_or(ClassificationError::EmptyOutput)?;
        let label = ferplus_label(index);
        log::debug!("Classified face as {label} ({confidence:.2})");
        Ok(label)
    }
}

/// Translates a FER+ output index (neutral, happiness, surprise, sadness,
/// anger, disgust, fear, contempt) into the receiver's vocabulary.
fn ferplus_label(index: usize) -> EmotionLabel {
    match index {
        0 => EmotionLabel::Neutral,
        1 => EmotionLabel::Happy,
        2 => EmotionLabel::Surprise,
        3 => EmotionLabel::Sad,
        4 => EmotionLabel::Angry,
        5 => EmotionLabel::Other("disgust".into()),
        6 => EmotionLabel::Fear,
        7 => EmotionLabel::Other("contempt".into()),
        _ => EmotionLabel::Other(format!("class_{index}")),
    }
}

/// Platform accelerator when available, CPU otherwise.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Luminance, bilinear resize to 64×64, NCHW `[1, 1, 64, 64]` in 0–255.
fn preprocess(face: &Frame) -> Result<ndarray::Array4<f32>, ClassificationError> {
    if face.is_empty() {
        return Err(ClassificationError::Preprocess("empty face crop".into()));
    }
    let gray = face.to_luma();
    let image = GrayImage::from_raw(gray.width(), gray.height(), gray.data().to_vec())
        .ok_or_else(|| ClassificationError::Preprocess("crop size mismatch".into()))?;
    let resized = imageops::resize(&image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let side = INPUT_SIZE as usize;
    let values = resized.into_raw().into_iter().map(f32::from).collect();
    ndarray::Array4::from_shape_vec((1, 1, side, side), values)
        .map_err(|e| ClassificationError::Preprocess(e.to_string()))
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.iter().map(|e| e / sum).collect()
    } else {
        exps
    }
}

/// Index and value of the highest score.
fn dominant(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_preprocess_shape_and_range() {
        let face = Frame::new(vec![255u8; 20 * 10 * 3], 20, 10, 3, 0);
        let tensor = preprocess(&face).unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 64, 64]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_relative_eq!(tensor[[0, 0, 63, 63]], 255.0);
    }

    #[test]
    fn test_preprocess_uses_luminance() {
        let face = Frame::new([0u8, 0, 255].repeat(4), 2, 2, 3, 0);
        let tensor = preprocess(&face).unwrap();
        assert_relative_eq!(tensor[[0, 0, 10, 10]], 29.0);
    }

    #[test]
    fn test_preprocess_rejects_empty_crop() {
        let face = Frame::new(Vec::new(), 0, 0, 3, 0);
        assert!(matches!(
            preprocess(&face),
            Err(ClassificationError::Preprocess(_))
        ));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0]);
        let b = softmax(&[1001.0, 1002.0]);
        assert_relative_eq!(a[0], b[0], epsilon = 1e-6);
    }

    #[test]
    fn test_dominant_picks_max() {
        assert_eq!(dominant(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(dominant(&[]), None);
    }

    #[test]
    fn test_ferplus_indices_map_to_receiver_vocabulary() {
        let labels: Vec<EmotionLabel> = (0..FERPLUS_CLASSES).map(ferplus_label).collect();
        assert_eq!(
            labels,
            vec![
                EmotionLabel::Neutral,
                EmotionLabel::Happy,
                EmotionLabel::Surprise,
                EmotionLabel::Sad,
                EmotionLabel::Angry,
                EmotionLabel::Other("disgust".into()),
                EmotionLabel::Fear,
                EmotionLabel::Other("contempt".into()),
            ]
        );
    }

    #[test]
    fn test_ferplus_index_out_of_range_is_other() {
        assert_eq!(
            ferplus_label(FERPLUS_CLASSES),
            EmotionLabel::Other("class_8".into())
        );
    }
}

use std::fmt;

use crate::classification::domain::emotion_label::EmotionLabel;

/// Integer code understood by the receiving device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalCode(pub u8);

impl SignalCode {
    /// Unknown emotion, or the gate was not armed.
    pub const NO_SIGNAL: SignalCode = SignalCode(0);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SignalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed emotion → code table. Total: unlisted labels map to `NO_SIGNAL`.
pub fn signal_code(label: &EmotionLabel) -> SignalCode {
    match label {
        EmotionLabel::Happy => SignalCode(1),
        EmotionLabel::Angry => SignalCode(2),
        EmotionLabel::Sad => SignalCode(3),
        EmotionLabel::Fear => SignalCode(4),
        EmotionLabel::Surprise => SignalCode(5),
        EmotionLabel::Neutral => SignalCode(6),
        EmotionLabel::Other(_) => SignalCode::NO_SIGNAL,
    }
}

/// Parses a raw classifier label and maps it.
pub fn signal_code_for(raw: &str) -> SignalCode {
    signal_code(&EmotionLabel::parse(raw))
}

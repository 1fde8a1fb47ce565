use std::fmt;

/// Dominant emotion reported by a classifier for one face.
///
/// The six named variants are the emotions the receiver understands;
/// anything else a model can emit ("disgust", "contempt", …) is kept
/// verbatim in [`EmotionLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Happy,
    Angry,
    Sad,
    Fear,
    Surprise,
    Neutral,
    Other(String),
}

impl EmotionLabel {
    /// Exact, case-sensitive match on the receiver's vocabulary. Anything
    /// else, including other spellings of the same emotion, is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "happy" => Self::Happy,
            "angry" => Self::Angry,
            "sad" => Self::Sad,
            "fear" => Self::Fear,
            "surprise" => Self::Surprise,
            "neutral" => Self::Neutral,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Happy => "happy",
            Self::Angry => "angry",
            Self::Sad => "sad",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Circumplex emotion classification and confidence scoring.
//!
//! Both functions are pure: the classifier is a threshold table over the
//! arousal/valence plane (Russell's model), the scorer a bounded combination
//! of signal-quality indicators. Neither touches I/O or state, so the
//! boundary semantics are auditable here and nowhere else.

use crate::model::{EmotionLabel, PraatAnalysisResult, VariabilityLevel};

/// Arousal strictly above this lands in the high-activation band.
pub const HIGH_AROUSAL_MIN: f64 = 0.6;
/// Arousal strictly below this lands in the low-activation band.
pub const LOW_AROUSAL_MAX: f64 = 0.4;
/// Valence strictly above this counts as positive.
pub const POSITIVE_VALENCE_MIN: f64 = 0.3;
/// Valence strictly below this counts as negative.
pub const NEGATIVE_VALENCE_MAX: f64 = -0.3;

/// Label matrix indexed by [arousal band][valence column].
/// Bands: high, low, medium. Columns: positive, negative, else.
const QUADRANT_LABELS: [[EmotionLabel; 3]; 3] = [
    [
        EmotionLabel::Joy,
        EmotionLabel::Anger,
        EmotionLabel::Surprise,
    ],
    [
        EmotionLabel::Calm,
        EmotionLabel::Sadness,
        EmotionLabel::Neutral,
    ],
    [EmotionLabel::Pride, EmotionLabel::Fear, EmotionLabel::Neutral],
];

fn arousal_band(arousal: f64) -> usize {
    if arousal > HIGH_AROUSAL_MIN {
        0
    } else if arousal < LOW_AROUSAL_MAX {
        1
    } else {
        2
    }
}

fn valence_column(valence: f64) -> usize {
    if valence > POSITIVE_VALENCE_MIN {
        0
    } else if valence < NEGATIVE_VALENCE_MAX {
        1
    } else {
        2
    }
}

/// Map an `(arousal, valence)` pair onto the closed emotion set.
///
/// All four thresholds are strict: a value exactly on a boundary falls into
/// the adjacent "else" band or column, never the extreme one.
#[must_use]
pub fn classify_emotion(arousal: f64, valence: f64) -> EmotionLabel {
    QUADRANT_LABELS[arousal_band(arousal)][valence_column(valence)]
}

/// Floor of the confidence score: the heuristic mapping never claims
/// near-worthlessness.
pub const CONFIDENCE_FLOOR: f64 = 0.3;
/// Ceiling of the confidence score: the heuristic mapping never claims
/// near-certainty.
pub const CONFIDENCE_CEILING: f64 = 0.95;
/// HNR at or above this counts as a fully clear voice.
const HNR_FULL_SCALE_DB: f64 = 20.0;
/// Weight applied when pitch variability is anything other than medium.
const OFF_MEDIUM_VARIABILITY_FACTOR: f64 = 0.7;

/// Score classification confidence from signal-quality indicators.
///
/// `clamp((min(1, hnr/20) + voiced_fraction + variability) / 3, 0.3, 0.95)`
/// where variability is 1.0 for medium pitch variability and 0.7 otherwise.
#[must_use]
pub fn emotion_confidence(analysis: &PraatAnalysisResult) -> f64 {
    let hnr_factor = (analysis.voice_quality.hnr_mean / HNR_FULL_SCALE_DB).min(1.0);
    let voiced_factor = analysis.pitch.voiced_fraction;
    let variability_factor =
        if analysis.emotional_prosody.pitch_variability == VariabilityLevel::Medium {
            1.0
        } else {
            OFF_MEDIUM_VARIABILITY_FACTOR
        };

    ((hnr_factor + voiced_factor + variability_factor) / 3.0)
        .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

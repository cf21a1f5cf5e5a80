//! Pairwise comparison of stored prosodic analyses.
//!
//! Every difference is an absolute value or a euclidean norm, so the
//! comparison is symmetric under argument swap by construction.

use serde::{Deserialize, Serialize};

use crate::model::{EmotionAnalysisRecord, ProsodicAnalysisRecord};

/// Absolute prosodic differences between two analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyDifferences {
    pub pitch_difference_hz: f64,
    pub intensity_difference_db: f64,
    pub speech_rate_difference_sps: f64,
    /// Euclidean distance in the (arousal, valence) plane. 0.0 when either
    /// side has no stored emotion analysis.
    pub emotional_distance: f64,
}

/// Comparison report for two audio ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProsodyComparison {
    pub audio1: String,
    pub audio2: String,
    pub differences: ProsodyDifferences,
}

/// Distance between two stored emotion analyses in the circumplex plane.
#[must_use]
pub fn emotional_distance(
    first: Option<&EmotionAnalysisRecord>,
    second: Option<&EmotionAnalysisRecord>,
) -> f64 {
    match (first, second) {
        (Some(a), Some(b)) => {
            let arousal_delta = a.arousal - b.arousal;
            let valence_delta = a.valence - b.valence;
            arousal_delta.hypot(valence_delta)
        }
        _ => 0.0,
    }
}

/// Build the comparison report for two stored analyses.
#[must_use]
pub fn between(
    first: &ProsodicAnalysisRecord,
    second: &ProsodicAnalysisRecord,
    first_emotion: Option<&EmotionAnalysisRecord>,
    second_emotion: Option<&EmotionAnalysisRecord>,
) -> ProsodyComparison {
    ProsodyComparison {
        audio1: first.audio_id.clone(),
        audio2: second.audio_id.clone(),
        differences: ProsodyDifferences {
            pitch_difference_hz: (first.mean_pitch_hz - second.mean_pitch_hz).abs(),
            intensity_difference_db: (first.mean_intensity_db - second.mean_intensity_db).abs(),
            speech_rate_difference_sps: (first.speech_rate_sps - second.speech_rate_sps).abs(),
            emotional_distance: emotional_distance(first_emotion, second_emotion),
        },
    }
}

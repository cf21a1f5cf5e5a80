//! Cultural prosody marker screening.
//!
//! Flags recordings whose prosodic shape may carry cultural meaning: wide
//! pitch movement, deliberate pausing, strong dynamic contrast. This is a
//! screening aid for human reviewers, not a classifier; the weights are fixed
//! and the recommendations are advisory text handed to community validators
//! verbatim.

use serde::{Deserialize, Serialize};

use crate::model::ProsodicAnalysisRecord;

/// Pitch range strictly above this many semitones flags pitch patterns.
pub const PITCH_RANGE_SEMITONES_THRESHOLD: f64 = 15.0;
/// Pause count strictly above this flags rhythm patterns.
pub const PAUSE_COUNT_THRESHOLD: u32 = 5;
/// Intensity range strictly above this many dB flags intensity patterns.
pub const INTENSITY_RANGE_DB_THRESHOLD: f64 = 25.0;

const PITCH_WEIGHT: f64 = 0.33;
const RHYTHM_WEIGHT: f64 = 0.33;
const INTENSITY_WEIGHT: f64 = 0.34;

const PITCH_RECOMMENDATION: &str =
    "Consider community validation of pitch patterns for cultural significance";
const RHYTHM_RECOMMENDATION: &str =
    "Pauses may indicate ceremonial or formulaic speech - consult with storyteller";
const INTENSITY_RECOMMENDATION: &str =
    "Dynamic intensity suggests performative storytelling tradition";

/// Screening result for one persisted analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalMarkerReport {
    pub has_pitch_patterns: bool,
    pub has_rhythm_patterns: bool,
    pub has_intensity_patterns: bool,
    /// Accumulated marker weight. 0.0 when nothing is flagged.
    pub cultural_confidence: f64,
    /// One advisory string per flagged marker, pitch/rhythm/intensity order.
    pub recommendations: Vec<String>,
}

/// Screen a persisted prosodic analysis for cultural markers.
///
/// All three thresholds are strict: a value exactly at the threshold does not
/// flag.
#[must_use]
pub fn detect(record: &ProsodicAnalysisRecord) -> CulturalMarkerReport {
    let mut report = CulturalMarkerReport {
        has_pitch_patterns: false,
        has_rhythm_patterns: false,
        has_intensity_patterns: false,
        cultural_confidence: 0.0,
        recommendations: Vec::new(),
    };

    if record.pitch_range_semitones > PITCH_RANGE_SEMITONES_THRESHOLD {
        report.has_pitch_patterns = true;
        report.cultural_confidence += PITCH_WEIGHT;
        report.recommendations.push(PITCH_RECOMMENDATION.to_owned());
    }

    if record.pause_count > PAUSE_COUNT_THRESHOLD {
        report.has_rhythm_patterns = true;
        report.cultural_confidence += RHYTHM_WEIGHT;
        report.recommendations.push(RHYTHM_RECOMMENDATION.to_owned());
    }

    if record.intensity_range_db > INTENSITY_RANGE_DB_THRESHOLD {
        report.has_intensity_patterns = true;
        report.cultural_confidence += INTENSITY_WEIGHT;
        report
            .recommendations
            .push(INTENSITY_RECOMMENDATION.to_owned());
    }

    report
}

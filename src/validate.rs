//! Strict validation of extractor output.
//!
//! Parse order is fixed: raw stdout → JSON value → `success` envelope → typed
//! schema → numeric plausibility. The first two stages produce
//! [`VoiceError::ExtractorOutput`], the last two
//! [`VoiceError::ExtractorValidation`]. Nothing is ever clamped or coerced; an
//! implausible field fails the whole result.

use serde_json::Value;

use crate::error::{VoiceError, VoiceResult};
use crate::model::PraatAnalysisResult;

/// Upper plausibility bound for every pitch statistic. The extractor tracks
/// pitch below 500 Hz; anything near 1 kHz is garbage, not speech.
pub const PITCH_MAX_HZ: f64 = 1000.0;

/// Upper plausibility bound for every intensity statistic, in dB SPL.
pub const INTENSITY_MAX_DB: f64 = 140.0;

/// Upper bound for the pitch range expressed in semitones (ten octaves).
pub const PITCH_RANGE_SEMITONES_MAX: f64 = 120.0;

/// Upper bound for speech and articulation rates, in syllables/sec.
pub const SYLLABLE_RATE_MAX_SPS: f64 = 50.0;

/// Upper bound for the local jitter and shimmer perturbation measures.
pub const PERTURBATION_MAX: f64 = 10.0;

/// Plausible harmonics-to-noise window, in dB.
pub const HNR_MIN_DB: f64 = -60.0;
pub const HNR_MAX_DB: f64 = 60.0;

/// Upper bound for the peak-to-RMS crest factor.
pub const CREST_FACTOR_MAX: f64 = 100.0;

/// Slack allowed on the rhythm timing identities
/// (`speaking_time ≤ total_duration` and
/// `total_pause_time + speaking_time ≈ total_duration`), covering the
/// extractor's per-frame rounding.
pub const RHYTHM_TIMING_TOLERANCE_SEC: f64 = 0.05;

/// Parse and validate raw extractor stdout into a typed result.
pub fn parse_extractor_stdout(stdout: &str) -> VoiceResult<PraatAnalysisResult> {
    let value: Value = serde_json::from_str(stdout)
        .map_err(|_| VoiceError::from_extractor_output("stdout is not valid JSON", stdout))?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let engine_error = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("engine reported failure without detail");
            return Err(VoiceError::from_extractor_output(
                format!("engine reported failure: {engine_error}"),
                stdout,
            ));
        }
        None => {
            return Err(VoiceError::from_extractor_output(
                "missing boolean `success` field",
                stdout,
            ));
        }
    }

    let analysis: PraatAnalysisResult = serde_json::from_value(value)
        .map_err(|e| VoiceError::validation(format!("schema mismatch: {e}")))?;

    validate_analysis(&analysis)?;
    Ok(analysis)
}

/// Plausibility checks over an already-typed result. Split out from
/// [`parse_extractor_stdout`] so bounds are testable without a wire payload.
pub fn validate_analysis(analysis: &PraatAnalysisResult) -> VoiceResult<()> {
    check_range("duration", analysis.duration, 0.0, f64::MAX)?;

    let pitch = &analysis.pitch;
    check_range("pitch.mean_f0", pitch.mean_f0, 0.0, PITCH_MAX_HZ)?;
    check_range("pitch.median_f0", pitch.median_f0, 0.0, PITCH_MAX_HZ)?;
    check_range("pitch.std_f0", pitch.std_f0, 0.0, PITCH_MAX_HZ)?;
    check_range("pitch.min_f0", pitch.min_f0, 0.0, PITCH_MAX_HZ)?;
    check_range("pitch.max_f0", pitch.max_f0, 0.0, PITCH_MAX_HZ)?;
    check_range("pitch.range_f0", pitch.range_f0, 0.0, PITCH_MAX_HZ)?;
    check_range(
        "pitch.range_semitones",
        pitch.range_semitones,
        0.0,
        PITCH_RANGE_SEMITONES_MAX,
    )?;
    check_range("pitch.voiced_fraction", pitch.voiced_fraction, 0.0, 1.0)?;
    if pitch.min_f0 > pitch.max_f0 {
        return Err(VoiceError::validation(format!(
            "pitch.min_f0 = {} exceeds pitch.max_f0 = {}",
            pitch.min_f0, pitch.max_f0
        )));
    }
    // A zero mean is real for fully unvoiced audio; with voiced frames
    // present it means the engine produced an inconsistent block.
    if pitch.mean_f0 == 0.0 && pitch.voiced_fraction > 0.0 {
        return Err(VoiceError::validation(format!(
            "pitch.mean_f0 = 0 with voiced_fraction = {}",
            pitch.voiced_fraction
        )));
    }

    let intensity = &analysis.intensity;
    check_range(
        "intensity.mean_intensity",
        intensity.mean_intensity,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    check_range(
        "intensity.median_intensity",
        intensity.median_intensity,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    check_range(
        "intensity.std_intensity",
        intensity.std_intensity,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    check_range(
        "intensity.min_intensity",
        intensity.min_intensity,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    check_range(
        "intensity.max_intensity",
        intensity.max_intensity,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    check_range(
        "intensity.dynamic_range",
        intensity.dynamic_range,
        0.0,
        INTENSITY_MAX_DB,
    )?;
    if intensity.min_intensity > intensity.max_intensity {
        return Err(VoiceError::validation(format!(
            "intensity.min_intensity = {} exceeds intensity.max_intensity = {}",
            intensity.min_intensity, intensity.max_intensity
        )));
    }
    if intensity.mean_intensity == 0.0 && pitch.voiced_fraction > 0.0 {
        return Err(VoiceError::validation(format!(
            "intensity.mean_intensity = 0 with voiced_fraction = {}",
            pitch.voiced_fraction
        )));
    }

    let rhythm = &analysis.rhythm;
    check_range(
        "rhythm.speech_rate",
        rhythm.speech_rate,
        0.0,
        SYLLABLE_RATE_MAX_SPS,
    )?;
    check_range(
        "rhythm.articulation_rate",
        rhythm.articulation_rate,
        0.0,
        SYLLABLE_RATE_MAX_SPS,
    )?;
    check_range(
        "rhythm.mean_pause_duration",
        rhythm.mean_pause_duration,
        0.0,
        f64::MAX,
    )?;
    check_range(
        "rhythm.total_pause_time",
        rhythm.total_pause_time,
        0.0,
        f64::MAX,
    )?;
    check_range("rhythm.speaking_time", rhythm.speaking_time, 0.0, f64::MAX)?;
    check_range(
        "rhythm.total_duration",
        rhythm.total_duration,
        0.0,
        f64::MAX,
    )?;
    if rhythm.speaking_time > rhythm.total_duration + RHYTHM_TIMING_TOLERANCE_SEC {
        return Err(VoiceError::validation(format!(
            "rhythm.speaking_time = {} exceeds total_duration = {}",
            rhythm.speaking_time, rhythm.total_duration
        )));
    }
    let timing_drift =
        (rhythm.total_pause_time + rhythm.speaking_time - rhythm.total_duration).abs();
    if timing_drift > RHYTHM_TIMING_TOLERANCE_SEC {
        return Err(VoiceError::validation(format!(
            "rhythm timing identity violated: pauses {} + speaking {} vs total {} (drift {timing_drift})",
            rhythm.total_pause_time, rhythm.speaking_time, rhythm.total_duration
        )));
    }

    let quality = &analysis.voice_quality;
    check_range(
        "voice_quality.jitter_local",
        quality.jitter_local,
        0.0,
        PERTURBATION_MAX,
    )?;
    check_range(
        "voice_quality.shimmer_local",
        quality.shimmer_local,
        0.0,
        PERTURBATION_MAX,
    )?;
    check_range(
        "voice_quality.hnr_mean",
        quality.hnr_mean,
        HNR_MIN_DB,
        HNR_MAX_DB,
    )?;
    check_range(
        "voice_quality.crest_factor",
        quality.crest_factor,
        0.0,
        CREST_FACTOR_MAX,
    )?;

    let emotional = &analysis.emotional_prosody;
    check_range(
        "emotional_prosody.arousal_estimate",
        emotional.arousal_estimate,
        -1.0,
        1.0,
    )?;
    check_range(
        "emotional_prosody.valence_estimate",
        emotional.valence_estimate,
        -1.0,
        1.0,
    )?;

    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> VoiceResult<()> {
    if !value.is_finite() {
        return Err(VoiceError::validation(format!(
            "{field} = {value} is not finite"
        )));
    }
    if value < min || value > max {
        if max == f64::MAX {
            return Err(VoiceError::validation(format!(
                "{field} = {value} is negative"
            )));
        }
        return Err(VoiceError::validation(format!(
            "{field} = {value} outside [{min}, {max}]"
        )));
    }
    Ok(())
}
